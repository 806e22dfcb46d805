use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

pub mod cache;
pub mod factory;
pub use cache::CachedRepositoryClient;
pub use factory::RepositoryFactory;

const PLUGIN_MARKER_SUFFIX: &str = ".gradle.plugin";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
}

impl Coordinate {
    pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
        }
    }

    /// Plugins are published under a marker coordinate `id:id.gradle.plugin`.
    pub fn plugin(plugin_id: impl Into<String>) -> Self {
        let id = plugin_id.into();
        Self {
            artifact: format!("{id}{PLUGIN_MARKER_SUFFIX}"),
            group: id,
        }
    }

    /// The plugin id when this is a plugin marker coordinate.
    pub fn plugin_id(&self) -> Option<&str> {
        self.artifact
            .ends_with(PLUGIN_MARKER_SUFFIX)
            .then_some(self.group.as_str())
    }

    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split(':');
        let group = parts.next().filter(|g| !g.is_empty())?;
        let artifact = parts.next().filter(|a| !a.is_empty())?;
        Some(Self::new(group, artifact))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)
    }
}

#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// All published versions of the coordinate, or an empty list when no
    /// repository knows it.
    async fn fetch_available_versions(&self, coordinate: &Coordinate) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_coordinate_uses_marker_artifact() {
        let coordinate = Coordinate::plugin("org.jetbrains.kotlin.jvm");
        assert_eq!(coordinate.group, "org.jetbrains.kotlin.jvm");
        assert_eq!(coordinate.artifact, "org.jetbrains.kotlin.jvm.gradle.plugin");
        assert_eq!(coordinate.plugin_id(), Some("org.jetbrains.kotlin.jvm"));
        assert_eq!(Coordinate::new("a", "b").plugin_id(), None);
    }

    #[test]
    fn parses_group_and_artifact() {
        let coordinate = Coordinate::parse("com.google.guava:guava:31.1-jre").unwrap();
        assert_eq!(coordinate.to_string(), "com.google.guava:guava");
        assert!(Coordinate::parse("guava").is_none());
        assert!(Coordinate::parse(":guava").is_none());
    }
}
