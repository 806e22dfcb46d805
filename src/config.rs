use crate::error::{Result, VersionsError};
use crate::gradle::ReleaseChannel;
use crate::maven::VersionPolicy;
use crate::maven::policy::DEFAULT_DISALLOWED_QUALIFIERS;
use crate::repository::cache::DEFAULT_CONCURRENCY;
use crate::utils::glob::GlobPattern;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const CONFIG_FILE: &str = "gradle-versions.toml";

/// Settings read from `gradle-versions.toml` at the project root.
/// Every field is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VersionsConfig {
    /// Only recommend stable releases
    pub stable_only: bool,
    /// Version substrings that are never recommended (case-insensitive)
    pub disallowed_qualifiers: Vec<String>,
    /// `group:name` globs that are never upgraded
    pub ignore: Vec<String>,
    /// Configurations whose dependencies are not inspected
    pub exclude_configurations: Vec<String>,
    /// Upper bound on in-flight repository requests
    pub concurrency: usize,
    pub gradle_channel: String,
    /// Repositories queried before those declared by the build
    pub repositories: Vec<String>,
}

impl Default for VersionsConfig {
    fn default() -> Self {
        Self {
            stable_only: true,
            disallowed_qualifiers: DEFAULT_DISALLOWED_QUALIFIERS
                .iter()
                .map(|q| q.to_string())
                .collect(),
            ignore: Vec::new(),
            exclude_configurations: Vec::new(),
            concurrency: DEFAULT_CONCURRENCY,
            gradle_channel: ReleaseChannel::default().id().to_string(),
            repositories: Vec::new(),
        }
    }
}

impl VersionsConfig {
    /// Load the project's configuration, or defaults when the file is absent.
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }
        debug!(path = %path.display(), "loading configuration");
        let content = fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        if config.concurrency == 0 {
            return Err(VersionsError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }
        config.channel()?;
        Ok(config)
    }

    pub fn channel(&self) -> Result<ReleaseChannel> {
        self.gradle_channel.parse()
    }

    pub fn policy(&self) -> Result<VersionPolicy> {
        let ignore = self
            .ignore
            .iter()
            .map(|pattern| GlobPattern::new(pattern))
            .collect::<Result<Vec<_>>>()?;
        Ok(VersionPolicy::new(
            self.stable_only,
            self.disallowed_qualifiers.clone(),
            ignore,
        ))
    }
}
