use crate::maven::version::{Version, VersionComparator};
use crate::repository::Coordinate;
use crate::utils::glob::GlobPattern;
use tracing::debug;

pub const DEFAULT_DISALLOWED_QUALIFIERS: &[&str] = &["-alpha", "-beta", "-rc"];

/// Decides which published versions may be recommended as upgrades.
#[derive(Debug, Clone)]
pub struct VersionPolicy {
    pub stable_only: bool,
    disallowed_qualifiers: Vec<String>,
    ignore: Vec<GlobPattern>,
}

impl Default for VersionPolicy {
    fn default() -> Self {
        Self::new(
            true,
            DEFAULT_DISALLOWED_QUALIFIERS
                .iter()
                .map(|q| q.to_string())
                .collect(),
            Vec::new(),
        )
    }
}

impl VersionPolicy {
    pub fn new(stable_only: bool, disallowed_qualifiers: Vec<String>, ignore: Vec<GlobPattern>) -> Self {
        Self {
            stable_only,
            disallowed_qualifiers: disallowed_qualifiers
                .into_iter()
                .map(|q| q.to_lowercase())
                .collect(),
            ignore,
        }
    }

    /// Coordinates matching an ignore pattern are locked to their declared version.
    pub fn is_ignored(&self, coordinate: &Coordinate) -> bool {
        let key = coordinate.to_string();
        match self.ignore.iter().find(|glob| glob.matches(&key)) {
            Some(glob) => {
                debug!(coordinate = %key, pattern = glob.as_str(), "ignored by configuration");
                true
            }
            None => false,
        }
    }

    pub fn accepts(&self, version: &Version) -> bool {
        if self.stable_only && !version.is_stable() {
            return false;
        }
        let lower = version.original.to_lowercase();
        !self
            .disallowed_qualifiers
            .iter()
            .any(|q| lower.contains(q.as_str()))
    }

    /// Pick the newest acceptable version that is an upgrade over `current`.
    pub fn select_upgrade(&self, current: &str, available: &[String]) -> Option<String> {
        let latest = VersionComparator::get_latest(available, |v| self.accepts(v))?;
        if latest != current && VersionComparator::is_newer(&latest, current) {
            Some(latest)
        } else {
            None
        }
    }
}
