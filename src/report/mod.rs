//! Upgrade reports exchanged between the check and update commands.

pub mod markdown;
pub mod store;

pub use markdown::{clear_markdown_report, write_markdown_summary};
pub use store::Reports;

use crate::error::Result;
use crate::maven::UpgradeKind;
use crate::repository::Coordinate;
use serde::{Deserialize, Serialize};

/// A recommended upgrade for one coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyUpdateRec {
    pub group: String,
    pub name: String,
    /// Empty when the declared version is unknown
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub current_version: String,
    pub latest_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_type: Option<UpgradeKind>,
}

impl DependencyUpdateRec {
    pub fn new(coordinate: &Coordinate, current: &str, latest: &str) -> Self {
        Self {
            group: coordinate.group.clone(),
            name: coordinate.artifact.clone(),
            current_version: current.to_string(),
            latest_version: latest.to_string(),
            upgrade_type: (!current.is_empty()).then(|| UpgradeKind::between(current, latest)),
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(&self.group, &self.name)
    }

    /// `group:name`, the key used in `versions.props`
    pub fn identifier(&self) -> String {
        format!("{}:{}", self.group, self.name)
    }
}

/// Upgrades found for one module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReport {
    pub project: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependency_updates: Vec<DependencyUpdateRec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugin_updates: Vec<DependencyUpdateRec>,
}

impl UpdateReport {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dependency_updates.is_empty() && self.plugin_updates.is_empty()
    }

    pub fn total_updates(&self) -> usize {
        self.dependency_updates.len() + self.plugin_updates.len()
    }

    /// Order both sections by `group:name`.
    pub fn sort(&mut self) {
        self.dependency_updates.sort_by_key(DependencyUpdateRec::identifier);
        self.plugin_updates.sort_by_key(DependencyUpdateRec::identifier);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradleUpdateRec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub current_version: String,
    pub latest_version: String,
    pub distribution_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradleUpdateReport {
    pub project: String,
    pub gradle: GradleUpdateRec,
}

pub fn to_yaml<T: Serialize>(value: &T) -> Result<String> {
    let yaml = serde_yaml::to_string(value)?;
    Ok(yaml
        .strip_prefix("---\n")
        .map(str::to_string)
        .unwrap_or(yaml))
}

pub fn from_yaml<T: for<'de> Deserialize<'de>>(content: &str) -> Result<T> {
    Ok(serde_yaml::from_str(content)?)
}
