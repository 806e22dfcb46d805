use crate::agents::project_scanner::ProjectInfo;
use crate::agents::update::interaction::{UpdateCategory, UpdateInteraction};
use crate::agents::update::pending::PendingWrites;
use crate::agents::update::recommendations::plugin_recommendations;
use crate::error::Result;
use crate::gradle::build_script::rewrite_plugin_version;
use crate::report::Reports;
use crate::utils::path_validator::PathValidator;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// A plugin version rewritten in one build script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginUpdate {
    pub file: PathBuf,
    pub plugin_id: String,
    pub old_version: String,
    pub new_version: String,
}

/// Rewrites `plugins { }` versions in every module's build script.
pub struct PluginUpdater<'a> {
    project: &'a ProjectInfo,
}

impl<'a> PluginUpdater<'a> {
    pub fn new(project: &'a ProjectInfo) -> Self {
        Self { project }
    }

    /// Returns the rewritten declarations and stages every changed build file.
    pub fn apply(
        &self,
        interaction: &mut UpdateInteraction,
        pending: &mut PendingWrites,
    ) -> Result<Vec<PluginUpdate>> {
        let reports = Reports::load_all(self.project.module_dirs())?;
        let recommendations = plugin_recommendations(&reports);
        debug!(count = recommendations.len(), "plugin recommendations merged");

        let mut applied = Vec::new();
        if recommendations.is_empty() {
            return Ok(applied);
        }

        for build_file in self.project.build_files() {
            let build_file = PathValidator::validate_file_path(build_file, &self.project.project_path)?;
            let original = fs::read_to_string(&build_file)?;
            let mut content = original.clone();

            for (plugin_id, version) in &recommendations {
                let rewrite = rewrite_plugin_version(&content, plugin_id, version);
                let Some(old_version) = rewrite.replaced.first() else {
                    continue;
                };
                if !interaction.confirm(UpdateCategory::Plugin, plugin_id, old_version, version)? {
                    continue;
                }
                applied.extend(rewrite.replaced.iter().map(|old| PluginUpdate {
                    file: build_file.clone(),
                    plugin_id: plugin_id.clone(),
                    old_version: old.clone(),
                    new_version: version.clone(),
                }));
                content = rewrite.content;
            }

            if content != original {
                pending.stage(build_file, content);
            }
        }

        Ok(applied)
    }
}
