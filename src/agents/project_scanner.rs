use crate::error::{Result, VersionsError};
use crate::gradle::Module;
use crate::gradle::settings::discover_modules;
use crate::gradle::wrapper::WRAPPER_PROPERTIES;
use crate::props::VERSIONS_PROPS;
use crate::utils::path_validator::PathValidator;
use crate::utils::toml::VERSION_CATALOG;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SETTINGS_FILES: &[&str] = &["settings.gradle.kts", "settings.gradle"];
const ROOT_BUILD_FILES: &[&str] = &["build.gradle.kts", "build.gradle"];

/// ProjectScannerAgent validates the project structure and enumerates its modules
pub struct ProjectScannerAgent {
    project_path: PathBuf,
}

impl ProjectScannerAgent {
    pub fn new<P: AsRef<Path>>(project_path: P) -> Self {
        Self {
            project_path: project_path.as_ref().to_path_buf(),
        }
    }

    /// Validates the project structure
    pub fn validate(&self) -> Result<ProjectInfo> {
        let root = PathValidator::validate_project_path(&self.project_path)?;

        let settings_path = SETTINGS_FILES
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file());
        let has_build_file = ROOT_BUILD_FILES.iter().any(|name| root.join(name).is_file());

        if settings_path.is_none() && !has_build_file {
            return Err(VersionsError::ProjectValidation(
                "No settings.gradle(.kts) or build.gradle(.kts) found".to_string(),
            ));
        }

        let settings = settings_path
            .as_deref()
            .map(fs::read_to_string)
            .transpose()?;
        let modules: Vec<Module> = discover_modules(&root, settings.as_deref())
            .into_iter()
            .filter(|module| {
                let exists = module.dir.is_dir();
                if !exists {
                    warn!(module = %module.path, dir = %module.dir.display(), "module directory not found, skipping");
                }
                exists
            })
            .collect();
        debug!(count = modules.len(), "modules discovered");

        let existing = |relative: &str| {
            let path = root.join(relative);
            path.is_file().then_some(path)
        };

        Ok(ProjectInfo {
            versions_props: existing(VERSIONS_PROPS),
            catalog_path: existing(VERSION_CATALOG),
            wrapper_properties: existing(WRAPPER_PROPERTIES),
            project_path: root,
            modules,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProjectInfo {
    pub project_path: PathBuf,
    pub versions_props: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub wrapper_properties: Option<PathBuf>,
    pub modules: Vec<Module>,
}

impl ProjectInfo {
    pub fn module_dirs(&self) -> impl Iterator<Item = &Path> {
        self.modules.iter().map(|module| module.dir.as_path())
    }

    pub fn build_files(&self) -> impl Iterator<Item = &Path> {
        self.modules
            .iter()
            .filter_map(|module| module.build_file.as_deref())
    }
}
