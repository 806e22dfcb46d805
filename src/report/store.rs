use crate::error::{Result, VersionsError};
use crate::report::{GradleUpdateReport, UpdateReport, from_yaml, to_yaml};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const REPORT_DIR: &str = "build/gradle-versions";
pub const REPORT_YML: &str = "report.yml";
pub const GRADLE_REPORT_YML: &str = "gradle-report.yml";

/// Reads and writes reports under `<module>/build/gradle-versions/`.
pub struct Reports;

impl Reports {
    pub fn report_dir(module_dir: &Path) -> PathBuf {
        module_dir.join(REPORT_DIR)
    }

    pub fn write_update_report(module_dir: &Path, report: &UpdateReport) -> Result<PathBuf> {
        Self::write(module_dir, REPORT_YML, report)
    }

    pub fn write_gradle_report(module_dir: &Path, report: &GradleUpdateReport) -> Result<PathBuf> {
        Self::write(module_dir, GRADLE_REPORT_YML, report)
    }

    pub fn load_update_report(module_dir: &Path) -> Result<Option<UpdateReport>> {
        Self::load(&Self::report_dir(module_dir).join(REPORT_YML))
    }

    pub fn load_gradle_report(module_dir: &Path) -> Result<Option<GradleUpdateReport>> {
        Self::load(&Self::report_dir(module_dir).join(GRADLE_REPORT_YML))
    }

    /// Reports of every module directory that has one, in the given order.
    pub fn load_all<'a, I>(module_dirs: I) -> Result<Vec<UpdateReport>>
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let mut reports = Vec::new();
        for dir in module_dirs {
            if let Some(report) = Self::load_update_report(dir)? {
                reports.push(report);
            }
        }
        Ok(reports)
    }

    fn write<T: Serialize>(module_dir: &Path, file: &str, report: &T) -> Result<PathBuf> {
        let dir = Self::report_dir(module_dir);
        fs::create_dir_all(&dir)?;
        let path = dir.join(file);
        fs::write(&path, to_yaml(report)?)?;
        debug!(path = %path.display(), "report written");
        Ok(path)
    }

    fn load<T: for<'de> serde::Deserialize<'de>>(path: &Path) -> Result<Option<T>> {
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        from_yaml(&content).map(Some).map_err(|e| {
            VersionsError::Report(format!("Failed to read {}: {e}", path.display()))
        })
    }
}
