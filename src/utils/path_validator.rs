use crate::error::{Result, VersionsError};
use std::path::{Path, PathBuf};

const SYSTEM_DIRECTORIES: &[&str] = &["/etc", "/sys", "/proc", "/dev", "/boot"];

/// Guards the directories the tool reads from and the files it rewrites.
pub struct PathValidator;

impl PathValidator {
    /// Canonical project root; must be an existing directory outside system locations.
    pub fn validate_project_path(path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let canonical = path.canonicalize().map_err(|e| {
            VersionsError::ProjectValidation(format!("Invalid path '{}': {e}", path.display()))
        })?;

        if !canonical.is_dir() {
            return Err(VersionsError::ProjectValidation(format!(
                "Path '{}' is not a directory",
                canonical.display()
            )));
        }

        if let Some(system) = Self::system_directory_of(path, &canonical) {
            return Err(VersionsError::ProjectValidation(format!(
                "Access to system directory '{system}' is not allowed"
            )));
        }

        Ok(canonical)
    }

    fn system_directory_of(path: &Path, canonical: &Path) -> Option<&'static str> {
        SYSTEM_DIRECTORIES.iter().copied().find(|system| {
            let system_path = Path::new(system);
            path.starts_with(system_path)
                || canonical.starts_with(system_path)
                || system_path
                    .canonicalize()
                    .is_ok_and(|resolved| canonical.starts_with(resolved))
        })
    }

    /// Ensures a file about to be rewritten resides inside the project root.
    pub fn validate_file_path(
        file_path: impl AsRef<Path>,
        project_root: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let file_path = file_path.as_ref();
        let canonical_file = file_path.canonicalize().map_err(|e| {
            VersionsError::ProjectValidation(format!(
                "Invalid file path '{}': {e}",
                file_path.display()
            ))
        })?;
        let canonical_root = project_root.as_ref().canonicalize()?;

        if !canonical_file.starts_with(&canonical_root) {
            return Err(VersionsError::ProjectValidation(format!(
                "'{}' is outside the project directory",
                file_path.display()
            )));
        }

        Ok(canonical_file)
    }
}
