use crate::agents::project_scanner::ProjectInfo;
use crate::agents::update::interaction::{UpdateCategory, UpdateInteraction};
use crate::agents::update::pending::PendingWrites;
use crate::agents::update::recommendations::dependency_recommendations;
use crate::error::{Result, VersionsError};
use crate::props::{UpdatedLine, VersionsProps};
use crate::report::Reports;
use crate::utils::path_validator::PathValidator;
use tracing::debug;

/// Applies the merged dependency recommendations of all modules to the root
/// `versions.props`.
pub struct PropsUpdater<'a> {
    project: &'a ProjectInfo,
}

impl<'a> PropsUpdater<'a> {
    pub fn new(project: &'a ProjectInfo) -> Self {
        Self { project }
    }

    /// Returns the lines that changed and stages the rewritten file in `pending`.
    pub fn apply(
        &self,
        interaction: &mut UpdateInteraction,
        pending: &mut PendingWrites,
    ) -> Result<Vec<UpdatedLine>> {
        let path = self.project.versions_props.as_deref().ok_or_else(|| {
            VersionsError::ProjectValidation("versions.props not found".to_string())
        })?;
        let path = PathValidator::validate_file_path(path, &self.project.project_path)?;

        let reports = Reports::load_all(self.project.module_dirs())?;
        let recommendations = dependency_recommendations(&reports);
        debug!(count = recommendations.len(), "dependency recommendations merged");

        let mut props = VersionsProps::from_path(&path)?;
        let mut updated = Vec::new();

        for (identifier, latest) in &recommendations {
            let Some(pattern) = props.pattern_for(identifier).map(str::to_string) else {
                continue;
            };
            let current = props.version_for(identifier).unwrap_or_default().to_string();
            if current == *latest {
                continue;
            }
            if !interaction.confirm(UpdateCategory::Pin, &pattern, &current, latest)? {
                continue;
            }
            if let Some(line) = props.update(identifier, latest) {
                updated.push(line);
            }
        }

        if !updated.is_empty() {
            pending.stage(path, props.write_to_string());
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::ProjectScannerAgent;
    use crate::report::{DependencyUpdateRec, UpdateReport};
    use crate::repository::Coordinate;
    use std::fs;
    use tempfile::tempdir;

    fn write_report(dir: &std::path::Path, project: &str, recs: &[(&str, &str, &str)]) {
        let mut report = UpdateReport::new(project);
        for (group, name, latest) in recs {
            report.dependency_updates.push(DependencyUpdateRec::new(
                &Coordinate::new(*group, *name),
                "1.0",
                latest,
            ));
        }
        Reports::write_update_report(dir, &report).unwrap();
    }

    #[test]
    fn applies_merged_recommendations() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("settings.gradle"), "include 'a', 'b'\n").unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(
            root.join("versions.props"),
            "# pins\norg.slf4j:* = 1.7.12\ncom.google.guava:guava = 30.0-jre # keep\njunit:junit = 4.12\n",
        )
        .unwrap();
        write_report(&root.join("a"), ":a", &[
            ("org.slf4j", "slf4j-api", "1.7.36"),
            ("junit", "junit", "4.13.2"),
        ]);
        write_report(&root.join("b"), ":b", &[
            ("com.google.guava", "guava", "31.1-jre"),
            ("junit", "junit", "4.13.1"),
        ]);

        let project = ProjectScannerAgent::new(root).validate().unwrap();
        let mut pending = PendingWrites::default();
        let updated = PropsUpdater::new(&project)
            .apply(&mut UpdateInteraction::new(false), &mut pending)
            .unwrap();
        pending.commit().unwrap();

        assert_eq!(updated.len(), 2);
        assert_eq!(
            fs::read_to_string(root.join("versions.props")).unwrap(),
            "# pins\norg.slf4j:* = 1.7.36\ncom.google.guava:guava = 31.1-jre # keep\njunit:junit = 4.12\n"
        );
    }

    #[test]
    fn uncommitted_changes_leave_file_untouched() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("build.gradle"), "").unwrap();
        fs::write(root.join("versions.props"), "junit:junit = 4.12\n").unwrap();
        write_report(root, ":", &[("junit", "junit", "4.13.2")]);

        let project = ProjectScannerAgent::new(root).validate().unwrap();
        let mut pending = PendingWrites::default();
        let updated = PropsUpdater::new(&project)
            .apply(&mut UpdateInteraction::new(false), &mut pending)
            .unwrap();

        assert_eq!(updated[0].new_version, "4.13.2");
        assert!(!pending.is_empty());
        assert_eq!(
            fs::read_to_string(root.join("versions.props")).unwrap(),
            "junit:junit = 4.12\n"
        );
    }

    #[test]
    fn missing_versions_props_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("build.gradle"), "").unwrap();
        let project = ProjectScannerAgent::new(dir.path()).validate().unwrap();

        let err = PropsUpdater::new(&project)
            .apply(&mut UpdateInteraction::new(false), &mut PendingWrites::default())
            .unwrap_err();
        assert!(matches!(err, VersionsError::ProjectValidation(_)));
    }
}
