use crate::agents::project_scanner::ProjectInfo;
use crate::agents::update::interaction::{UpdateCategory, UpdateInteraction};
use crate::agents::update::pending::PendingWrites;
use crate::error::Result;
use crate::gradle::releases::ChannelDetails;
use crate::gradle::settings::ROOT_PROJECT_PATH;
use crate::gradle::{GradleReleaseClient, ReleaseChannel, WrapperProperties};
use crate::maven::VersionComparator;
use crate::report::{GradleUpdateRec, GradleUpdateReport, Reports};
use crate::utils::path_validator::PathValidator;
use tracing::{debug, info, warn};

/// Compare the wrapper's Gradle version with the latest on `channel` and write
/// the root `gradle-report.yml` when an upgrade exists.
pub async fn check_gradle_update(
    project: &ProjectInfo,
    client: &GradleReleaseClient,
    channel: ReleaseChannel,
) -> Result<Option<GradleUpdateReport>> {
    let Some(path) = project.wrapper_properties.as_deref() else {
        warn!("no Gradle wrapper found, skipping Gradle version check");
        return Ok(None);
    };
    let wrapper = WrapperProperties::from_path(path)?;
    let Some(latest) = client.for_channel(channel).await else {
        return Ok(None);
    };

    let report = gradle_update_for(&wrapper, latest);
    if let Some(report) = &report {
        Reports::write_gradle_report(&project.project_path, report)?;
    }
    Ok(report)
}

fn gradle_update_for(wrapper: &WrapperProperties, latest: ChannelDetails) -> Option<GradleUpdateReport> {
    let current = wrapper.current_version().unwrap_or_default();
    if !current.is_empty() && !VersionComparator::is_newer(&latest.version, &current) {
        info!(current = %current, latest = %latest.version, "Gradle is up to date");
        return None;
    }
    Some(GradleUpdateReport {
        project: ROOT_PROJECT_PATH.to_string(),
        gradle: GradleUpdateRec {
            current_version: current,
            latest_version: latest.version,
            distribution_url: latest.distribution_url,
        },
    })
}

/// Applies the root Gradle report to `gradle/wrapper/gradle-wrapper.properties`.
pub struct WrapperUpdater<'a> {
    project: &'a ProjectInfo,
}

impl<'a> WrapperUpdater<'a> {
    pub fn new(project: &'a ProjectInfo) -> Self {
        Self { project }
    }

    /// Stages the new wrapper properties. `None` when there is nothing to change.
    pub fn apply(
        &self,
        interaction: &mut UpdateInteraction,
        pending: &mut PendingWrites,
    ) -> Result<Option<GradleUpdateRec>> {
        let Some(report) = Reports::load_gradle_report(&self.project.project_path)? else {
            return Ok(None);
        };
        let Some(path) = self.project.wrapper_properties.as_deref() else {
            warn!("no Gradle wrapper found, nothing to update");
            return Ok(None);
        };
        let path = PathValidator::validate_file_path(path, &self.project.project_path)?;
        let wrapper = WrapperProperties::from_path(&path)?;

        let current = wrapper
            .current_version()
            .unwrap_or_else(|| report.gradle.current_version.clone());
        if !current.is_empty()
            && !VersionComparator::is_newer(&report.gradle.latest_version, &current)
        {
            return Ok(None);
        }
        let Some(content) = wrapper.with_distribution_url(&report.gradle.distribution_url) else {
            debug!(url = %report.gradle.distribution_url, "wrapper already uses this distribution");
            return Ok(None);
        };
        if !interaction.confirm(
            UpdateCategory::Gradle,
            "wrapper",
            &current,
            &report.gradle.latest_version,
        )? {
            return Ok(None);
        }

        pending.stage(wrapper.path.clone(), content);
        Ok(Some(GradleUpdateRec {
            current_version: current,
            ..report.gradle
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::ProjectScannerAgent;
    use crate::gradle::wrapper::WRAPPER_PROPERTIES;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    const PROPERTIES: &str = "distributionBase=GRADLE_USER_HOME\ndistributionUrl=https\\://services.gradle.org/distributions/gradle-7.2-bin.zip\n";

    fn details(version: &str) -> ChannelDetails {
        ChannelDetails {
            version: version.to_string(),
            distribution_url: format!(
                "https://services.gradle.org/distributions/gradle-{version}-bin.zip"
            ),
        }
    }

    fn wrapper() -> WrapperProperties {
        WrapperProperties {
            path: PathBuf::from(WRAPPER_PROPERTIES),
            content: PROPERTIES.to_string(),
        }
    }

    #[test]
    fn newer_release_produces_report() {
        let report = gradle_update_for(&wrapper(), details("8.5")).unwrap();
        assert_eq!(report.project, ":");
        assert_eq!(report.gradle.current_version, "7.2");
        assert_eq!(report.gradle.latest_version, "8.5");
    }

    #[test]
    fn same_or_older_release_produces_nothing() {
        assert!(gradle_update_for(&wrapper(), details("7.2")).is_none());
        assert!(gradle_update_for(&wrapper(), details("7.1")).is_none());
    }

    #[test]
    fn applies_gradle_report_to_wrapper() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("build.gradle"), "").unwrap();
        let path = root.join(WRAPPER_PROPERTIES);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, PROPERTIES).unwrap();
        let report = gradle_update_for(&wrapper(), details("8.5")).unwrap();
        Reports::write_gradle_report(root, &report).unwrap();

        let project = ProjectScannerAgent::new(root).validate().unwrap();
        let mut pending = PendingWrites::default();
        let applied = WrapperUpdater::new(&project)
            .apply(&mut UpdateInteraction::new(false), &mut pending)
            .unwrap()
            .unwrap();
        pending.commit().unwrap();

        assert_eq!(applied.latest_version, "8.5");
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "distributionBase=GRADLE_USER_HOME\ndistributionUrl=https\\://services.gradle.org/distributions/gradle-8.5-bin.zip\n"
        );
    }

    #[test]
    fn same_distribution_url_is_no_change() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("build.gradle"), "").unwrap();
        let path = root.join(WRAPPER_PROPERTIES);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "distributionUrl=https\\://mirror.example.com/gradle-dist.zip\n").unwrap();
        let report = GradleUpdateReport {
            project: ":".to_string(),
            gradle: GradleUpdateRec {
                current_version: String::new(),
                latest_version: "8.5".to_string(),
                distribution_url: "https://mirror.example.com/gradle-dist.zip".to_string(),
            },
        };
        Reports::write_gradle_report(root, &report).unwrap();

        let project = ProjectScannerAgent::new(root).validate().unwrap();
        let mut pending = PendingWrites::default();
        let applied = WrapperUpdater::new(&project)
            .apply(&mut UpdateInteraction::new(false), &mut pending)
            .unwrap();

        assert!(applied.is_none());
        assert!(pending.is_empty());
    }
}
