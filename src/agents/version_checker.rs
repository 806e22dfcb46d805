use crate::agents::inventory::ModuleInventory;
use crate::gradle::{Declaration, DeclarationKind};
use crate::maven::{Version, VersionPolicy};
use crate::report::{DependencyUpdateRec, UpdateReport};
use crate::repository::{Coordinate, RepositoryClient};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

/// Which report section (and which repositories) a declaration belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Section {
    Dependencies,
    Plugins,
}

impl From<DeclarationKind> for Section {
    fn from(kind: DeclarationKind) -> Self {
        match kind {
            DeclarationKind::Dependency => Section::Dependencies,
            DeclarationKind::Plugin | DeclarationKind::Buildscript => Section::Plugins,
        }
    }
}

type Lookup = (Section, Coordinate);

/// Finds the newest allowed version of every declared coordinate.
pub struct VersionChecker {
    libraries: Arc<dyn RepositoryClient>,
    plugins: Arc<dyn RepositoryClient>,
    policy: VersionPolicy,
    concurrency: usize,
    show_progress: bool,
}

impl VersionChecker {
    pub fn new(
        libraries: Arc<dyn RepositoryClient>,
        plugins: Arc<dyn RepositoryClient>,
        policy: VersionPolicy,
        concurrency: usize,
    ) -> Self {
        Self {
            libraries,
            plugins,
            policy,
            concurrency: concurrency.max(1),
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// One report per inventory, in the same order.
    pub async fn check(&self, inventories: &[ModuleInventory]) -> Vec<UpdateReport> {
        let lookups: BTreeSet<Lookup> = inventories
            .iter()
            .flat_map(|inventory| inventory.declarations.iter())
            .filter(|declaration| !self.policy.is_ignored(&declaration.coordinate))
            .map(|declaration| (Section::from(declaration.kind), declaration.coordinate.clone()))
            .collect();

        let available = self.fetch_all(lookups).await;

        inventories
            .iter()
            .map(|inventory| self.build_report(inventory, &available))
            .collect()
    }

    async fn fetch_all(&self, lookups: BTreeSet<Lookup>) -> HashMap<Lookup, Vec<String>> {
        let pb = self.progress_bar(lookups.len());

        let results: Vec<(Lookup, Option<Vec<String>>)> = stream::iter(lookups)
            .map(|lookup| {
                let pb = pb.clone();
                async move {
                    let client = match lookup.0 {
                        Section::Dependencies => &self.libraries,
                        Section::Plugins => &self.plugins,
                    };
                    pb.set_message(format!("Checking {}", lookup.1));
                    let versions = match client.fetch_available_versions(&lookup.1).await {
                        Ok(versions) => Some(versions),
                        Err(e) => {
                            warn!(coordinate = %lookup.1, error = %e, "version lookup failed, skipping");
                            None
                        }
                    };
                    pb.inc(1);
                    (lookup, versions)
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        pb.finish_and_clear();
        results
            .into_iter()
            .filter_map(|(lookup, versions)| versions.map(|v| (lookup, v)))
            .collect()
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        let pb = ProgressBar::new(len as u64);
        if !self.show_progress {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        if let Ok(style) = ProgressStyle::default_bar().template("  [{bar:40}] {pos}/{len} {msg}") {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb
    }

    fn build_report(
        &self,
        inventory: &ModuleInventory,
        available: &HashMap<Lookup, Vec<String>>,
    ) -> UpdateReport {
        let mut report = UpdateReport::new(inventory.module.path.clone());

        for ((section, coordinate), current) in lowest_declared_versions(&inventory.declarations) {
            if self.policy.is_ignored(&coordinate) {
                continue;
            }
            let Some(versions) = available.get(&(section, coordinate.clone())) else {
                continue;
            };
            let Some(latest) = self.policy.select_upgrade(&current, versions) else {
                debug!(%coordinate, current = %current, "up to date");
                continue;
            };

            let rec = DependencyUpdateRec::new(&coordinate, &current, &latest);
            match section {
                Section::Dependencies => report.dependency_updates.push(rec),
                Section::Plugins => report.plugin_updates.push(rec),
            }
        }

        report.sort();
        report
    }
}

/// The lowest declared version of each coordinate, per report section.
fn lowest_declared_versions(declarations: &[Declaration]) -> BTreeMap<Lookup, String> {
    let mut lowest: BTreeMap<Lookup, String> = BTreeMap::new();
    for declaration in declarations {
        let Some(version) = &declaration.version else {
            continue;
        };
        let key = (Section::from(declaration.kind), declaration.coordinate.clone());
        match lowest.get(&key) {
            Some(existing) if Version::parse(existing) <= Version::parse(version) => {}
            _ => {
                lowest.insert(key, version.clone());
            }
        }
    }
    lowest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, VersionsError};
    use crate::gradle::Module;
    use async_trait::async_trait;
    use std::path::PathBuf;

    struct FakeClient {
        versions: HashMap<Coordinate, Vec<String>>,
    }

    impl FakeClient {
        fn new(entries: Vec<(Coordinate, Vec<&str>)>) -> Arc<Self> {
            Arc::new(Self {
                versions: entries
                    .into_iter()
                    .map(|(c, v)| (c, v.into_iter().map(str::to_string).collect()))
                    .collect(),
            })
        }
    }

    #[async_trait]
    impl RepositoryClient for FakeClient {
        async fn fetch_available_versions(&self, coordinate: &Coordinate) -> Result<Vec<String>> {
            if coordinate.artifact == "unreachable" {
                return Err(VersionsError::Repository("connection reset".to_string()));
            }
            Ok(self.versions.get(coordinate).cloned().unwrap_or_default())
        }
    }

    fn declaration(coordinate: Coordinate, version: &str, kind: DeclarationKind) -> Declaration {
        Declaration {
            coordinate,
            version: Some(version.to_string()),
            configuration: "implementation".to_string(),
            kind,
            file: PathBuf::from("build.gradle"),
            line: 1,
        }
    }

    fn inventory(path: &str, declarations: Vec<Declaration>) -> ModuleInventory {
        ModuleInventory {
            module: Module {
                path: path.to_string(),
                dir: PathBuf::from("."),
                build_file: None,
            },
            declarations,
        }
    }

    #[tokio::test]
    async fn reports_dependency_and_plugin_upgrades() {
        let guava = Coordinate::new("com.google.guava", "guava");
        let spotless = Coordinate::plugin("com.diffplug.spotless");
        let libraries = FakeClient::new(vec![(guava.clone(), vec!["30.0-jre", "31.1-jre", "32.0.0-rc1"])]);
        let plugins = FakeClient::new(vec![(spotless.clone(), vec!["6.0.0", "6.25.0"])]);

        let checker = VersionChecker::new(libraries, plugins, VersionPolicy::default(), 4)
            .with_progress(false);
        let reports = checker
            .check(&[inventory(
                ":app",
                vec![
                    declaration(guava, "30.0-jre", DeclarationKind::Dependency),
                    declaration(spotless, "6.0.0", DeclarationKind::Plugin),
                ],
            )])
            .await;

        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.project, ":app");
        assert_eq!(report.dependency_updates.len(), 1);
        assert_eq!(report.dependency_updates[0].latest_version, "31.1-jre");
        assert_eq!(report.plugin_updates.len(), 1);
        assert_eq!(report.plugin_updates[0].group, "com.diffplug.spotless");
        assert_eq!(report.plugin_updates[0].latest_version, "6.25.0");
    }

    #[tokio::test]
    async fn reports_lowest_declared_version_once() {
        let okhttp = Coordinate::new("com.squareup.okhttp3", "okhttp");
        let libraries = FakeClient::new(vec![(okhttp.clone(), vec!["4.9.0", "4.12.0"])]);
        let checker = VersionChecker::new(libraries, FakeClient::new(vec![]), VersionPolicy::default(), 2)
            .with_progress(false);

        let reports = checker
            .check(&[inventory(
                ":",
                vec![
                    declaration(okhttp.clone(), "4.10.0", DeclarationKind::Dependency),
                    declaration(okhttp, "4.9.0", DeclarationKind::Dependency),
                ],
            )])
            .await;

        assert_eq!(reports[0].dependency_updates.len(), 1);
        assert_eq!(reports[0].dependency_updates[0].current_version, "4.9.0");
    }

    #[tokio::test]
    async fn failures_ignored_coordinates_and_current_versions_are_skipped() {
        let current = Coordinate::new("junit", "junit");
        let broken = Coordinate::new("com.example", "unreachable");
        let locked = Coordinate::new("com.locked", "lib");
        let libraries = FakeClient::new(vec![
            (current.clone(), vec!["4.13.2"]),
            (locked.clone(), vec!["1.0", "2.0"]),
        ]);
        let policy = VersionPolicy::new(
            true,
            vec!["-rc".to_string()],
            vec![crate::utils::glob::GlobPattern::new("com.locked:*").unwrap()],
        );
        let checker = VersionChecker::new(libraries, FakeClient::new(vec![]), policy, 2)
            .with_progress(false);

        let reports = checker
            .check(&[inventory(
                ":",
                vec![
                    declaration(current, "4.13.2", DeclarationKind::Dependency),
                    declaration(broken, "1.0", DeclarationKind::Dependency),
                    declaration(locked, "1.0", DeclarationKind::Dependency),
                ],
            )])
            .await;

        assert!(reports[0].is_empty());
    }
}
