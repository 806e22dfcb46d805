use crate::report::UpdateReport;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// Merge `(key, latest version)` recommendations from several modules.
///
/// A key recommended with two different versions is dropped entirely, even if
/// later reports agree with one of them.
pub fn merge_recommendations<I, K, V>(recommendations: I, what: &str) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut merged: BTreeMap<String, String> = BTreeMap::new();
    let mut conflicted: BTreeSet<String> = BTreeSet::new();

    for (key, version) in recommendations {
        let key = key.into();
        let version = version.into();
        // once conflicted, a key stays out of the merge
        if conflicted.contains(&key) {
            continue;
        }
        match merged.get(&key) {
            Some(existing) if *existing != version => {
                warn!("Found conflicting version recommendation for {what} '{key}'");
                merged.remove(&key);
                conflicted.insert(key);
            }
            Some(_) => {}
            None => {
                merged.insert(key, version);
            }
        }
    }

    merged
}

/// `group:name -> latest` for every dependency recommendation.
pub fn dependency_recommendations(reports: &[UpdateReport]) -> BTreeMap<String, String> {
    for report in reports {
        info!(project = %report.project, "loaded report");
    }
    merge_recommendations(
        reports.iter().flat_map(|report| {
            report
                .dependency_updates
                .iter()
                .map(|rec| (rec.identifier(), rec.latest_version.as_str()))
        }),
        "dependency",
    )
}

/// `plugin id -> latest` for plugin marker recommendations; classpath entries are ignored.
pub fn plugin_recommendations(reports: &[UpdateReport]) -> BTreeMap<String, String> {
    merge_recommendations(
        reports.iter().flat_map(|report| {
            report.plugin_updates.iter().filter_map(|rec| {
                rec.coordinate()
                    .plugin_id()
                    .map(|id| (id.to_string(), rec.latest_version.as_str()))
            })
        }),
        "plugin",
    )
}
