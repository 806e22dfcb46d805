use crate::error::{Result, VersionsError};
use crate::gradle::{Declaration, DeclarationKind};
use crate::gradle::build_script::is_concrete_version;
use crate::repository::Coordinate;
use std::path::Path;
use toml_edit::{DocumentMut, Item, Table};

pub const VERSION_CATALOG: &str = "gradle/libs.versions.toml";
const CATALOG_CONFIGURATION: &str = "versionCatalog";

/// Helpers for reading entries of a Gradle version catalog.
pub struct TomlUtils;

impl TomlUtils {
    /// Extracts the coordinate from `"g:a:v"` strings, `module = "g:a"`, or `group`/`name` pairs.
    pub fn extract_coordinate(item: &Item) -> Option<Coordinate> {
        if let Some(raw) = item.as_str() {
            return Coordinate::parse(raw);
        }

        let table = item.as_table_like()?;
        if let Some(module) = table.get("module").and_then(|v| v.as_str()) {
            return Coordinate::parse(module);
        }
        match (
            table.get("group").and_then(|v| v.as_str()),
            table.get("name").and_then(|v| v.as_str()),
        ) {
            (Some(group), Some(name)) => Some(Coordinate::new(group, name)),
            _ => None,
        }
    }

    /// The version of a catalog entry, following `version.ref` into `[versions]`.
    ///
    /// `{ strictly = "x" }` and `{ require = "x" }` rich versions are read as `x`.
    pub fn extract_version(item: &Item, versions: Option<&Table>) -> Option<String> {
        if let Some(raw) = item.as_str() {
            return raw.splitn(3, ':').nth(2).map(str::to_string);
        }

        let version = item.as_table_like()?.get("version")?;
        if let Some(v) = version.as_str() {
            return Some(v.to_string());
        }

        let rich = version.as_table_like()?;
        if let Some(key) = rich.get("ref").and_then(|v| v.as_str()) {
            return versions?
                .get(key)
                .and_then(|resolved| Self::rich_version(resolved));
        }
        Self::rich_version(version)
    }

    fn rich_version(item: &Item) -> Option<String> {
        if let Some(v) = item.as_str() {
            return Some(v.to_string());
        }
        let table = item.as_table_like()?;
        ["strictly", "require", "prefer"]
            .iter()
            .find_map(|key| table.get(key).and_then(|v| v.as_str()))
            .map(str::to_string)
    }

    /// Plugin entries are either `"id:version"` or `{ id = "...", version = ... }`.
    pub fn extract_plugin(item: &Item, versions: Option<&Table>) -> Option<(String, Option<String>)> {
        if let Some(raw) = item.as_str() {
            let mut parts = raw.splitn(2, ':');
            let id = parts.next().filter(|id| !id.is_empty())?;
            return Some((id.to_string(), parts.next().map(str::to_string)));
        }
        let id = item.as_table_like()?.get("id")?.as_str()?;
        Some((id.to_string(), Self::extract_version(item, versions)))
    }

    /// Declarations made by a `libs.versions.toml` catalog.
    pub fn catalog_declarations(path: &Path, content: &str) -> Result<Vec<Declaration>> {
        let doc: DocumentMut = content.parse().map_err(|e| {
            VersionsError::Config(format!("Failed to parse {}: {e}", path.display()))
        })?;
        let versions = doc.get("versions").and_then(|v| v.as_table());
        let mut declarations = Vec::new();

        let mut push = |section: &str,
                        key: &str,
                        coordinate: Coordinate,
                        version: Option<String>,
                        kind: DeclarationKind| {
            let Some(version) = version.filter(|v| is_concrete_version(v)) else {
                return;
            };
            declarations.push(Declaration {
                coordinate,
                version: Some(version),
                configuration: CATALOG_CONFIGURATION.to_string(),
                kind,
                file: path.to_path_buf(),
                line: line_of(content, section, key),
            });
        };

        if let Some(libraries) = doc.get("libraries").and_then(|v| v.as_table()) {
            for (key, item) in libraries.iter() {
                if let Some(coordinate) = Self::extract_coordinate(item) {
                    let version = Self::extract_version(item, versions);
                    push("libraries", key, coordinate, version, DeclarationKind::Dependency);
                }
            }
        }

        if let Some(plugins) = doc.get("plugins").and_then(|v| v.as_table()) {
            for (key, item) in plugins.iter() {
                if let Some((id, version)) = Self::extract_plugin(item, versions) {
                    push("plugins", key, Coordinate::plugin(id), version, DeclarationKind::Plugin);
                }
            }
        }

        Ok(declarations)
    }
}

/// 1-based line of `key` within `[section]`, or 0 when not found.
fn line_of(content: &str, section: &str, key: &str) -> usize {
    let header = format!("[{section}]");
    let mut in_section = false;
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            in_section = trimmed == header;
            continue;
        }
        let is_key = trimmed
            .trim_matches('"')
            .strip_prefix(key)
            .is_some_and(|rest| rest.trim_start_matches('"').trim_start().starts_with('='));
        if in_section && is_key {
            return idx + 1;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"[versions]
okhttp = "4.9.0"
kotlin = { strictly = "1.6.10" }

[libraries]
okhttp = { module = "com.squareup.okhttp3:okhttp", version.ref = "okhttp" }
guava = "com.google.guava:guava:30.0-jre"
junit = { group = "junit", name = "junit", version = "4.13" }
bom-managed = { module = "org.slf4j:slf4j-api" }

[plugins]
kotlin-jvm = { id = "org.jetbrains.kotlin.jvm", version.ref = "kotlin" }
spotless = "com.diffplug.spotless:6.0.0"
"#;

    #[test]
    fn reads_library_and_plugin_entries() {
        let decls = TomlUtils::catalog_declarations(Path::new(VERSION_CATALOG), CATALOG).unwrap();
        let found: Vec<(String, Option<&str>)> = decls
            .iter()
            .map(|d| (d.coordinate.to_string(), d.version.as_deref()))
            .collect();

        assert_eq!(
            found,
            vec![
                ("com.squareup.okhttp3:okhttp".to_string(), Some("4.9.0")),
                ("com.google.guava:guava".to_string(), Some("30.0-jre")),
                ("junit:junit".to_string(), Some("4.13")),
                (
                    "org.jetbrains.kotlin.jvm:org.jetbrains.kotlin.jvm.gradle.plugin".to_string(),
                    Some("1.6.10")
                ),
                (
                    "com.diffplug.spotless:com.diffplug.spotless.gradle.plugin".to_string(),
                    Some("6.0.0")
                ),
            ]
        );
        assert_eq!(decls[0].line, 6);
        assert_eq!(decls[3].kind, DeclarationKind::Plugin);
    }

    #[test]
    fn extracts_coordinate_from_group_and_name() {
        let doc: DocumentMut = r#"lib = { group = "com.test", name = "artifact" }"#.parse().unwrap();
        assert_eq!(
            TomlUtils::extract_coordinate(doc.get("lib").unwrap()),
            Some(Coordinate::new("com.test", "artifact"))
        );
    }

    #[test]
    fn invalid_catalog_is_a_config_error() {
        let err = TomlUtils::catalog_declarations(Path::new(VERSION_CATALOG), "[libraries\n")
            .unwrap_err();
        assert!(matches!(err, VersionsError::Config(_)));
    }
}
