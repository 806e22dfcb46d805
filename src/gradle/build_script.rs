//! Text-level reading and rewriting of Gradle build scripts (Groovy and Kotlin DSL).
//!
//! Declarations are recognized per line:
//! - string notation: `implementation("group:name:version")`, `api 'group:name'`
//! - map notation: `implementation group: 'g', name: 'n', version: 'v'`
//! - `classpath` entries of a `buildscript { }` block
//! - plugin block entries: `id("p") version "v"`, `id 'p' version 'v'`,
//!   `id("p").version("v")` and `kotlin("jvm") version "v"`

use crate::repository::Coordinate;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

const KOTLIN_PLUGIN_PREFIX: &str = "org.jetbrains.kotlin.";
const BUILDSCRIPT_CONFIGURATION: &str = "classpath";
const PLUGINS_CONFIGURATION: &str = "plugins";

/// Configurations maintained by other tooling, never inspected.
const MANAGED_CONFIGURATIONS: &[&str] = &["unifiedClasspath"];
const MANAGED_CONFIGURATION_PREFIX: &str = "consistentVersions";

/// Identifiers that look like a configuration call but are not one.
const NON_CONFIGURATIONS: &[&str] = &[
    "id", "kotlin", "alias", "apply", "include", "maven", "url", "uri", "file", "project",
    "group", "version", "println", "from", "into",
];

static DEP_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*(\w+)\s*\(?\s*(?:(?:enforcedPlatform|platform|testFixtures)\s*\(\s*)?['"]([\w.\-]+):([\w.\-]+)(?::([^'"\s:@]+))?(?::[^'"\s@]*)?(?:@\w+)?['"]"#,
    )
    .unwrap()
});

static DEP_MAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*(\w+)\s*\(?\s*group\s*[:=]\s*['"]([^'"]+)['"]\s*,\s*name\s*[:=]\s*['"]([^'"]+)['"](?:\s*,\s*version\s*[:=]\s*['"]([^'"]+)['"])?"#,
    )
    .unwrap()
});

static PLUGIN_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\bid\s*\(?\s*['"]([\w.\-]+)['"]\s*\)?\s*(?:\.\s*version\s*\(\s*|version\s+)['"]([^'"]+)['"]"#,
    )
    .unwrap()
});

static PLUGIN_KOTLIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\bkotlin\s*\(\s*['"]([\w.\-]+)['"]\s*\)\s*(?:\.\s*version\s*\(\s*|version\s+)['"]([^'"]+)['"]"#,
    )
    .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclarationKind {
    Dependency,
    Plugin,
    Buildscript,
}

/// A version declared for a coordinate at a specific place in a build script.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub coordinate: Coordinate,
    /// `None` for versionless declarations that rely on a recommendations file
    pub version: Option<String>,
    pub configuration: String,
    pub kind: DeclarationKind,
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
}

/// Extract dependency and plugin declarations from a build script.
///
/// Interpolated (`$x`) and dynamic (`1.+`, `latest.release`, ranges) versions
/// are skipped, as are configurations listed in `excluded_configurations`.
pub fn parse_build_script(
    file: &Path,
    content: &str,
    excluded_configurations: &[String],
) -> Vec<Declaration> {
    let mut declarations = Vec::new();

    for (idx, raw_line) in content.lines().enumerate() {
        let line = strip_comment(raw_line);
        if line.trim().is_empty() {
            continue;
        }
        let line_number = idx + 1;

        let mut push = |coordinate: Coordinate,
                        version: Option<&str>,
                        configuration: &str,
                        kind: DeclarationKind| {
            if version.is_some_and(|v| !is_concrete_version(v)) {
                return;
            }
            declarations.push(Declaration {
                coordinate,
                version: version.map(str::to_string),
                configuration: configuration.to_string(),
                kind,
                file: file.to_path_buf(),
                line: line_number,
            });
        };

        let mut matched_plugin = false;
        for cap in PLUGIN_ID.captures_iter(line) {
            matched_plugin = true;
            push(
                Coordinate::plugin(&cap[1]),
                Some(&cap[2]),
                PLUGINS_CONFIGURATION,
                DeclarationKind::Plugin,
            );
        }
        for cap in PLUGIN_KOTLIN.captures_iter(line) {
            matched_plugin = true;
            push(
                Coordinate::plugin(format!("{KOTLIN_PLUGIN_PREFIX}{}", &cap[1])),
                Some(&cap[2]),
                PLUGINS_CONFIGURATION,
                DeclarationKind::Plugin,
            );
        }
        if matched_plugin {
            continue;
        }

        let captures = DEP_MAP.captures(line).or_else(|| DEP_STRING.captures(line));
        let Some(cap) = captures else {
            continue;
        };
        let configuration = &cap[1];
        if !is_inspected_configuration(configuration, excluded_configurations) {
            continue;
        }
        let kind = if configuration == BUILDSCRIPT_CONFIGURATION {
            DeclarationKind::Buildscript
        } else {
            DeclarationKind::Dependency
        };
        push(
            Coordinate::new(&cap[2], &cap[3]),
            cap.get(4).map(|m| m.as_str()),
            configuration,
            kind,
        );
    }

    declarations
}

fn is_inspected_configuration(configuration: &str, excluded: &[String]) -> bool {
    !NON_CONFIGURATIONS.contains(&configuration)
        && !MANAGED_CONFIGURATIONS.contains(&configuration)
        && !configuration.starts_with(MANAGED_CONFIGURATION_PREFIX)
        && !excluded.iter().any(|e| e == configuration)
}

/// Whether a declared version is a plain version rather than a selector or
/// an interpolated expression.
pub fn is_concrete_version(version: &str) -> bool {
    !version.is_empty()
        && !version.contains('$')
        && !version.contains('+')
        && !version.starts_with('[')
        && !version.starts_with('(')
        && !version.starts_with("latest.")
}

/// Cut a trailing `//` comment that is not inside a string literal.
fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut prev = '\0';
    for (idx, ch) in line.char_indices() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch == '/' && prev == '/' => return &line[..idx - 1],
            None => {}
        }
        prev = ch;
    }
    line
}

/// Result of rewriting plugin versions in one build script.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginRewrite {
    pub content: String,
    /// Previous versions of every declaration that changed
    pub replaced: Vec<String>,
}

/// Set the version of every declaration of `plugin_id` in `content`.
///
/// Only the version literal changes; quotes, spacing and all other text are
/// kept. Interpolated versions and `//` comments are left alone.
pub fn rewrite_plugin_version(content: &str, plugin_id: &str, new_version: &str) -> PluginRewrite {
    let version_tail = r#"\s*\)?\s*(?:\.\s*version\s*\(\s*|version\s+)['"])([^'"]+)(['"])"#;
    let mut patterns = vec![format!(
        r#"(\bid\s*\(?\s*['"]{}['"]{version_tail}"#,
        regex::escape(plugin_id)
    )];
    if let Some(short) = plugin_id.strip_prefix(KOTLIN_PLUGIN_PREFIX) {
        patterns.push(format!(
            r#"(\bkotlin\s*\(\s*['"]{}['"]{version_tail}"#,
            regex::escape(short)
        ));
    }
    let regexes: Vec<Regex> = patterns
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect();

    let mut rewritten = String::with_capacity(content.len());
    let mut replaced = Vec::new();
    for line in content.split_inclusive('\n') {
        let (code, comment) = line.split_at(strip_comment(line).len());
        let mut code = code.to_string();
        for regex in &regexes {
            code = regex
                .replace_all(&code, |caps: &Captures| {
                    let old = &caps[2];
                    if old.contains('$') || old == new_version {
                        return caps[0].to_string();
                    }
                    replaced.push(old.to_string());
                    format!("{}{}{}", &caps[1], new_version, &caps[3])
                })
                .into_owned();
        }
        rewritten.push_str(&code);
        rewritten.push_str(comment);
    }

    PluginRewrite {
        content: rewritten,
        replaced,
    }
}
