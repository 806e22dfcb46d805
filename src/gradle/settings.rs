use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub const ROOT_PROJECT_PATH: &str = ":";

static INCLUDE_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\binclude\s*\(([^)]*)\)").unwrap());
static INCLUDE_GROOVY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^\s*include\s+((?:['"][^'"]*['"]\s*,?\s*)+)"#).unwrap());
static QUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"['"]([^'"]+)['"]"#).unwrap());
static PROJECT_DIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"project\(\s*['"]([^'"]+)['"]\s*\)\.projectDir\s*=\s*(?:file\(\s*|new\s+File\(\s*(?:rootDir|settingsDir)\s*,\s*)['"]([^'"]+)['"]"#,
    )
    .unwrap()
});

/// A module of the Gradle build as declared in the settings file.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Gradle project path, `:` for the root project
    pub path: String,
    pub dir: PathBuf,
    pub build_file: Option<PathBuf>,
}

impl Module {
    pub fn new(path: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            path: path.into(),
            build_file: find_build_file(&dir),
            dir,
        }
    }

    pub fn is_root(&self) -> bool {
        self.path == ROOT_PROJECT_PATH
    }
}

/// Locate `build.gradle.kts` or `build.gradle` in a module directory.
pub fn find_build_file(dir: &Path) -> Option<PathBuf> {
    ["build.gradle.kts", "build.gradle"]
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Gradle project paths included by a settings script, in declaration order.
pub fn parse_includes(content: &str) -> Vec<String> {
    let content = strip_line_comments(content);
    let mut includes = Vec::new();

    let mut push = |raw: &str| {
        let normalized = normalize_project_path(raw);
        if normalized != ROOT_PROJECT_PATH && !includes.contains(&normalized) {
            includes.push(normalized);
        }
    };

    for cap in INCLUDE_CALL.captures_iter(&content) {
        for quoted in QUOTED.captures_iter(&cap[1]) {
            push(&quoted[1]);
        }
    }
    for cap in INCLUDE_GROOVY.captures_iter(&content) {
        for quoted in QUOTED.captures_iter(&cap[1]) {
            push(&quoted[1]);
        }
    }

    includes
}

/// `project(":x").projectDir = file("dir")` overrides, keyed by project path.
pub fn parse_project_dirs(content: &str) -> HashMap<String, String> {
    let content = strip_line_comments(content);
    PROJECT_DIR
        .captures_iter(&content)
        .map(|cap| (normalize_project_path(&cap[1]), cap[2].to_string()))
        .collect()
}

/// Build the module list for a root directory and its settings script.
pub fn discover_modules(root: &Path, settings: Option<&str>) -> Vec<Module> {
    let mut modules = vec![Module::new(ROOT_PROJECT_PATH, root)];
    let Some(settings) = settings else {
        return modules;
    };

    let overrides = parse_project_dirs(settings);
    for path in parse_includes(settings) {
        let relative = overrides
            .get(&path)
            .cloned()
            .unwrap_or_else(|| project_path_to_dir(&path));
        modules.push(Module::new(path, root.join(relative)));
    }
    modules
}

fn normalize_project_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches(':');
    format!(":{trimmed}")
}

fn project_path_to_dir(path: &str) -> String {
    path.trim_start_matches(':').replace(':', "/")
}

fn strip_line_comments(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}
