use crate::error::{Result, VersionsError};
use crate::maven::repository::{DEFAULT_MAVEN_CENTRAL, GOOGLE_MAVEN, GRADLE_PLUGIN_PORTAL};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Gradle repository configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Repository {
    pub name: String,
    pub url: String,
    /// Regex patterns for group filtering (from mavenContent.includeGroupByRegex)
    pub group_filters: Vec<String>,
}

impl Repository {
    pub fn maven_central() -> Self {
        Self {
            name: "Maven Central".to_string(),
            url: DEFAULT_MAVEN_CENTRAL.to_string(),
            group_filters: Vec::new(),
        }
    }

    pub fn google() -> Self {
        Self {
            name: "Google Maven".to_string(),
            url: GOOGLE_MAVEN.to_string(),
            group_filters: vec![
                ".*google.*".to_string(),
                ".*android.*".to_string(),
                ".*androidx.*".to_string(),
            ],
        }
    }

    pub fn plugin_portal() -> Self {
        Self {
            name: "Gradle Plugin Portal".to_string(),
            url: GRADLE_PLUGIN_PORTAL.to_string(),
            group_filters: Vec::new(),
        }
    }

    pub fn custom(url: &str) -> Self {
        Self {
            name: format!("Custom ({})", shorten_url(url)),
            url: url.to_string(),
            group_filters: Vec::new(),
        }
    }
}

/// Gradle project configuration
#[derive(Debug, Clone)]
pub struct GradleConfig {
    pub repositories: Vec<Repository>,
}

/// Parser for the repository declarations of Gradle settings and build files
pub struct GradleConfigParser {
    project_path: PathBuf,
    extra_repositories: Vec<String>,
}

impl GradleConfigParser {
    pub fn new<P: AsRef<Path>>(project_path: P) -> Self {
        Self {
            project_path: project_path.as_ref().to_path_buf(),
            extra_repositories: Vec::new(),
        }
    }

    /// Repositories from the configuration file, tried before the declared ones.
    pub fn with_extra_repositories(mut self, urls: Vec<String>) -> Self {
        self.extra_repositories = urls;
        self
    }

    /// Parse Gradle configuration and extract repositories
    pub fn parse(&self) -> Result<GradleConfig> {
        let mut repositories: Vec<Repository> = self
            .extra_repositories
            .iter()
            .map(|url| Repository::custom(url))
            .collect();

        for file in [
            "settings.gradle.kts",
            "settings.gradle",
            "build.gradle.kts",
            "build.gradle",
        ] {
            let path = self.project_path.join(file);
            if !path.exists() {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            let found = if file.ends_with(".kts") {
                Self::extract_repositories_kotlin(&content)?
            } else {
                Self::extract_repositories_groovy(&content)?
            };
            debug!(file, count = found.len(), "repositories declared");
            repositories.extend(found);
        }

        if repositories.is_empty() {
            warn!("No repositories found in Gradle config, using defaults");
            repositories = Self::default_repositories();
        }

        Ok(GradleConfig {
            repositories: Self::deduplicate_repositories(repositories),
        })
    }

    fn extract_common(content: &str, repositories: &mut Vec<Repository>) {
        if content.contains("mavenCentral()") {
            repositories.push(Repository::maven_central());
        }
        if content.contains("google()") {
            repositories.push(Repository::google());
        }
        if content.contains("gradlePluginPortal()") {
            repositories.push(Repository::plugin_portal());
        }
    }

    fn extract_with(pattern: &str, content: &str, repositories: &mut Vec<Repository>) -> Result<()> {
        let regex = Regex::new(pattern)
            .map_err(|e| VersionsError::Config(format!("Regex error: {}", e)))?;
        for cap in regex.captures_iter(content) {
            if let Some(url) = cap.get(1) {
                repositories.push(Repository::custom(url.as_str()));
            }
        }
        Ok(())
    }

    /// Extract repositories from Kotlin DSL content
    fn extract_repositories_kotlin(content: &str) -> Result<Vec<Repository>> {
        let mut repositories = Vec::new();
        Self::extract_common(content, &mut repositories);

        // maven { url = uri("...") }
        Self::extract_with(
            r#"maven\s*\{\s*url\s*=\s*uri\s*\(\s*["']([^"']+)["']\s*\)\s*\}"#,
            content,
            &mut repositories,
        )?;
        // maven("...")
        Self::extract_with(
            r#"maven\s*\(\s*["']([^"']+)["']\s*\)"#,
            content,
            &mut repositories,
        )?;

        Ok(repositories)
    }

    /// Extract repositories from Groovy DSL content
    fn extract_repositories_groovy(content: &str) -> Result<Vec<Repository>> {
        let mut repositories = Vec::new();
        Self::extract_common(content, &mut repositories);

        // maven { url 'https://...' }
        Self::extract_with(
            r#"maven\s*\{\s*url\s+['"]([^'"]+)['"]"#,
            content,
            &mut repositories,
        )?;
        // maven { url = 'https://...' }
        Self::extract_with(
            r#"maven\s*\{\s*url\s*=\s*['"]([^'"]+)['"]"#,
            content,
            &mut repositories,
        )?;

        Ok(repositories)
    }

    fn default_repositories() -> Vec<Repository> {
        vec![Repository::maven_central(), Repository::google()]
    }

    /// Remove duplicate repositories, keeping the first declaration
    fn deduplicate_repositories(repos: Vec<Repository>) -> Vec<Repository> {
        let mut seen_urls = HashSet::new();
        let mut unique_repos = Vec::new();

        for repo in repos {
            let normalized_url = repo.url.trim_end_matches('/').to_string();

            if seen_urls.insert(normalized_url.clone()) {
                unique_repos.push(Repository {
                    url: normalized_url,
                    ..repo
                });
            }
        }

        unique_repos
    }
}

/// Shorten URL for display
fn shorten_url(url: &str) -> String {
    if let Some(domain_start) = url.find("://").map(|i| i + 3) {
        let domain_part = &url[domain_start..];
        if let Some(slash_pos) = domain_part.find('/') {
            return domain_part[..slash_pos].to_string();
        }
        return domain_part.to_string();
    }
    url.to_string()
}
