use crate::error::{Result, VersionsError};
use crate::gradle::Repository as GradleRepository;
use crate::repository::{Coordinate, RepositoryClient};
use async_trait::async_trait;
use quick_xml::de::from_str;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_MAVEN_CENTRAL: &str = "https://repo1.maven.org/maven2";
pub const GOOGLE_MAVEN: &str = "https://dl.google.com/dl/android/maven2";
pub const GRADLE_PLUGIN_PORTAL: &str = "https://plugins.gradle.org/m2";
const MAX_METADATA_BYTES: usize = 10 * 1024 * 1024;
const MAX_RETRIES: u32 = 3;
const BASE_DELAY_MS: u64 = 100;

/// Maven repository client
pub struct MavenRepository {
    client: Client,
    repositories: Vec<GradleRepository>,
}

impl MavenRepository {
    pub fn with_repositories(repositories: Vec<GradleRepository>) -> Result<Self> {
        let client = Self::build_client()?;
        let repositories = if repositories.is_empty() {
            Self::default_repositories()
        } else {
            repositories
        };

        let repositories = Self::ensure_valid_repositories(repositories)?;

        Ok(Self {
            client,
            repositories,
        })
    }

    /// Fetch all available versions for a dependency, sorted from newest to oldest.
    /// Stops at the first repository that has the artifact. A repository that
    /// fails is skipped; the error surfaces only when every repository failed.
    pub async fn fetch_available_versions(
        &self,
        group: &str,
        artifact: &str,
    ) -> Result<Vec<String>> {
        let mut answered = false;
        let mut last_error = None;

        for repo in &self.repositories {
            // Skip repository if it has filters and group doesn't match any of them
            if !repo.group_filters.is_empty() && !Self::matches_filters(group, &repo.group_filters)
            {
                continue;
            }

            match self
                .fetch_all_versions_from_repository(&repo.url, group, artifact)
                .await
            {
                Ok(Some(versions)) if !versions.is_empty() => {
                    return Ok(crate::maven::VersionComparator::sort_descending(versions));
                }
                Ok(_) => answered = true,
                Err(e) => {
                    warn!(repository = %repo.url, error = %e, "skipping repository");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if !answered => Err(e),
            _ => Ok(Vec::new()),
        }
    }

    /// Check if a group matches any of the regex filters
    fn matches_filters(group: &str, filters: &[String]) -> bool {
        filters
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .any(|re| re.is_match(group))
    }

    pub fn metadata_url(repo_url: &str, group: &str, artifact: &str) -> String {
        format!(
            "{}/{}/{}/maven-metadata.xml",
            repo_url.trim_end_matches('/'),
            group.replace('.', "/"),
            artifact
        )
    }

    async fn fetch_all_versions_from_repository(
        &self,
        repo_url: &str,
        group: &str,
        artifact: &str,
    ) -> Result<Option<Vec<String>>> {
        let metadata_url = Self::metadata_url(repo_url, group, artifact);
        debug!(url = %metadata_url, "fetching metadata");

        let Some(text) = self.get_with_retry(&metadata_url).await? else {
            return Ok(None);
        };

        let metadata = parse_metadata(&text).map_err(|e| {
            VersionsError::Repository(format!("Failed to parse {metadata_url}: {e}"))
        })?;

        Ok(Some(metadata.versioning.versions.version))
    }

    /// GET with exponential backoff on rate limiting and server errors.
    /// Returns `None` for missing artifacts and unreachable repositories.
    async fn get_with_retry(&self, url: &str) -> Result<Option<String>> {
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=MAX_RETRIES {
            let response = match self.client.get(url).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    debug!(url, error = %e, "request failed");
                    return Ok(None);
                }
            };

            let status = response.status();
            let retryable =
                status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            if retryable && attempt < MAX_RETRIES {
                debug!(url, %status, attempt, "retrying after backoff");
                tokio::time::sleep(Duration::from_millis(delay)).await;
                delay *= 2;
                continue;
            }

            if !status.is_success() {
                debug!(url, %status, "no metadata");
                return Ok(None);
            }

            if response
                .content_length()
                .is_some_and(|len| len > MAX_METADATA_BYTES as u64)
            {
                return Err(metadata_too_large(url));
            }
            let text = response.text().await?;
            if text.len() > MAX_METADATA_BYTES {
                return Err(metadata_too_large(url));
            }
            return Ok(Some(text));
        }

        Ok(None)
    }
}

#[async_trait]
impl RepositoryClient for MavenRepository {
    async fn fetch_available_versions(&self, coordinate: &Coordinate) -> Result<Vec<String>> {
        MavenRepository::fetch_available_versions(self, &coordinate.group, &coordinate.artifact)
            .await
    }
}

impl MavenRepository {
    fn build_client() -> Result<Client> {
        Ok(Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("gradle-versions/", env!("CARGO_PKG_VERSION")))
            .build()?)
    }

    pub fn default_repositories() -> Vec<GradleRepository> {
        vec![GradleRepository::maven_central(), GradleRepository::google()]
    }

    fn ensure_valid_repositories(
        repositories: Vec<GradleRepository>,
    ) -> Result<Vec<GradleRepository>> {
        for repo in &repositories {
            Self::validate_repository_url(&repo.url)?;
        }
        Ok(repositories)
    }

    fn validate_repository_url(url: &str) -> Result<()> {
        let parsed = Url::parse(url)
            .map_err(|_| VersionsError::ProjectValidation(format!("Invalid repository URL: {url}")))?;

        match parsed.scheme() {
            "https" | "http" => {}
            scheme => {
                return Err(VersionsError::ProjectValidation(format!(
                    "Unsupported repository scheme: {scheme}"
                )));
            }
        }

        if let Some(host) = parsed.host_str() {
            if Self::is_private_host(host) {
                return Err(VersionsError::ProjectValidation(format!(
                    "Repository host '{host}' is not allowed"
                )));
            }
        }

        Ok(())
    }

    fn is_private_host(host: &str) -> bool {
        if host.eq_ignore_ascii_case("localhost") {
            return true;
        }

        let host = host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = host.parse::<IpAddr>() {
            match ip {
                IpAddr::V4(v4) => v4.is_private() || v4.is_loopback(),
                IpAddr::V6(v6) => v6.is_loopback() || v6.is_unique_local(),
            }
        } else {
            false
        }
    }
}

#[derive(Debug, Deserialize)]
struct MavenMetadata {
    #[serde(default)]
    versioning: Versioning,
}

#[derive(Debug, Default, Deserialize)]
struct Versioning {
    #[serde(default)]
    versions: Versions,
}

#[derive(Debug, Default, Deserialize)]
struct Versions {
    #[serde(default)]
    version: Vec<String>,
}

fn metadata_too_large(url: &str) -> VersionsError {
    VersionsError::Repository(format!(
        "Maven metadata response exceeded 10MB limit: {url}"
    ))
}

fn parse_metadata(text: &str) -> std::result::Result<MavenMetadata, quick_xml::DeError> {
    from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::stub_server::StubServer;

    #[test]
    fn accepts_https_repository() {
        assert!(
            MavenRepository::validate_repository_url("https://repo.maven.apache.org/maven2")
                .is_ok()
        );
    }

    #[test]
    fn rejects_invalid_scheme() {
        let err = MavenRepository::validate_repository_url("ftp://example.com").unwrap_err();
        assert!(matches!(err, VersionsError::ProjectValidation(_)));
    }

    #[test]
    fn rejects_private_host() {
        let err = MavenRepository::validate_repository_url("https://127.0.0.1/repo").unwrap_err();
        assert!(matches!(err, VersionsError::ProjectValidation(_)));
    }

    #[test]
    fn builds_metadata_url_from_coordinate() {
        assert_eq!(
            MavenRepository::metadata_url(
                "https://repo1.maven.org/maven2/",
                "com.google.guava",
                "guava"
            ),
            "https://repo1.maven.org/maven2/com/google/guava/guava/maven-metadata.xml"
        );
    }

    #[test]
    fn group_filters_are_regexes() {
        let filters = vec![".*androidx.*".to_string()];
        assert!(MavenRepository::matches_filters("androidx.core", &filters));
        assert!(!MavenRepository::matches_filters("com.squareup", &filters));
    }

    #[test]
    fn parses_maven_metadata_versions() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata>
  <groupId>com.google.guava</groupId>
  <artifactId>guava</artifactId>
  <versioning>
    <latest>31.1-jre</latest>
    <release>31.1-jre</release>
    <versions>
      <version>30.0-jre</version>
      <version>31.0.1-jre</version>
      <version>31.1-jre</version>
    </versions>
    <lastUpdated>20220301000000</lastUpdated>
  </versioning>
</metadata>"#;
        let metadata = parse_metadata(xml).unwrap();
        assert_eq!(
            metadata.versioning.versions.version,
            vec!["30.0-jre", "31.0.1-jre", "31.1-jre"]
        );
    }

    const GUAVA_METADATA: &str = "<metadata><versioning><versions>\
<version>30.0-jre</version><version>31.1-jre</version>\
</versions></versioning></metadata>";

    fn repository_at(urls: &[&str]) -> MavenRepository {
        MavenRepository {
            client: Client::builder().no_proxy().build().unwrap(),
            repositories: urls.iter().map(|url| GradleRepository::custom(url)).collect(),
        }
    }

    #[tokio::test]
    async fn retries_server_errors_with_backoff() {
        let server = StubServer::start(vec![
            (503, String::new()),
            (503, String::new()),
            (200, GUAVA_METADATA.to_string()),
        ])
        .await;

        let versions = repository_at(&[&server.url])
            .fetch_available_versions("com.google.guava", "guava")
            .await
            .unwrap();

        assert_eq!(server.requests(), 3);
        assert_eq!(versions, vec!["31.1-jre", "30.0-jre"]);
    }

    #[tokio::test]
    async fn rejects_oversized_metadata() {
        let server =
            StubServer::start(vec![(200, "a".repeat(MAX_METADATA_BYTES + 1))]).await;

        let err = repository_at(&[&server.url])
            .fetch_available_versions("com.google.guava", "guava")
            .await
            .unwrap_err();

        assert!(matches!(err, VersionsError::Repository(ref msg) if msg.contains("10MB")));
    }

    #[tokio::test]
    async fn falls_back_when_a_repository_serves_garbage() {
        let broken = StubServer::start(vec![(
            200,
            "<metadata><versioning></metadata>".to_string(),
        )])
        .await;
        let healthy = StubServer::start(vec![(200, GUAVA_METADATA.to_string())]).await;

        let versions = repository_at(&[&broken.url, &healthy.url])
            .fetch_available_versions("com.google.guava", "guava")
            .await
            .unwrap();

        assert_eq!(broken.requests(), 1);
        assert_eq!(versions, vec!["31.1-jre", "30.0-jre"]);
    }

    #[tokio::test]
    async fn missing_artifact_is_not_an_error() {
        let server = StubServer::start(vec![(404, String::new())]).await;

        let versions = repository_at(&[&server.url])
            .fetch_available_versions("com.example", "missing")
            .await
            .unwrap();

        assert!(versions.is_empty());
    }
}
