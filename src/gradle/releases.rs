use crate::error::{Result, VersionsError};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error};

const GRADLE_SERVICES_URL: &str = "https://services.gradle.org/versions";

/// Gradle distribution release channels published by services.gradle.org.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReleaseChannel {
    #[default]
    Current,
    ReleaseCandidate,
    Nightly,
    ReleaseNightly,
}

impl ReleaseChannel {
    pub fn id(&self) -> &'static str {
        match self {
            ReleaseChannel::Current => "current",
            ReleaseChannel::ReleaseCandidate => "release-candidate",
            ReleaseChannel::Nightly => "nightly",
            ReleaseChannel::ReleaseNightly => "release-nightly",
        }
    }
}

impl fmt::Display for ReleaseChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ReleaseChannel {
    type Err = VersionsError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "current" => Ok(ReleaseChannel::Current),
            "release-candidate" => Ok(ReleaseChannel::ReleaseCandidate),
            "nightly" => Ok(ReleaseChannel::Nightly),
            "release-nightly" => Ok(ReleaseChannel::ReleaseNightly),
            other => Err(VersionsError::Config(format!(
                "Unknown Gradle release channel '{other}'"
            ))),
        }
    }
}

/// Latest distribution on a channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChannelDetails {
    pub version: String,
    #[serde(rename = "downloadUrl")]
    pub distribution_url: String,
}

pub struct GradleReleaseClient {
    client: Client,
    base_url: String,
}

impl GradleReleaseClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("gradle-versions/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: GRADLE_SERVICES_URL.to_string(),
        })
    }

    /// Latest distribution on `channel`; failures are logged and yield `None`.
    pub async fn for_channel(&self, channel: ReleaseChannel) -> Option<ChannelDetails> {
        let url = format!("{}/{}", self.base_url, channel.id());
        debug!(%url, "fetching Gradle channel");

        let response = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                error!(%channel, error = %e, "failed to fetch the latest Gradle version");
                return None;
            }
        };

        if !response.status().is_success() {
            error!(%channel, status = %response.status(), "failed to fetch the latest Gradle version");
            return None;
        }

        match response.text().await {
            Ok(body) => parse_channel_details(&body)
                .map_err(|e| error!(%channel, error = %e, "invalid Gradle channel response"))
                .ok(),
            Err(e) => {
                error!(%channel, error = %e, "failed to read Gradle channel response");
                None
            }
        }
    }
}

fn parse_channel_details(body: &str) -> Result<ChannelDetails> {
    Ok(serde_json::from_str(body)?)
}
