use crate::error::Result;
use regex::{NoExpand, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub const WRAPPER_PROPERTIES: &str = "gradle/wrapper/gradle-wrapper.properties";

static DISTRIBUTION_URL_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"distributionUrl=[^\r\n]*").unwrap());
static DISTRIBUTION_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"gradle-([^/\\]+?)-(bin|all)\.zip").unwrap());

/// The checked-in `gradle-wrapper.properties` of a build.
#[derive(Debug, Clone)]
pub struct WrapperProperties {
    pub path: PathBuf,
    pub content: String,
}

impl WrapperProperties {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }

    /// The distribution URL with property escapes removed.
    pub fn distribution_url(&self) -> Option<String> {
        DISTRIBUTION_URL_LINE
            .find(&self.content)
            .map(|m| unescape_url(&m.as_str()["distributionUrl=".len()..]))
    }

    pub fn current_version(&self) -> Option<String> {
        let url = self.distribution_url()?;
        DISTRIBUTION_VERSION
            .captures(&url)
            .map(|cap| cap[1].to_string())
    }

    pub fn is_all_distribution(&self) -> bool {
        self.distribution_url()
            .is_some_and(|url| url.ends_with("-all.zip"))
    }

    /// The file content pointing at `url`, or `None` when nothing would change.
    /// An `-all` distribution stays `-all`.
    pub fn with_distribution_url(&self, url: &str) -> Option<String> {
        let url = if self.is_all_distribution() {
            to_all_distribution(url)
        } else {
            url.to_string()
        };
        let updated = update_distribution_url(&self.content, &url);
        (updated != self.content).then_some(updated)
    }
}

/// Replace the first `distributionUrl=` line, escaping `:` as properties require.
/// Content without such a line is returned unchanged.
pub fn update_distribution_url(content: &str, url: &str) -> String {
    let replacement = format!("distributionUrl={}", escape_url(url));
    DISTRIBUTION_URL_LINE
        .replace(content, NoExpand(&replacement))
        .into_owned()
}

pub fn escape_url(url: &str) -> String {
    url.replace(':', "\\:")
}

fn unescape_url(url: &str) -> String {
    url.trim().replace("\\:", ":")
}

fn to_all_distribution(url: &str) -> String {
    match url.strip_suffix("-bin.zip") {
        Some(prefix) => format!("{prefix}-all.zip"),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const ORIGINAL: &str = "distributionBase=GRADLE_USER_HOME\n\
distributionPath=wrapper/dists\n\
distributionUrl=https\\://services.gradle.org/distributions/gradle-7.2-bin.zip\n\
zipStoreBase=GRADLE_USER_HOME\n\
zipStorePath=wrapper/dists\n";

    #[test]
    fn escapes_colons() {
        assert_eq!(escape_url("https://foo.com"), "https\\://foo.com");
    }

    #[test]
    fn replaces_distribution_url() {
        let desired = ORIGINAL.replace("gradle-7.2-bin", "gradle-7.3-bin");
        assert_eq!(
            update_distribution_url(
                ORIGINAL,
                "https://services.gradle.org/distributions/gradle-7.3-bin.zip"
            ),
            desired
        );
    }

    #[test]
    fn replaces_only_first_line_and_keeps_crlf() {
        let content = "distributionUrl=a\r\ndistributionUrl=b\r\n";
        assert_eq!(
            update_distribution_url(content, "c"),
            "distributionUrl=c\r\ndistributionUrl=b\r\n"
        );
        assert_eq!(update_distribution_url("foo=bar\n", "c"), "foo=bar\n");
    }

    #[test]
    fn reads_current_version() {
        let wrapper = WrapperProperties {
            path: PathBuf::from(WRAPPER_PROPERTIES),
            content: ORIGINAL.to_string(),
        };
        assert_eq!(wrapper.current_version().as_deref(), Some("7.2"));
        assert!(!wrapper.is_all_distribution());
    }

    #[test]
    fn keeps_all_distribution() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(WRAPPER_PROPERTIES);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, ORIGINAL.replace("-bin.zip", "-all.zip")).unwrap();

        let wrapper = WrapperProperties::from_path(&path).unwrap();
        let updated = wrapper
            .with_distribution_url("https://services.gradle.org/distributions/gradle-8.5-bin.zip")
            .unwrap();

        assert!(updated.contains(
            "distributionUrl=https\\://services.gradle.org/distributions/gradle-8.5-all.zip\n"
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), ORIGINAL.replace("-bin.zip", "-all.zip"));
    }

    #[test]
    fn same_url_is_no_change() {
        let wrapper = WrapperProperties {
            path: PathBuf::from(WRAPPER_PROPERTIES),
            content: ORIGINAL.to_string(),
        };
        assert_eq!(
            wrapper.with_distribution_url(
                "https://services.gradle.org/distributions/gradle-7.2-bin.zip"
            ),
            None
        );
    }
}
