use crate::error::{Result, VersionsError};
use crate::props::FuzzyPatternResolver;
use regex::Regex;
use std::fs;
use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;
use tracing::info;

pub const VERSIONS_PROPS: &str = "versions.props";

static COMMENT_OR_EMPTY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\s*#.*|\s*)$").unwrap());
static VERSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<identifier>[^#\s:]+:[^#\s]+)\s*=\s*(?P<version>[^#\s]+)(?:\s*#\s*(?P<comment>.+))?\s*$",
    )
    .unwrap()
});

/// A change applied by [`VersionsProps::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedLine {
    pub dependency: String,
    pub old_version: String,
    pub new_version: String,
}

#[derive(Debug, Clone)]
enum Line {
    Other(String),
    Version {
        /// Full line text including its terminator
        text: String,
        identifier: String,
        version: Range<usize>,
    },
}

impl Line {
    fn text(&self) -> &str {
        match self {
            Line::Other(text) | Line::Version { text, .. } => text,
        }
    }
}

/// A parsed `versions.props` file that can be rewritten in place.
///
/// Serializing reproduces the input byte for byte except for the version
/// tokens changed through [`update`](Self::update).
#[derive(Debug, Clone)]
pub struct VersionsProps {
    lines: Vec<Line>,
    resolver: FuzzyPatternResolver,
}

impl VersionsProps {
    pub fn parse(content: &str) -> Result<Self> {
        let mut lines = Vec::new();
        let mut identifiers = Vec::new();

        for (idx, raw) in content.split_inclusive('\n').enumerate() {
            let body = raw.trim_end_matches('\n').trim_end_matches('\r');
            if COMMENT_OR_EMPTY.is_match(body) {
                lines.push(Line::Other(raw.to_string()));
                continue;
            }

            let cap = VERSION_LINE
                .captures(body)
                .ok_or_else(|| VersionsError::InvalidVersionLine {
                    line: idx + 1,
                    content: body.to_string(),
                })?;
            let identifier = cap["identifier"].to_string();
            let version = cap.name("version").map(|m| m.range()).unwrap_or_default();
            identifiers.push(identifier.clone());
            lines.push(Line::Version {
                text: raw.to_string(),
                identifier,
                version,
            });
        }

        Ok(Self {
            lines,
            resolver: FuzzyPatternResolver::new(identifiers),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn write_to_string(&self) -> String {
        self.lines.iter().map(Line::text).collect()
    }

    /// The identifier or glob that governs `identifier`.
    pub fn pattern_for(&self, identifier: &str) -> Option<&str> {
        self.resolver.pattern_for(identifier)
    }

    /// The pinned version that applies to `identifier`, if any pattern governs it.
    pub fn version_for(&self, identifier: &str) -> Option<&str> {
        let pattern = self.resolver.pattern_for(identifier)?;
        self.lines.iter().find_map(|line| match line {
            Line::Version {
                text,
                identifier,
                version,
            } if identifier == pattern => Some(&text[version.clone()]),
            _ => None,
        })
    }

    /// Set the version of the pattern that best matches `identifier`.
    ///
    /// Returns `None` when no pattern matches or the version is already current.
    pub fn update(&mut self, identifier: &str, new_version: &str) -> Option<UpdatedLine> {
        let Some(pattern) = self.resolver.pattern_for(identifier).map(str::to_string) else {
            info!(identifier, "no matching pattern");
            return None;
        };

        for line in &mut self.lines {
            let Line::Version {
                text,
                identifier: line_identifier,
                version,
            } = line
            else {
                continue;
            };
            if *line_identifier != pattern {
                continue;
            }

            let old_version = text[version.clone()].to_string();
            if old_version == new_version {
                return None;
            }

            info!("Setting {} = {}", pattern, new_version);
            text.replace_range(version.clone(), new_version);
            *version = version.start..version.start + new_version.len();
            return Some(UpdatedLine {
                dependency: pattern,
                old_version,
                new_version: new_version.to_string(),
            });
        }

        None
    }
}
