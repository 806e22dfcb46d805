use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Version representation following Maven's ordering rules
#[derive(Debug, Clone)]
pub struct Version {
    pub original: String,
    tokens: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Number(u64),
    Qualifier(String),
}

/// Qualifiers that mark a pre-release build. Single letters only count when
/// directly followed by a number (`1.0-M2`, `2.0b1`).
const UNSTABLE_QUALIFIERS: &[&str] = &[
    "alpha", "beta", "milestone", "rc", "cr", "snapshot", "dev", "eap", "preview", "canary",
    "ea", "nightly", "pre",
];
const UNSTABLE_LETTERS: &[&str] = &["a", "b", "m"];

impl Version {
    pub fn parse(version: &str) -> Self {
        Version {
            original: version.to_string(),
            tokens: Self::normalize(Self::tokenize(version)),
        }
    }

    fn tokenize(version: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut in_digits = false;

        let flush = |current: &mut String, tokens: &mut Vec<Token>, digits: bool| {
            if current.is_empty() {
                return;
            }
            let token = if digits {
                current
                    .parse::<u64>()
                    .map(Token::Number)
                    .unwrap_or_else(|_| Token::Qualifier(current.clone()))
            } else {
                Token::Qualifier(current.to_lowercase())
            };
            tokens.push(token);
            current.clear();
        };

        for ch in version.trim().chars() {
            if matches!(ch, '.' | '-' | '_' | '+') {
                flush(&mut current, &mut tokens, in_digits);
                continue;
            }
            let digit = ch.is_ascii_digit();
            if !current.is_empty() && digit != in_digits {
                flush(&mut current, &mut tokens, in_digits);
            }
            in_digits = digit;
            current.push(ch);
        }
        flush(&mut current, &mut tokens, in_digits);
        tokens
    }

    /// Drops zeros and release markers that do not affect ordering, so that
    /// `1.0`, `1.0.0` and `1.0.0.Final` compare equal.
    fn normalize(tokens: Vec<Token>) -> Vec<Token> {
        let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
        for token in tokens {
            if matches!(token, Token::Qualifier(_)) {
                Self::trim_insignificant(&mut out);
            }
            out.push(token);
        }
        Self::trim_insignificant(&mut out);
        out
    }

    fn trim_insignificant(tokens: &mut Vec<Token>) {
        while tokens.len() > 1 {
            match tokens.last() {
                Some(Token::Number(0)) => {
                    tokens.pop();
                }
                Some(Token::Qualifier(q)) if qualifier_rank(q) == RELEASE_RANK => {
                    tokens.pop();
                }
                _ => break,
            }
        }
    }

    pub fn is_stable(&self) -> bool {
        let raw = Self::tokenize(&self.original);
        for (idx, token) in raw.iter().enumerate() {
            let Token::Qualifier(q) = token else {
                continue;
            };
            if UNSTABLE_QUALIFIERS.contains(&q.as_str()) {
                return false;
            }
            if UNSTABLE_LETTERS.contains(&q.as_str())
                && matches!(raw.get(idx + 1), Some(Token::Number(_)))
            {
                return false;
            }
        }
        true
    }

    /// The first three numeric components, padded with zeros.
    fn release_triple(&self) -> [u64; 3] {
        let mut triple = [0; 3];
        let numbers = Self::tokenize(&self.original)
            .into_iter()
            .map_while(|t| match t {
                Token::Number(n) => Some(n),
                Token::Qualifier(_) => None,
            });
        for (slot, n) in triple.iter_mut().zip(numbers) {
            *slot = n;
        }
        triple
    }
}

const RELEASE_RANK: u8 = 5;

fn qualifier_rank(qualifier: &str) -> u8 {
    match qualifier {
        "alpha" | "a" => 0,
        "beta" | "b" => 1,
        "milestone" | "m" => 2,
        "rc" | "cr" => 3,
        "snapshot" => 4,
        "" | "ga" | "final" | "release" => RELEASE_RANK,
        "sp" => 6,
        _ => 7,
    }
}

fn compare_tokens(a: Option<&Token>, b: Option<&Token>) -> Ordering {
    match (a, b) {
        (Some(Token::Number(x)), Some(Token::Number(y))) => x.cmp(y),
        (Some(Token::Number(_)), Some(Token::Qualifier(_))) => Ordering::Greater,
        (Some(Token::Qualifier(_)), Some(Token::Number(_))) => Ordering::Less,
        (Some(Token::Qualifier(x)), Some(Token::Qualifier(y))) => {
            let (rx, ry) = (qualifier_rank(x), qualifier_rank(y));
            if rx == ry && rx == qualifier_rank("unknown") {
                x.cmp(y)
            } else {
                rx.cmp(&ry)
            }
        }
        (Some(Token::Number(x)), None) => x.cmp(&0),
        (Some(Token::Qualifier(q)), None) => qualifier_rank(q).cmp(&RELEASE_RANK),
        (None, Some(_)) => compare_tokens(b, a).reverse(),
        (None, None) => Ordering::Equal,
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.tokens.len().max(other.tokens.len());
        for idx in 0..len {
            match compare_tokens(self.tokens.get(idx), other.tokens.get(idx)) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }
}

/// How far apart two versions are, judged on their leading numeric components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeKind {
    Major,
    Minor,
    Patch,
    Other,
}

impl UpgradeKind {
    pub fn between(current: &str, latest: &str) -> Self {
        let [cur_major, cur_minor, cur_patch] = Version::parse(current).release_triple();
        let [new_major, new_minor, new_patch] = Version::parse(latest).release_triple();

        if cur_major != new_major {
            UpgradeKind::Major
        } else if cur_minor != new_minor {
            UpgradeKind::Minor
        } else if cur_patch != new_patch {
            UpgradeKind::Patch
        } else {
            UpgradeKind::Other
        }
    }
}

impl fmt::Display for UpgradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UpgradeKind::Major => "major",
            UpgradeKind::Minor => "minor",
            UpgradeKind::Patch => "patch",
            UpgradeKind::Other => "other",
        };
        f.write_str(label)
    }
}

pub struct VersionComparator;

impl VersionComparator {
    /// Get the latest version from a list, ignoring candidates `accept` rejects
    pub fn get_latest<F>(versions: &[String], accept: F) -> Option<String>
    where
        F: Fn(&Version) -> bool,
    {
        versions
            .iter()
            .map(|v| Version::parse(v))
            .filter(|v| accept(v))
            .max()
            .map(|v| v.original)
    }

    /// Check if version `a` is newer than version `b`
    pub fn is_newer(a: &str, b: &str) -> bool {
        Version::parse(a) > Version::parse(b)
    }

    /// Sort versions from newest to oldest, dropping duplicates
    pub fn sort_descending(versions: Vec<String>) -> Vec<String> {
        let mut parsed: Vec<Version> = versions.iter().map(|v| Version::parse(v)).collect();
        parsed.sort();
        parsed.dedup_by(|a, b| a.original == b.original);
        parsed.into_iter().rev().map(|v| v.original).collect()
    }
}
