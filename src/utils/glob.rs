use crate::error::{Result, VersionsError};
use regex::Regex;

/// Case-insensitive glob (`*`, `?`) matched against a whole string.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    raw: String,
    regex: Regex,
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(VersionsError::Config("Glob pattern cannot be empty".to_string()));
        }

        Ok(Self {
            raw: trimmed.to_string(),
            regex: Self::compile_glob(trimmed)?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    fn compile_glob(pattern: &str) -> Result<Regex> {
        let mut regex = String::from("(?i)^");
        for ch in pattern.chars() {
            match ch {
                '*' => regex.push_str(".*"),
                '?' => regex.push('.'),
                '.' | '+' | '(' | ')' | '|' | '^' | '$' | '{' | '}' | '[' | ']' | '\\' => {
                    regex.push('\\');
                    regex.push(ch);
                }
                _ => regex.push(ch),
            }
        }
        regex.push('$');

        Regex::new(&regex).map_err(|e| {
            VersionsError::Config(format!("Invalid glob pattern '{}': {}", pattern, e))
        })
    }
}
