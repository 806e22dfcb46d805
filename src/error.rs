use thiserror::Error;

#[derive(Error, Debug)]
pub enum VersionsError {
    #[error("Project validation failed: {0}")]
    ProjectValidation(String),

    #[error("Invalid version line {line}: '{content}'")]
    InvalidVersionLine { line: usize, content: String },

    #[error("Repository query failed: {0}")]
    Repository(String),

    #[error("Report handling failed: {0}")]
    Report(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled by user")]
    UserCancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, VersionsError>;
