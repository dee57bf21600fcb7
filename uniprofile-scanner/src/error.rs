use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Username is empty")]
    EmptyUsername,

    #[error("Username '{0}' contains invalid characters (allowed: A-Z, a-z, 0-9, -, _, .)")]
    InvalidUsername(String),

    #[error("Invalid URL template for {site}: {reason}")]
    InvalidTemplate { site: String, reason: String },

    #[error("Invalid site registry: {0}")]
    Registry(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
