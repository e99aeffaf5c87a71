//! Error types for bk-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for bk-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for bk-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Input did not start with the `s3://` scheme
    #[error("Expected S3 URI starting with 's3://', got '{0}'")]
    InvalidScheme(String),

    /// Invalid bucket, key or prefix
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Authentication or permission failure reported by the store
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Bucket or object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network or service error from the store
    #[error("Network error: {0}")]
    Network(String),

    /// Conflict error, e.g. deleting a non-empty bucket
    #[error("Conflict: {0}")]
    Conflict(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidScheme(_) | Error::InvalidPath(_) => 2, // UsageError
            Error::Config(_) | Error::InvalidUrl(_) => 2,         // UsageError
            Error::Network(_) => 3,                               // NetworkError
            Error::Auth(_) => 4,                                  // AuthError
            Error::NotFound(_) => 5,                              // NotFound
            Error::Conflict(_) => 6,                              // Conflict
            _ => 1,                                               // GeneralError
        }
    }
}
