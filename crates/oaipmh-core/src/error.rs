use thiserror::Error;

/// Top-level error type for the OAI-PMH record store.
///
/// Subsystem crates define their own error types and convert from
/// `OaiError` so that `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OaiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for OaiError {
    fn from(err: toml::de::Error) -> Self {
        OaiError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for OaiError {
    fn from(err: toml::ser::Error) -> Self {
        OaiError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for OaiError {
    fn from(err: serde_json::Error) -> Self {
        OaiError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for record store operations.
pub type Result<T> = std::result::Result<T, OaiError>;
