//! Error types for the fixture model

use thiserror::Error;

/// Result type alias using the common Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while defining or serializing fixtures
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid device status: {0}")]
    InvalidStatus(String),

    #[error("Invalid fixture '{name}': {reason}")]
    InvalidFixture { name: String, reason: String },

    #[error("Unknown fixture: {0}")]
    UnknownFixture(String),

    #[error("Invalid route pattern '{pattern}': {reason}")]
    InvalidRoute { pattern: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
