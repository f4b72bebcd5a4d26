//! Error types for evidence-types

use thiserror::Error;

/// Errors that can occur while handling evidence wire types
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid encoding (base64, hex)
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The envelope is structurally invalid
    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// The statement is structurally invalid
    #[error("Invalid statement: {0}")]
    InvalidStatement(String),

    /// A report was constructed in an inconsistent state
    #[error("Invalid report: {0}")]
    InvalidReport(String),
}

/// Result type for evidence wire types
pub type Result<T> = std::result::Result<T, Error>;
