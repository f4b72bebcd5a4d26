//! Unified error type for the evidence engine

use thiserror::Error;

/// Errors surfaced by the high-level evidence operations
#[derive(Error, Debug)]
pub enum Error {
    /// Wire-type error
    #[error("Types error: {0}")]
    Types(#[from] evidence_types::Error),

    /// Key handling or signing error
    #[error("Crypto error: {0}")]
    Crypto(#[from] evidence_crypto::Error),

    /// Trust-root selection or loading error
    #[error("Trust error: {0}")]
    Trust(#[from] evidence_trust::Error),

    /// Verification orchestration error
    #[error("Verification error: {0}")]
    Verify(#[from] evidence_verify::Error),

    /// Invalid operation configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// No passphrase could be obtained for an encrypted signing key
    #[error("Passphrase error: {0}")]
    Passphrase(String),

    /// The key-store alias is already taken
    #[error("Key alias already exists: {0}")]
    AliasExists(String),

    /// Trusted-key store operation failed
    #[error("Key store error: {0}")]
    KeyStore(String),
}

/// Result type for high-level evidence operations
pub type Result<T> = std::result::Result<T, Error>;
