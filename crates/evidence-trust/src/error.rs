//! Error types for evidence-trust

use thiserror::Error;

/// Errors that can occur while selecting or loading trust material
#[derive(Error, Debug)]
pub enum Error {
    /// The certificate issuer maps to no known trust provider
    ///
    /// A hard error: verification cannot proceed, which is not the same as
    /// a failed signature.
    #[error("Unsupported issuer: {0}")]
    UnsupportedIssuer(String),

    /// HTTP failure while refreshing a trust root
    ///
    /// Hard error with no stale-root fallback: an unreachable mirror must
    /// not silently degrade to an old root.
    #[error("Trust root fetch failed: {0}")]
    Http(String),

    /// The fetched or embedded trust-root material is invalid
    #[error("Invalid trust root: {0}")]
    TrustRoot(String),

    /// Cache directory or file I/O failure
    #[error("Trust root cache error: {0}")]
    Cache(String),
}

/// Result type for trust operations
pub type Result<T> = std::result::Result<T, Error>;
