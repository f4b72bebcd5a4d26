//! Error types for evidence-verify
//!
//! Everything here is structural: it aborts the operation. Failed signature
//! or bundle-policy checks are not errors — they surface as `Failed`
//! entries in the verification report.

use thiserror::Error;

/// Errors that can occur while orchestrating verification
#[derive(Error, Debug)]
pub enum Error {
    /// A nil or structurally unusable bundle was supplied
    #[error("Invalid bundle: {0}")]
    NilBundle(String),

    /// The bundle carries no signing certificate
    #[error("Bundle carries no signing certificate")]
    MissingCertificate,

    /// The signing certificate's issuer has no organization attribute
    #[error("Signing certificate issuer has no organization")]
    MissingIssuer,

    /// The signing certificate could not be parsed
    #[error("Certificate parse error: {0}")]
    Certificate(String),

    /// The resolved subject digest is not a valid SHA-256 hex string
    #[error("Invalid subject digest: {0}")]
    InvalidDigest(String),

    /// The catalog returned no evidence records for the subject
    #[error("No evidence found for subject {0}")]
    NoEvidenceFound(String),

    /// The evidence catalog could not be queried
    #[error("Evidence catalog error: {0}")]
    Catalog(String),

    /// An evidence record's content could not be downloaded
    #[error("Evidence download error: {0}")]
    Download(String),

    /// Trust-root selection or loading failed
    #[error(transparent)]
    Trust(#[from] evidence_trust::Error),

    /// Candidate key material could not be used
    #[error(transparent)]
    Key(#[from] evidence_crypto::Error),

    /// Wire-type handling failed
    #[error(transparent)]
    Types(#[from] evidence_types::Error),
}

/// Result type for verification orchestration
pub type Result<T> = std::result::Result<T, Error>;
