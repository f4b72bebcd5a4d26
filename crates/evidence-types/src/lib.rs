//! Core wire and report types for evidence signing and verification
//!
//! This crate defines the data model shared by the signing and verification
//! halves of the engine: the DSSE-style signature envelope, the in-toto
//! statement carried as its payload, typed encoding wrappers, and the
//! per-record/aggregate verification report handed to report renderers.

pub mod encoding;
pub mod envelope;
pub mod error;
pub mod report;
pub mod statement;

pub use encoding::Base64;
pub use envelope::{pae, EnvelopeSignature, EvidenceEnvelope, PAYLOAD_TYPE_IN_TOTO};
pub use error::{Error, Result};
pub use report::{
    BundleVerification, EvidenceVerificationResult, ExitStatus, VerificationReport,
    VerificationStatus,
};
pub use statement::{Digest, Statement, Subject, STATEMENT_TYPE_IN_TOTO_V1};
