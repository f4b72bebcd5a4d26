//! Verification half of the evidence engine
//!
//! Two verification paths feed one report: key-signed envelopes are checked
//! against candidate public keys (`envelope`), externally pre-signed
//! bundles are checked against the trust root selected by their certificate
//! issuer (`bundle`). The orchestrator retrieves the evidence records for a
//! resolved subject, runs the appropriate path per record, and aggregates
//! the outcomes.

pub mod bundle;
pub mod envelope;
pub mod error;
pub mod orchestrator;

pub use bundle::{extract_issuer_organization, verify_bundle, BundleOutcome};
pub use envelope::{verify_envelope, Candidate, EnvelopeOutcome};
pub use error::{Error, Result};
pub use orchestrator::{
    CatalogSigningKey, EvidenceCatalog, EvidenceRecordMeta, EvidenceStore, ResolvedSubject,
    SubjectDescriptor, SubjectResolver, TrustedKeyProvider, VerificationEngine,
};
