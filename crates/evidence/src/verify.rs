//! High-level verification entry point
//!
//! Wires the external collaborators into the orchestrator and maps the
//! outcome to the process-level exit signal: a run that cannot complete is
//! a processing error, a completed run with failed records is the distinct
//! "verification failed" signal.

use crate::error::Result;
use evidence_crypto::{decode_public_only, KeyRecord};
use evidence_trust::TrustRootResolver;
use evidence_types::{ExitStatus, VerificationReport};
use evidence_verify::{
    EvidenceCatalog, EvidenceStore, ResolvedSubject, TrustedKeyProvider, VerificationEngine,
};

/// Decode caller-supplied public key material into candidate records
///
/// Any undecodable input aborts: candidate keys are caller configuration.
pub fn decode_candidate_keys(raw_keys: &[Vec<u8>]) -> Result<Vec<KeyRecord>> {
    let mut records = Vec::with_capacity(raw_keys.len());
    for raw in raw_keys {
        records.push(decode_public_only(raw).map_err(crate::error::Error::Crypto)?);
    }
    Ok(records)
}

/// Verify all evidence for a resolved subject
pub fn verify_evidence(
    subject: &ResolvedSubject,
    keys: &[KeyRecord],
    catalog: &dyn EvidenceCatalog,
    store: &dyn EvidenceStore,
    resolver: &dyn TrustRootResolver,
    trusted_keys: Option<&dyn TrustedKeyProvider>,
) -> Result<VerificationReport> {
    let mut engine = VerificationEngine::new(catalog, store, resolver);
    if let Some(provider) = trusted_keys {
        engine = engine.with_trusted_keys(provider);
    }
    Ok(engine.verify_subject(subject, keys)?)
}

/// Exit signal for a verification outcome
///
/// CI pipelines branch on this: "could not verify" and "verified and found
/// invalid" carry different codes.
pub fn exit_status(outcome: &Result<VerificationReport>) -> ExitStatus {
    match outcome {
        Ok(report) => report.exit_status(),
        Err(_) => ExitStatus::ProcessingError,
    }
}

/// Output formats the report renderer supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable plain text
    Plaintext,
    /// Markdown table output
    Markdown,
    /// Machine-readable JSON
    Json,
}

/// Report rendering contract
///
/// A pure formatting concern implemented outside the engine; it carries no
/// verification logic.
pub trait ReportRenderer {
    /// Render a report in the requested format
    fn render(&self, report: &VerificationReport, format: ReportFormat) -> Result<String>;
}
