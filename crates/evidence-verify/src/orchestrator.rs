//! Verification orchestration
//!
//! For one resolved subject: query the evidence catalog, download each
//! record's content, classify it as key-signed or bundle-signed, run the
//! matching verification path, and aggregate the per-record outcomes into a
//! report. A record that fails verification never stops its siblings; only
//! structural errors (catalog unreachable, download failure, undecodable
//! caller keys, unsupported issuer) abort the operation.

use crate::bundle::{verify_bundle, BundleOutcome};
use crate::envelope::{verify_envelope, Candidate, EnvelopeOutcome};
use crate::error::{Error, Result};
use evidence_crypto::{decode_public_only, KeyRecord, SignerVerifier};
use evidence_trust::TrustRootResolver;
use evidence_types::{
    EvidenceEnvelope, EvidenceVerificationResult, Statement, VerificationReport,
};
use sigstore_verify::types::bundle::SignatureContent;
use sigstore_verify::types::Bundle;

/// A subject resolved to its repository path and content digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSubject {
    /// Repository holding the subject
    pub repo: String,
    /// Path of the subject within the repository
    pub path: String,
    /// SHA-256 digest of the subject content, hex-encoded
    pub sha256: String,
}

impl ResolvedSubject {
    /// Full repository path of the subject
    pub fn full_path(&self) -> String {
        format!("{}/{}", self.repo, self.path)
    }
}

/// The subject kinds evidence can be attached to, with their identifying
/// fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectDescriptor {
    /// A file in a repository
    Artifact {
        /// Repository path of the file
        path: String,
    },
    /// A build by name and run number
    Build {
        /// Build name
        name: String,
        /// Build number
        number: String,
    },
    /// A release bundle by name and version
    ReleaseBundle {
        /// Bundle name
        name: String,
        /// Bundle version
        version: String,
    },
    /// A package by name, version and repository
    Package {
        /// Package name
        name: String,
        /// Package version
        version: String,
        /// Repository holding the package
        repo: String,
    },
    /// An application by key and version
    Application {
        /// Application key
        key: String,
        /// Application version
        version: String,
    },
}

/// Subject resolution contract
///
/// Resolving a descriptor into a repository path and digest requires the
/// external repository and metadata services; one implementation exists per
/// subject kind. May fail with "not found" or an ambiguous match.
pub trait SubjectResolver {
    /// Resolve a subject descriptor to its repository path and digest
    fn resolve(&self, subject: &SubjectDescriptor) -> Result<ResolvedSubject>;
}

/// Signing key embedded in a catalog record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSigningKey {
    /// Alias of the key in the trusted-key store
    pub alias: String,
    /// Public key material (PEM, or hex for Ed25519)
    pub public_key: String,
}

/// Metadata for one evidence record, as returned by the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceRecordMeta {
    /// Path from which the record's content can be downloaded
    pub download_path: String,
    /// Predicate type of the evidence
    pub predicate_type: String,
    /// Creation timestamp, catalog-formatted
    pub created_at: String,
    /// Principal that created the evidence
    pub created_by: String,
    /// Subject digest the catalog holds for the record, if exposed
    pub subject_sha256: Option<String>,
    /// Signing key embedded in the record, if the catalog exposes it
    pub signing_key: Option<CatalogSigningKey>,
}

/// Evidence catalog query interface
///
/// `want_public_key` selects the query shape that asks for the embedded
/// signing key; catalog versions that cannot serve it return records with
/// `signing_key: None`.
pub trait EvidenceCatalog {
    /// Search evidence records attached to a subject
    fn search(
        &self,
        repo: &str,
        path: &str,
        name: &str,
        want_public_key: bool,
    ) -> Result<Vec<EvidenceRecordMeta>>;
}

/// Evidence content download interface
pub trait EvidenceStore {
    /// Download the raw envelope or bundle bytes for a record
    fn download(&self, download_path: &str) -> Result<Vec<u8>>;
}

/// Trusted-key store lookup interface
pub trait TrustedKeyProvider {
    /// All trusted public keys as (alias, key material) pairs
    fn trusted_keys(&self) -> Result<Vec<(String, String)>>;
}

/// The verification orchestrator for one subject
pub struct VerificationEngine<'a> {
    catalog: &'a dyn EvidenceCatalog,
    store: &'a dyn EvidenceStore,
    resolver: &'a dyn TrustRootResolver,
    trusted_keys: Option<&'a dyn TrustedKeyProvider>,
}

impl<'a> VerificationEngine<'a> {
    /// Engine over the external collaborators
    pub fn new(
        catalog: &'a dyn EvidenceCatalog,
        store: &'a dyn EvidenceStore,
        resolver: &'a dyn TrustRootResolver,
    ) -> Self {
        Self {
            catalog,
            store,
            resolver,
            trusted_keys: None,
        }
    }

    /// Also draw candidate keys from the trusted-key store
    pub fn with_trusted_keys(mut self, provider: &'a dyn TrustedKeyProvider) -> Self {
        self.trusted_keys = Some(provider);
        self
    }

    /// Verify every evidence record attached to the subject
    ///
    /// `keys` are caller-supplied candidate public keys; a key that cannot
    /// be used is a configuration error and aborts. Zero catalog records is
    /// the distinct "no evidence found" error, never an empty report.
    pub fn verify_subject(
        &self,
        subject: &ResolvedSubject,
        keys: &[KeyRecord],
    ) -> Result<VerificationReport> {
        let records = self
            .catalog
            .search(&subject.repo, &subject.path, "", true)?;
        if records.is_empty() {
            return Err(Error::NoEvidenceFound(subject.full_path()));
        }
        tracing::debug!(
            subject = %subject.full_path(),
            records = records.len(),
            "evaluating evidence records"
        );

        let base_candidates = self.base_candidates(keys)?;

        let mut results = Vec::with_capacity(records.len());
        for record in &records {
            results.push(self.verify_record(subject, record, &base_candidates)?);
        }

        Ok(VerificationReport::new(
            subject.full_path(),
            subject.sha256.clone(),
            results,
        )?)
    }

    /// Caller-supplied and store-resolved candidates, shared by all records
    fn base_candidates(&self, keys: &[KeyRecord]) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::new();
        for record in keys {
            let verifier = SignerVerifier::from_public_record(record)?;
            candidates.push(Candidate::new(
                verifier,
                format!("provided key {}", record.key_id()),
            ));
        }
        if let Some(provider) = self.trusted_keys {
            for (alias, material) in provider.trusted_keys()? {
                let record = decode_public_only(material.as_bytes())?;
                let verifier = SignerVerifier::from_public_record(&record)?;
                candidates.push(Candidate::new(
                    verifier,
                    format!("trusted keys store key \"{}\"", alias),
                ));
            }
        }
        Ok(candidates)
    }

    fn verify_record(
        &self,
        subject: &ResolvedSubject,
        record: &EvidenceRecordMeta,
        base_candidates: &[Candidate],
    ) -> Result<EvidenceVerificationResult> {
        // The catalog's own subject digest, when exposed, must agree with
        // the resolved subject before anything is downloaded.
        if let Some(meta_digest) = &record.subject_sha256 {
            if meta_digest != &subject.sha256 {
                return Ok(EvidenceVerificationResult::failed(
                    "catalog metadata",
                    format!(
                        "catalog subject digest {} does not match resolved subject digest {}",
                        meta_digest, subject.sha256
                    ),
                    &record.predicate_type,
                    &record.download_path,
                ));
            }
        }

        let bytes = self.store.download(&record.download_path)?;

        let Ok(value) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
            return Ok(EvidenceVerificationResult::failed(
                "content classification",
                "evidence content is not valid JSON",
                &record.predicate_type,
                &record.download_path,
            ));
        };

        if is_bundle_shaped(&value) {
            self.verify_bundle_record(subject, record, &bytes)
        } else {
            self.verify_envelope_record(subject, record, &bytes, base_candidates)
        }
    }

    fn verify_bundle_record(
        &self,
        subject: &ResolvedSubject,
        record: &EvidenceRecordMeta,
        bytes: &[u8],
    ) -> Result<EvidenceVerificationResult> {
        let text = match std::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => {
                return Ok(EvidenceVerificationResult::failed(
                    "bundle",
                    "bundle content is not UTF-8",
                    &record.predicate_type,
                    &record.download_path,
                ))
            }
        };
        let bundle = match Bundle::from_json(text) {
            Ok(bundle) => bundle,
            Err(e) => {
                return Ok(EvidenceVerificationResult::failed(
                    "bundle",
                    format!("unparsable bundle: {}", e),
                    &record.predicate_type,
                    &record.download_path,
                ))
            }
        };

        // Subject binding: the statement inside the bundle's envelope must
        // name the resolved digest. The library's artifact-hash check is
        // disabled in the policy, so this is where the binding is enforced.
        if let Some(reason) = bundle_subject_mismatch(&bundle, &subject.sha256) {
            return Ok(EvidenceVerificationResult::failed(
                "bundle",
                reason,
                &record.predicate_type,
                &record.download_path,
            ));
        }

        match verify_bundle(Some(&bundle), &subject.sha256, self.resolver)? {
            BundleOutcome::Verified { provider, detail } => {
                Ok(EvidenceVerificationResult::success(
                    format!("{} trust root", provider),
                    &record.predicate_type,
                    &record.download_path,
                )
                .with_bundle(detail))
            }
            BundleOutcome::Failed { provider, reason } => {
                Ok(EvidenceVerificationResult::failed(
                    format!("{} trust root", provider),
                    reason,
                    &record.predicate_type,
                    &record.download_path,
                ))
            }
        }
    }

    fn verify_envelope_record(
        &self,
        subject: &ResolvedSubject,
        record: &EvidenceRecordMeta,
        bytes: &[u8],
        base_candidates: &[Candidate],
    ) -> Result<EvidenceVerificationResult> {
        let envelope = match EvidenceEnvelope::from_json(bytes) {
            Ok(envelope) => envelope,
            Err(e) => {
                return Ok(EvidenceVerificationResult::failed(
                    "key-signed evidence",
                    format!("unparsable envelope: {}", e),
                    &record.predicate_type,
                    &record.download_path,
                ))
            }
        };

        if let Some(reason) = envelope_subject_mismatch(&envelope, &subject.sha256) {
            return Ok(EvidenceVerificationResult::failed(
                "key-signed evidence",
                reason,
                &record.predicate_type,
                &record.download_path,
            ));
        }

        // A record-embedded key that fails to decode marks only this record
        // Failed; caller keys were validated up front.
        let mut embedded = None;
        if let Some(signing_key) = &record.signing_key {
            match embedded_candidate(signing_key) {
                Ok(candidate) => embedded = Some(candidate),
                Err(e) => {
                    return Ok(EvidenceVerificationResult::failed(
                        format!("evidence embedded key \"{}\"", signing_key.alias),
                        format!("embedded signing key is unusable: {}", e),
                        &record.predicate_type,
                        &record.download_path,
                    ))
                }
            }
        }

        // Record-embedded key first, then the shared candidates.
        let candidates: Vec<&Candidate> = embedded
            .iter()
            .chain(base_candidates.iter())
            .collect();

        match verify_envelope(&envelope, &candidates)? {
            EnvelopeOutcome::Matched { key_source, .. } => {
                Ok(EvidenceVerificationResult::success(
                    key_source,
                    &record.predicate_type,
                    &record.download_path,
                ))
            }
            EnvelopeOutcome::NoMatch { attempted } => Ok(EvidenceVerificationResult::failed(
                "key-signed evidence",
                format!(
                    "signature mismatch: none of the {} candidate public keys verified the \
                     envelope signature",
                    attempted
                ),
                &record.predicate_type,
                &record.download_path,
            )),
        }
    }
}

fn embedded_candidate(signing_key: &CatalogSigningKey) -> evidence_crypto::Result<Candidate> {
    let record = decode_public_only(signing_key.public_key.as_bytes())?;
    let verifier = SignerVerifier::from_public_record(&record)?;
    Ok(Candidate::new(
        verifier,
        format!("evidence embedded key \"{}\"", signing_key.alias),
    ))
}

/// Classify downloaded content: bundles carry a sigstore media type or
/// verification material, envelopes do not
fn is_bundle_shaped(value: &serde_json::Value) -> bool {
    if value.get("verificationMaterial").is_some() {
        return true;
    }
    value
        .get("mediaType")
        .and_then(|m| m.as_str())
        .is_some_and(|m| m.contains("sigstore.bundle"))
}

fn envelope_subject_mismatch(envelope: &EvidenceEnvelope, sha256: &str) -> Option<String> {
    let payload = match envelope.decode_payload() {
        Ok(payload) => payload,
        Err(e) => return Some(format!("undecodable envelope payload: {}", e)),
    };
    statement_subject_mismatch(&payload, sha256)
}

fn bundle_subject_mismatch(bundle: &Bundle, sha256: &str) -> Option<String> {
    let SignatureContent::DsseEnvelope(envelope) = &bundle.content else {
        return Some("bundle carries no DSSE envelope".to_string());
    };
    let payload = envelope.decode_payload();
    statement_subject_mismatch(&payload, sha256)
}

fn statement_subject_mismatch(payload: &[u8], sha256: &str) -> Option<String> {
    let statement = match Statement::from_payload(payload) {
        Ok(statement) => statement,
        Err(e) => return Some(e.to_string()),
    };
    if statement.matches_sha256(sha256) {
        None
    } else {
        Some(format!(
            "statement subject digest does not match resolved subject digest {}",
            sha256
        ))
    }
}
