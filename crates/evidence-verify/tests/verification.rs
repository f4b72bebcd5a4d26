//! Bundle dispatch and orchestrator integration tests
//!
//! Certificates under `tests/data/` are self-signed fixtures whose issuer
//! organization selects the trust provider.

use std::cell::RefCell;
use std::collections::HashMap;

use evidence_crypto::{generate, KeySpec, SignerVerifier};
use evidence_trust::{TrustProvider, TrustRootResolver};
use evidence_types::{
    pae, Base64, EnvelopeSignature, EvidenceEnvelope, Statement, VerificationStatus,
    PAYLOAD_TYPE_IN_TOTO,
};
use evidence_verify::{
    extract_issuer_organization, verify_bundle, BundleOutcome, CatalogSigningKey, Error,
    EvidenceCatalog, EvidenceRecordMeta, EvidenceStore, ResolvedSubject, Result,
    VerificationEngine,
};
use sigstore_verify::trust_root::TrustedRoot;
use sigstore_verify::types::Bundle;

const CERT_GITHUB: &str = include_str!("data/cert_github.pem");
const CERT_SIGSTORE: &str = include_str!("data/cert_sigstore.pem");
const CERT_OTHER: &str = include_str!("data/cert_other.pem");
const CERT_NO_ORG: &str = include_str!("data/cert_no_org.pem");

const PREDICATE_TYPE: &str = "https://slsa.dev/provenance/v1";

fn digest_a() -> String {
    "ab".repeat(32)
}

fn digest_b() -> String {
    "cd".repeat(32)
}

fn statement_payload(sha256: &str) -> Vec<u8> {
    let statement = Statement::new(
        "local-repo/a.txt",
        sha256,
        PREDICATE_TYPE,
        serde_json::json!({"k": "v"}),
    );
    serde_json::to_vec(&statement).unwrap()
}

fn bundle_json(cert_pem: &str, sha256: &str, with_timestamp: bool) -> String {
    let der = pem::parse(cert_pem).unwrap().contents().to_vec();
    let timestamps = if with_timestamp {
        serde_json::json!({"rfc3161Timestamps": [{"signedTimestamp": "AAAA"}]})
    } else {
        serde_json::json!({})
    };
    serde_json::json!({
        "mediaType": "application/vnd.dev.sigstore.bundle.v0.3+json",
        "verificationMaterial": {
            "certificate": {"rawBytes": Base64::encode(&der).as_str()},
            "tlogEntries": [],
            "timestampVerificationData": timestamps,
        },
        "dsseEnvelope": {
            "payloadType": PAYLOAD_TYPE_IN_TOTO,
            "payload": Base64::encode(&statement_payload(sha256)).as_str(),
            "signatures": [{"keyid": "", "sig": "AAAA"}],
        },
    })
    .to_string()
}

/// Trust-root loader double that records which provider was selected
struct RecordingResolver {
    seen: RefCell<Vec<TrustProvider>>,
}

impl RecordingResolver {
    fn new() -> Self {
        Self {
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl TrustRootResolver for RecordingResolver {
    fn resolve(&self, provider: TrustProvider) -> evidence_trust::Result<TrustedRoot> {
        self.seen.borrow_mut().push(provider);
        Err(evidence_trust::Error::TrustRoot(
            "trust root not available in tests".to_string(),
        ))
    }
}

#[test]
fn issuer_organization_extraction() {
    let bundle = Bundle::from_json(&bundle_json(CERT_GITHUB, &digest_a(), true)).unwrap();
    assert_eq!(extract_issuer_organization(&bundle).unwrap(), "GitHub, Inc.");

    let bundle = Bundle::from_json(&bundle_json(CERT_SIGSTORE, &digest_a(), true)).unwrap();
    assert_eq!(extract_issuer_organization(&bundle).unwrap(), "sigstore.dev");
}

#[test]
fn github_issuer_selects_github_trust_root() {
    let bundle = Bundle::from_json(&bundle_json(CERT_GITHUB, &digest_a(), true)).unwrap();
    let resolver = RecordingResolver::new();

    // The test resolver fails, so trust-root loading surfaces as a hard
    // error; what matters here is which loader ran.
    let err = verify_bundle(Some(&bundle), &digest_a(), &resolver).unwrap_err();
    assert!(matches!(err, Error::Trust(_)));
    assert_eq!(
        resolver.seen.into_inner(),
        vec![TrustProvider::GitHubActions]
    );
}

#[test]
fn unsupported_issuer_never_loads_trust_material() {
    let bundle = Bundle::from_json(&bundle_json(CERT_OTHER, &digest_a(), true)).unwrap();
    let resolver = RecordingResolver::new();

    let err = verify_bundle(Some(&bundle), &digest_a(), &resolver).unwrap_err();
    assert!(matches!(
        err,
        Error::Trust(evidence_trust::Error::UnsupportedIssuer(_))
    ));
    assert!(err.to_string().contains("Example Corp"));
    assert!(resolver.seen.into_inner().is_empty());
}

#[test]
fn missing_issuer_organization_is_hard_error() {
    let bundle = Bundle::from_json(&bundle_json(CERT_NO_ORG, &digest_a(), true)).unwrap();
    let resolver = RecordingResolver::new();

    let err = verify_bundle(Some(&bundle), &digest_a(), &resolver).unwrap_err();
    assert!(matches!(err, Error::MissingIssuer));
    assert!(resolver.seen.into_inner().is_empty());
}

#[test]
fn github_bundle_without_timestamp_fails_before_root_load() {
    let bundle = Bundle::from_json(&bundle_json(CERT_GITHUB, &digest_a(), false)).unwrap();
    let resolver = RecordingResolver::new();

    let outcome = verify_bundle(Some(&bundle), &digest_a(), &resolver).unwrap();
    match outcome {
        BundleOutcome::Failed { provider, reason } => {
            assert_eq!(provider, TrustProvider::GitHubActions);
            assert!(reason.contains("signed timestamp"));
        }
        other => panic!("expected Failed outcome, got {:?}", other),
    }
    assert!(resolver.seen.into_inner().is_empty());
}

#[test]
fn public_good_bundle_needs_some_transparency_material() {
    let bundle = Bundle::from_json(&bundle_json(CERT_SIGSTORE, &digest_a(), false)).unwrap();
    let resolver = RecordingResolver::new();

    let outcome = verify_bundle(Some(&bundle), &digest_a(), &resolver).unwrap();
    match outcome {
        BundleOutcome::Failed { provider, reason } => {
            assert_eq!(provider, TrustProvider::PublicGood);
            assert!(reason.contains("inclusion"));
        }
        other => panic!("expected Failed outcome, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Orchestrator doubles
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct StaticCatalog {
    records: Vec<EvidenceRecordMeta>,
}

impl EvidenceCatalog for StaticCatalog {
    fn search(
        &self,
        _repo: &str,
        _path: &str,
        _name: &str,
        _want_public_key: bool,
    ) -> Result<Vec<EvidenceRecordMeta>> {
        Ok(self.records.clone())
    }
}

struct MapStore {
    files: HashMap<String, Vec<u8>>,
}

impl EvidenceStore for MapStore {
    fn download(&self, download_path: &str) -> Result<Vec<u8>> {
        self.files
            .get(download_path)
            .cloned()
            .ok_or_else(|| Error::Download(download_path.to_string()))
    }
}

fn meta(download_path: &str) -> EvidenceRecordMeta {
    EvidenceRecordMeta {
        download_path: download_path.to_string(),
        predicate_type: PREDICATE_TYPE.to_string(),
        created_at: "2025-06-01T00:00:00Z".to_string(),
        created_by: "ci-pipeline".to_string(),
        subject_sha256: None,
        signing_key: None,
    }
}

fn subject() -> ResolvedSubject {
    ResolvedSubject {
        repo: "local-repo".to_string(),
        path: "a.txt".to_string(),
        sha256: digest_a(),
    }
}

fn signed_envelope_json(signer: &SignerVerifier, sha256: &str) -> Vec<u8> {
    let payload = statement_payload(sha256);
    let signature = signer.sign(&pae(PAYLOAD_TYPE_IN_TOTO, &payload)).unwrap();
    EvidenceEnvelope::new(
        PAYLOAD_TYPE_IN_TOTO,
        Base64::encode(&payload),
        vec![EnvelopeSignature {
            keyid: signer.key_id().to_string(),
            sig: Base64::encode(&signature),
        }],
    )
    .unwrap()
    .to_json()
    .unwrap()
}

#[test]
fn end_to_end_key_path_success_and_mismatch() {
    let signer = SignerVerifier::new(generate(KeySpec::EcdsaP256).unwrap());
    let catalog = StaticCatalog {
        records: vec![meta("evd/1")],
    };
    let store = MapStore {
        files: HashMap::from([("evd/1".to_string(), signed_envelope_json(&signer, &digest_a()))]),
    };
    let resolver = RecordingResolver::new();
    let engine = VerificationEngine::new(&catalog, &store, &resolver);

    // Matching public key: Success.
    let report = engine
        .verify_subject(&subject(), &[signer.public_key()])
        .unwrap();
    assert_eq!(report.overall_status, VerificationStatus::Success);
    assert!(report.results[0].key_source.contains("provided key"));

    // Unrelated public key: a Failed record with a mismatch reason, not an
    // error.
    let unrelated = generate(KeySpec::EcdsaP256).unwrap().into_record();
    let report = engine
        .verify_subject(&subject(), &[unrelated.public_only()])
        .unwrap();
    assert_eq!(report.overall_status, VerificationStatus::Failed);
    let failure = report.results[0].failure_reason.as_ref().unwrap();
    assert!(failure.contains("signature mismatch"));
}

#[test]
fn zero_records_is_no_evidence_found() {
    let catalog = StaticCatalog { records: vec![] };
    let store = MapStore {
        files: HashMap::new(),
    };
    let resolver = RecordingResolver::new();
    let engine = VerificationEngine::new(&catalog, &store, &resolver);

    let err = engine.verify_subject(&subject(), &[]).unwrap_err();
    assert!(matches!(err, Error::NoEvidenceFound(_)));
    assert!(err.to_string().contains("local-repo/a.txt"));
}

#[test]
fn one_failed_record_fails_the_report_but_not_the_run() {
    let known = SignerVerifier::new(generate(KeySpec::Ed25519).unwrap());
    let unknown = SignerVerifier::new(generate(KeySpec::Ed25519).unwrap());

    let catalog = StaticCatalog {
        records: vec![meta("evd/good"), meta("evd/bad")],
    };
    let store = MapStore {
        files: HashMap::from([
            (
                "evd/good".to_string(),
                signed_envelope_json(&known, &digest_a()),
            ),
            (
                "evd/bad".to_string(),
                signed_envelope_json(&unknown, &digest_a()),
            ),
        ]),
    };
    let resolver = RecordingResolver::new();
    let engine = VerificationEngine::new(&catalog, &store, &resolver);

    let report = engine
        .verify_subject(&subject(), &[known.public_key()])
        .unwrap();
    assert_eq!(report.overall_status, VerificationStatus::Failed);
    assert_eq!(report.results.len(), 2);
    assert_eq!(report.results[0].status, VerificationStatus::Success);
    assert_eq!(report.results[1].status, VerificationStatus::Failed);
}

#[test]
fn record_embedded_key_verifies_without_caller_keys() {
    let signer = SignerVerifier::new(generate(KeySpec::Ed25519).unwrap());
    let mut record = meta("evd/embedded");
    record.signing_key = Some(CatalogSigningKey {
        alias: "release-key".to_string(),
        public_key: signer.public_key().public().to_string(),
    });

    let catalog = StaticCatalog {
        records: vec![record],
    };
    let store = MapStore {
        files: HashMap::from([(
            "evd/embedded".to_string(),
            signed_envelope_json(&signer, &digest_a()),
        )]),
    };
    let resolver = RecordingResolver::new();
    let engine = VerificationEngine::new(&catalog, &store, &resolver);

    let report = engine.verify_subject(&subject(), &[]).unwrap();
    assert_eq!(report.overall_status, VerificationStatus::Success);
    assert!(report.results[0].key_source.contains("release-key"));
}

#[test]
fn statement_digest_must_match_resolved_subject() {
    let signer = SignerVerifier::new(generate(KeySpec::EcdsaP256).unwrap());
    let catalog = StaticCatalog {
        records: vec![meta("evd/1")],
    };
    // The statement binds digest B while the resolved subject is digest A.
    let store = MapStore {
        files: HashMap::from([("evd/1".to_string(), signed_envelope_json(&signer, &digest_b()))]),
    };
    let resolver = RecordingResolver::new();
    let engine = VerificationEngine::new(&catalog, &store, &resolver);

    let report = engine
        .verify_subject(&subject(), &[signer.public_key()])
        .unwrap();
    assert_eq!(report.overall_status, VerificationStatus::Failed);
    let reason = report.results[0].failure_reason.as_ref().unwrap();
    assert!(reason.contains("does not match resolved subject"));
}

#[test]
fn catalog_metadata_digest_mismatch_fails_the_record() {
    let signer = SignerVerifier::new(generate(KeySpec::EcdsaP256).unwrap());
    let mut record = meta("evd/1");
    record.subject_sha256 = Some(digest_b());

    let catalog = StaticCatalog {
        records: vec![record],
    };
    let store = MapStore {
        files: HashMap::from([("evd/1".to_string(), signed_envelope_json(&signer, &digest_a()))]),
    };
    let resolver = RecordingResolver::new();
    let engine = VerificationEngine::new(&catalog, &store, &resolver);

    let report = engine
        .verify_subject(&subject(), &[signer.public_key()])
        .unwrap();
    assert_eq!(report.overall_status, VerificationStatus::Failed);
    assert!(report.results[0]
        .failure_reason
        .as_ref()
        .unwrap()
        .contains("catalog subject digest"));
}

#[test]
fn bundle_records_are_classified_and_subject_checked() {
    // A github-issued bundle whose statement binds a different digest must
    // fail the subject-binding check before any trust-root load.
    let catalog = StaticCatalog {
        records: vec![meta("evd/bundle")],
    };
    let store = MapStore {
        files: HashMap::from([(
            "evd/bundle".to_string(),
            bundle_json(CERT_GITHUB, &digest_b(), true).into_bytes(),
        )]),
    };
    let resolver = RecordingResolver::new();
    let engine = VerificationEngine::new(&catalog, &store, &resolver);

    let report = engine.verify_subject(&subject(), &[]).unwrap();
    assert_eq!(report.overall_status, VerificationStatus::Failed);
    assert!(report.results[0]
        .failure_reason
        .as_ref()
        .unwrap()
        .contains("does not match resolved subject"));
    assert!(resolver.seen.into_inner().is_empty());
}
