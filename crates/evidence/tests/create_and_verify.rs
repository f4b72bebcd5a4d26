//! End-to-end create → verify round trips through the public API

use std::collections::HashMap;

use evidence::{
    create_evidence, exit_status, load_signing_key, verify_evidence, Error, PassphraseSource,
    SubjectRef,
};
use evidence_crypto::{encrypted_private_pem, generate, KeySpec, SignerVerifier};
use evidence_trust::{TrustProvider, TrustRootResolver};
use evidence_types::{ExitStatus, VerificationStatus};
use evidence_verify::{
    EvidenceCatalog, EvidenceRecordMeta, EvidenceStore, ResolvedSubject,
};
use sigstore_verify::trust_root::TrustedRoot;

const PREDICATE_TYPE: &str = "https://slsa.dev/provenance/v1";

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
    ) -> evidence_verify::Result<Vec<EvidenceRecordMeta>> {
        Ok(self.records.clone())
    }
}

struct MapStore {
    files: HashMap<String, Vec<u8>>,
}

impl EvidenceStore for MapStore {
    fn download(&self, download_path: &str) -> evidence_verify::Result<Vec<u8>> {
        self.files
            .get(download_path)
            .cloned()
            .ok_or_else(|| evidence_verify::Error::Download(download_path.to_string()))
    }
}

struct OfflineResolver;

impl TrustRootResolver for OfflineResolver {
    fn resolve(&self, _provider: TrustProvider) -> evidence_trust::Result<TrustedRoot> {
        Err(evidence_trust::Error::TrustRoot(
            "no trust roots in this test".to_string(),
        ))
    }
}

fn subject() -> ResolvedSubject {
    ResolvedSubject {
        repo: "local-repo".to_string(),
        path: "a.txt".to_string(),
        sha256: "ab".repeat(32),
    }
}

fn record_meta() -> EvidenceRecordMeta {
    EvidenceRecordMeta {
        download_path: "evd/1".to_string(),
        predicate_type: PREDICATE_TYPE.to_string(),
        created_at: "2025-06-01T00:00:00Z".to_string(),
        created_by: "ci-pipeline".to_string(),
        subject_sha256: None,
        signing_key: None,
    }
}

#[test]
fn created_evidence_verifies_with_matching_key() {
    let signer = SignerVerifier::new(generate(KeySpec::EcdsaP256).unwrap());
    let envelope = create_evidence(
        &SubjectRef {
            path: "local-repo/a.txt".to_string(),
            sha256: "ab".repeat(32),
        },
        PREDICATE_TYPE,
        br#"{"k":"v"}"#,
        std::slice::from_ref(&signer),
    )
    .unwrap();

    let catalog = StaticCatalog {
        records: vec![record_meta()],
    };
    let store = MapStore {
        files: HashMap::from([("evd/1".to_string(), envelope.to_json().unwrap())]),
    };

    let outcome = verify_evidence(
        &subject(),
        &[signer.public_key()],
        &catalog,
        &store,
        &OfflineResolver,
        None,
    );
    let report = outcome.as_ref().unwrap();
    assert_eq!(report.overall_status, VerificationStatus::Success);
    assert_eq!(exit_status(&outcome), ExitStatus::Success);
    assert_eq!(exit_status(&outcome).code(), 0);
}

#[test]
fn created_evidence_fails_against_unrelated_key() {
    let signer = SignerVerifier::new(generate(KeySpec::EcdsaP256).unwrap());
    let envelope = create_evidence(
        &SubjectRef {
            path: "local-repo/a.txt".to_string(),
            sha256: "ab".repeat(32),
        },
        PREDICATE_TYPE,
        br#"{"k":"v"}"#,
        &[signer],
    )
    .unwrap();

    let catalog = StaticCatalog {
        records: vec![record_meta()],
    };
    let store = MapStore {
        files: HashMap::from([("evd/1".to_string(), envelope.to_json().unwrap())]),
    };

    let unrelated = generate(KeySpec::EcdsaP256).unwrap().into_record();
    let outcome = verify_evidence(
        &subject(),
        &[unrelated.public_only()],
        &catalog,
        &store,
        &OfflineResolver,
        None,
    );

    // A completed run with an invalid record: distinct exit signal, no error.
    let report = outcome.as_ref().unwrap();
    assert_eq!(report.overall_status, VerificationStatus::Failed);
    assert!(report.results[0]
        .failure_reason
        .as_ref()
        .unwrap()
        .contains("signature mismatch"));
    assert_eq!(exit_status(&outcome), ExitStatus::VerificationFailed);
    assert_ne!(
        ExitStatus::VerificationFailed.code(),
        ExitStatus::ProcessingError.code()
    );
}

#[test]
fn encrypted_signing_key_loads_via_environment_passphrase() {
    let generated = generate(KeySpec::EcdsaP256).unwrap();
    let armor = encrypted_private_pem(&generated, "env-secret").unwrap();

    // Environment-variable path: resolved once at operation start.
    std::env::set_var(evidence::PASSPHRASE_ENV_VAR, "env-secret");
    let source = PassphraseSource::resolve(None);
    std::env::remove_var(evidence::PASSPHRASE_ENV_VAR);

    let loaded = load_signing_key(armor.as_bytes(), &source).unwrap();
    assert!(loaded.record().has_private());
    assert_eq!(loaded.record().public(), generated.record().public());

    // A wrong passphrase is an authentication error, not a structural one.
    let wrong = PassphraseSource::with_value("not-the-secret");
    let err = load_signing_key(armor.as_bytes(), &wrong).unwrap_err();
    assert!(matches!(
        err,
        Error::Crypto(evidence_crypto::Error::WrongPassphrase)
    ));

    // No passphrase available at all: a passphrase error naming the source.
    let none = PassphraseSource::none();
    let err = load_signing_key(armor.as_bytes(), &none).unwrap_err();
    assert!(matches!(err, Error::Passphrase(_)));
    assert!(err.to_string().contains(evidence::PASSPHRASE_ENV_VAR));

    // With the environment unset, the interactive prompt is consulted.
    let prompted = PassphraseSource::resolve(Some(Box::new(|| Ok("env-secret".to_string()))));
    let loaded = load_signing_key(armor.as_bytes(), &prompted).unwrap();
    assert_eq!(loaded.record().public(), generated.record().public());
}
