//! Signed evidence creation and verification
//!
//! This is the main entry point for the evidence engine. It binds a
//! predicate (arbitrary JSON, e.g. provenance or scan results) to a
//! subject identified by content digest inside a signed envelope, and
//! verifies received evidence against caller-supplied keys or a
//! transparency-log trust root selected by certificate issuer.
//!
//! # Example
//!
//! ```no_run
//! use evidence::{create_evidence, load_signing_key, PassphraseSource, SubjectRef};
//! use evidence_crypto::SignerVerifier;
//!
//! # fn main() -> evidence::Result<()> {
//! let raw = std::fs::read("signing-key.pem").expect("key file");
//! let key = load_signing_key(&raw, &PassphraseSource::resolve(None))?;
//! let envelope = create_evidence(
//!     &SubjectRef {
//!         path: "releases/app-1.2.3.tar.gz".to_string(),
//!         sha256: "...".to_string(),
//!     },
//!     "https://slsa.dev/provenance/v1",
//!     br#"{"builder": {"id": "ci"}}"#,
//!     &[SignerVerifier::new(key)],
//! )?;
//! # let _ = envelope;
//! # Ok(())
//! # }
//! ```

pub mod create;
pub mod error;
pub mod keygen;
pub mod verify;

// Re-export the engine crates
pub use evidence_crypto as crypto;
pub use evidence_trust as trust;
pub use evidence_types as types;
pub use evidence_verify as verification;

pub use create::{
    create_evidence, load_signing_key, PassphrasePrompt, PassphraseSource, SubjectRef,
    PASSPHRASE_ENV_VAR,
};
pub use error::{Error, Result};
pub use keygen::{generate_key_pair, upload_public_key, GeneratedKeyPair, KeyStore, KeyStoreEntry};
pub use verify::{
    decode_candidate_keys, exit_status, verify_evidence, ReportFormat, ReportRenderer,
};
