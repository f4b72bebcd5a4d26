//! Evidence creation
//!
//! Builds the in-toto statement binding a predicate to a subject digest,
//! wraps it in a signature envelope and signs it with every configured
//! private key. Signing-key loading handles encrypted keys by resolving a
//! passphrase once per operation: environment variable first, then an
//! interactive prompt supplied by the caller.

use crate::error::{Error, Result};
use evidence_crypto::{decode, decode_with_passphrase, LoadedKey, SignerVerifier};
use evidence_types::{
    pae, Base64, EnvelopeSignature, EvidenceEnvelope, Statement, PAYLOAD_TYPE_IN_TOTO,
};
use zeroize::Zeroizing;

/// Environment variable consulted for the signing-key passphrase
pub const PASSPHRASE_ENV_VAR: &str = "EVIDENCE_PRIVATE_KEY_PASSPHRASE";

/// Prompt callback used when no environment passphrase is set
pub type PassphrasePrompt = Box<dyn Fn() -> std::io::Result<String>>;

/// Passphrase acquisition, resolved once at the start of an operation
///
/// The environment variable is read exactly once, here; nothing deeper in
/// the engine touches process environment.
pub struct PassphraseSource {
    resolved: Option<Zeroizing<String>>,
    prompt: Option<PassphrasePrompt>,
}

impl PassphraseSource {
    /// Resolve from the environment, falling back to `prompt` when unset
    pub fn resolve(prompt: Option<PassphrasePrompt>) -> Self {
        let resolved = std::env::var(PASSPHRASE_ENV_VAR).ok().map(Zeroizing::new);
        Self { resolved, prompt }
    }

    /// No passphrase available; encrypted keys will be rejected
    pub fn none() -> Self {
        Self {
            resolved: None,
            prompt: None,
        }
    }

    /// A fixed passphrase value (flag override, tests)
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            resolved: Some(Zeroizing::new(value.into())),
            prompt: None,
        }
    }

    fn obtain(&self) -> Result<Zeroizing<String>> {
        if let Some(value) = &self.resolved {
            return Ok(value.clone());
        }
        if let Some(prompt) = &self.prompt {
            return prompt()
                .map(Zeroizing::new)
                .map_err(|e| Error::Passphrase(format!("prompt failed: {}", e)));
        }
        Err(Error::Passphrase(format!(
            "signing key is encrypted and no passphrase is available; set {} or run interactively",
            PASSPHRASE_ENV_VAR
        )))
    }
}

/// Load a signing key, handling passphrase-encrypted material
///
/// Unencrypted keys load directly. When the decoder reports an encrypted
/// key, a passphrase is obtained from `passphrase` and the key is loaded
/// through the password-based decoder; a wrong passphrase surfaces as the
/// distinct authentication-class error and is never retried with a
/// different secret source.
pub fn load_signing_key(raw: &[u8], passphrase: &PassphraseSource) -> Result<LoadedKey> {
    match decode(raw) {
        Ok(loaded) => Ok(loaded),
        Err(evidence_crypto::Error::EncryptedKey(detail)) => {
            tracing::debug!(detail = %detail, "signing key is encrypted, obtaining passphrase");
            let secret = passphrase.obtain()?;
            Ok(decode_with_passphrase(raw, &secret)?)
        }
        Err(e) => Err(e.into()),
    }
}

/// The subject an evidence statement is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectRef {
    /// Repository path of the subject
    pub path: String,
    /// SHA-256 digest of the subject content, hex-encoded
    pub sha256: String,
}

/// Create a signed evidence envelope
///
/// One signature is produced per supplied signer; each is tagged with that
/// signer's key ID. The predicate must be valid JSON.
pub fn create_evidence(
    subject: &SubjectRef,
    predicate_type: &str,
    predicate: &[u8],
    signers: &[SignerVerifier],
) -> Result<EvidenceEnvelope> {
    if signers.is_empty() {
        return Err(Error::Config(
            "at least one signing key is required".to_string(),
        ));
    }
    let predicate_value: serde_json::Value = serde_json::from_slice(predicate)
        .map_err(|e| Error::Config(format!("predicate is not valid JSON: {}", e)))?;

    let statement = Statement::new(
        subject.path.clone(),
        subject.sha256.clone(),
        predicate_type,
        predicate_value,
    );
    let payload = serde_json::to_vec(&statement)
        .map_err(|e| Error::Config(format!("statement serialization failed: {}", e)))?;
    let pae_bytes = pae(PAYLOAD_TYPE_IN_TOTO, &payload);

    let mut signatures = Vec::with_capacity(signers.len());
    for signer in signers {
        let signature = signer.sign(&pae_bytes).map_err(Error::Crypto)?;
        signatures.push(EnvelopeSignature {
            keyid: signer.key_id().to_string(),
            sig: Base64::encode(&signature),
        });
    }

    Ok(EvidenceEnvelope::new(
        PAYLOAD_TYPE_IN_TOTO,
        Base64::encode(&payload),
        signatures,
    )?)
}
