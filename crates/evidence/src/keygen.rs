//! Key-pair generation flow
//!
//! Generates a key pair, computes its fingerprint, and optionally uploads
//! the public half to the trusted-key store. The store itself is an
//! external collaborator; only its contract lives here.

use crate::error::{Error, Result};
use evidence_crypto::{encrypted_private_pem, generate, KeyRecord, KeySpec};

/// One entry in the trusted-key store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyStoreEntry {
    /// Key alias
    pub alias: String,
    /// Store-assigned identifier
    pub id: String,
}

/// Trusted-key store contract
pub trait KeyStore {
    /// Upload a public key under an alias
    ///
    /// Fails with [`Error::AliasExists`] when the alias is taken.
    fn upload(&self, alias: &str, public_key: &str) -> Result<()>;

    /// List stored keys
    fn list(&self) -> Result<Vec<KeyStoreEntry>>;

    /// Delete a stored key by its identifier
    fn delete(&self, id: &str) -> Result<()>;
}

/// Result of a key-generation operation
pub struct GeneratedKeyPair {
    /// Normalized record, private material included
    pub record: KeyRecord,
    /// Public-key fingerprint: base64(SHA-256(PKIX DER))
    pub fingerprint: String,
    /// Private-key armor for the caller to persist; encrypted when a
    /// passphrase was given
    pub private_armor: String,
}

/// Generate a key pair, optionally encrypting the exported private key
pub fn generate_key_pair(spec: KeySpec, passphrase: Option<&str>) -> Result<GeneratedKeyPair> {
    let loaded = generate(spec)?;
    let fingerprint = loaded.fingerprint()?;
    let private_armor = match passphrase {
        Some(secret) => encrypted_private_pem(&loaded, secret)?,
        None => loaded
            .record()
            .private()
            .map(str::to_string)
            .ok_or_else(|| Error::Config("generated key has no private material".to_string()))?,
    };
    let record = loaded.into_record();
    tracing::debug!(key_id = record.key_id(), fingerprint = %fingerprint, "key pair generated");
    Ok(GeneratedKeyPair {
        record,
        fingerprint,
        private_armor,
    })
}

/// Upload the public half of a generated pair to the trusted-key store
pub fn upload_public_key(
    store: &dyn KeyStore,
    alias: &str,
    generated: &GeneratedKeyPair,
) -> Result<()> {
    store.upload(alias, generated.record.public())
}
