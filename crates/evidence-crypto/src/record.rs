//! Normalized key records
//!
//! Every loaded key, whatever its source encoding, is normalized into a
//! [`KeyRecord`]: algorithm family, scheme tag, derived key ID, and the
//! public (and optionally private) material as PEM or hex strings. Records
//! are immutable after construction.

use crate::error::Result;
use crate::keyid;

/// Hash algorithms eligible for key-ID derivation, in order
pub const KEY_ID_HASH_ALGORITHMS: &[&str] = &["sha256", "sha512"];

/// Supported key algorithm families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    /// ECDSA over a NIST prime curve
    Ecdsa,
    /// RSA
    Rsa,
    /// Ed25519
    Ed25519,
}

impl KeyType {
    /// Canonical lowercase name, as used in key-ID derivation
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Ecdsa => "ecdsa",
            KeyType::Rsa => "rsa",
            KeyType::Ed25519 => "ed25519",
        }
    }
}

impl std::fmt::Display for KeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The normalized representation of a loaded key
///
/// `public` holds PEM for ECDSA/RSA and lowercase hex for Ed25519. `private`
/// is present only for private keys; when the source was password-encrypted
/// it holds the original ciphertext armor, not the decrypted material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    key_type: KeyType,
    scheme: String,
    key_id: String,
    key_id_hash_algorithms: Vec<String>,
    public: String,
    private: Option<String>,
}

impl KeyRecord {
    /// Construct a record, deriving the key ID from the public material
    ///
    /// A record with private material must already carry the derived public
    /// counterpart; construction is the only place the key ID is computed.
    pub(crate) fn new(
        key_type: KeyType,
        scheme: impl Into<String>,
        public: impl Into<String>,
        private: Option<String>,
    ) -> Result<Self> {
        let scheme = scheme.into();
        let public = public.into();
        let key_id = keyid::derive_key_id(key_type, &scheme, &public)?;
        Ok(Self {
            key_type,
            scheme,
            key_id,
            key_id_hash_algorithms: KEY_ID_HASH_ALGORITHMS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            public,
            private,
        })
    }

    /// Algorithm family of the key
    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Algorithm/hash scheme tag (e.g. "ecdsa-sha2-nistp256")
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Derived key identifier
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Hash algorithm names eligible for ID derivation
    pub fn key_id_hash_algorithms(&self) -> &[String] {
        &self.key_id_hash_algorithms
    }

    /// Public key material (PEM, or hex for Ed25519)
    pub fn public(&self) -> &str {
        &self.public
    }

    /// Private key material, if this record represents a private key
    pub fn private(&self) -> Option<&str> {
        self.private.as_deref()
    }

    /// Whether the record carries private material
    pub fn has_private(&self) -> bool {
        self.private.is_some()
    }

    /// A copy of this record restricted to public material
    pub fn public_only(&self) -> KeyRecord {
        KeyRecord {
            key_type: self.key_type,
            scheme: self.scheme.clone(),
            key_id: self.key_id.clone(),
            key_id_hash_algorithms: self.key_id_hash_algorithms.clone(),
            public: self.public.clone(),
            private: None,
        }
    }
}
