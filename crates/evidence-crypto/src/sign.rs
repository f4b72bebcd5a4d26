//! Signing and verification over loaded keys
//!
//! A [`SignerVerifier`] is bound to exactly one [`KeyRecord`] and exposes
//! sign/verify/key-id/public-key. Handles are created per operation and
//! hold no secret material beyond what the record's parsed form already
//! owns.
//!
//! Hash selection is algorithm-appropriate: ECDSA hashes with the digest
//! matched to the curve size (P-256→SHA-256, P-384→SHA-384, P-521→SHA-512)
//! and emits ASN.1 DER signatures; RSA uses PSS with SHA-256; Ed25519 signs
//! the raw message with no pre-hash.

use crate::codec::{KeyMaterial, LoadedKey, SCHEME_ECDSA_P256, SCHEME_ECDSA_P384, SCHEME_ECDSA_P521};
use crate::error::{Error, Result};
use crate::keyid;
use crate::record::{KeyRecord, KeyType};

use pkcs8::DecodePublicKey;
use signature::{RandomizedSigner, SignatureEncoding, Signer, Verifier};

/// A signer/verifier handle bound to one key record
pub struct SignerVerifier {
    record: KeyRecord,
    material: KeyMaterial,
}

impl SignerVerifier {
    /// Build a handle from a decoded key
    pub fn new(loaded: LoadedKey) -> Self {
        let record = loaded.record().clone();
        Self {
            record,
            material: loaded.material,
        }
    }

    /// Build a verification-only handle from a record's public material
    ///
    /// Re-parses `record.public` (PEM, or hex for Ed25519); the resulting
    /// handle can verify but not sign.
    pub fn from_public_record(record: &KeyRecord) -> Result<Self> {
        let material = match record.key_type() {
            KeyType::Ecdsa => match record.scheme() {
                SCHEME_ECDSA_P256 => KeyMaterial::EcdsaP256 {
                    public: p256::PublicKey::from_public_key_pem(record.public())
                        .map_err(|e| Error::Pem(format!("invalid P-256 public key: {}", e)))?,
                    private: None,
                },
                SCHEME_ECDSA_P384 => KeyMaterial::EcdsaP384 {
                    public: p384::PublicKey::from_public_key_pem(record.public())
                        .map_err(|e| Error::Pem(format!("invalid P-384 public key: {}", e)))?,
                    private: None,
                },
                SCHEME_ECDSA_P521 => KeyMaterial::EcdsaP521 {
                    public: p521::PublicKey::from_public_key_pem(record.public())
                        .map_err(|e| Error::Pem(format!("invalid P-521 public key: {}", e)))?,
                    private: None,
                },
                other => return Err(Error::UnsupportedKeyType(format!("scheme {}", other))),
            },
            KeyType::Rsa => KeyMaterial::Rsa {
                public: rsa::RsaPublicKey::from_public_key_pem(record.public())
                    .map_err(|e| Error::Pem(format!("invalid RSA public key: {}", e)))?,
                private: None,
            },
            KeyType::Ed25519 => {
                let bytes = hex::decode(record.public())
                    .map_err(|e| Error::NotPublic(format!("invalid hex public key: {}", e)))?;
                let arr: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| Error::NotPublic("hex public key is not 32 bytes".to_string()))?;
                KeyMaterial::Ed25519 {
                    public: ed25519_dalek::VerifyingKey::from_bytes(&arr).map_err(|e| {
                        Error::NotPublic(format!("invalid Ed25519 public key: {}", e))
                    })?,
                    private: None,
                }
            }
        };
        Ok(Self {
            record: record.public_only(),
            material,
        })
    }

    /// Derived key identifier of the bound record
    pub fn key_id(&self) -> &str {
        self.record.key_id()
    }

    /// The bound record
    pub fn record(&self) -> &KeyRecord {
        &self.record
    }

    /// Public half of the bound record
    pub fn public_key(&self) -> KeyRecord {
        self.record.public_only()
    }

    /// Public-key fingerprint: base64(SHA-256(PKIX DER))
    pub fn fingerprint(&self) -> Result<String> {
        keyid::fingerprint(Some(&self.material.public_key_der()?))
    }

    /// Sign a message
    ///
    /// Fails with [`Error::NotPrivateKey`] when the handle was built from
    /// public-only material.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        match &self.material {
            KeyMaterial::EcdsaP256 { private, .. } => {
                let secret = private.as_ref().ok_or(Error::NotPrivateKey)?;
                let signing_key = p256::ecdsa::SigningKey::from(secret);
                let signature: p256::ecdsa::Signature = signing_key.sign(message);
                Ok(signature.to_der().as_bytes().to_vec())
            }
            KeyMaterial::EcdsaP384 { private, .. } => {
                let secret = private.as_ref().ok_or(Error::NotPrivateKey)?;
                let signing_key = p384::ecdsa::SigningKey::from(secret);
                let signature: p384::ecdsa::Signature = signing_key.sign(message);
                Ok(signature.to_der().as_bytes().to_vec())
            }
            KeyMaterial::EcdsaP521 { private, .. } => {
                let secret = private.as_ref().ok_or(Error::NotPrivateKey)?;
                let signing_key = p521::ecdsa::SigningKey::from_bytes(&secret.to_bytes())
                    .map_err(|e| Error::Unparseable(e.to_string()))?;
                let signature: p521::ecdsa::Signature = signing_key.sign(message);
                Ok(signature.to_der().as_bytes().to_vec())
            }
            KeyMaterial::Rsa { private, .. } => {
                let secret = private.as_ref().ok_or(Error::NotPrivateKey)?;
                let signing_key = rsa::pss::SigningKey::<sha2::Sha256>::new(secret.clone());
                let signature = signing_key.sign_with_rng(&mut rand_core::OsRng, message);
                Ok(signature.to_vec())
            }
            KeyMaterial::Ed25519 { private, .. } => {
                let signing = private.as_ref().ok_or(Error::NotPrivateKey)?;
                Ok(signing.sign(message).to_bytes().to_vec())
            }
        }
    }

    /// Verify a signature over a message
    ///
    /// Any cryptographic mismatch (including a malformed signature) reports
    /// [`Error::SignatureMismatch`] so orchestrators can record a Failed
    /// outcome instead of aborting.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        match &self.material {
            KeyMaterial::EcdsaP256 { public, .. } => {
                let verifying_key = p256::ecdsa::VerifyingKey::from(public);
                let signature = p256::ecdsa::Signature::from_der(signature)
                    .map_err(|_| Error::SignatureMismatch)?;
                verifying_key
                    .verify(message, &signature)
                    .map_err(|_| Error::SignatureMismatch)
            }
            KeyMaterial::EcdsaP384 { public, .. } => {
                let verifying_key = p384::ecdsa::VerifyingKey::from(public);
                let signature = p384::ecdsa::Signature::from_der(signature)
                    .map_err(|_| Error::SignatureMismatch)?;
                verifying_key
                    .verify(message, &signature)
                    .map_err(|_| Error::SignatureMismatch)
            }
            KeyMaterial::EcdsaP521 { public, .. } => {
                let verifying_key = p521::ecdsa::VerifyingKey::from_affine(*public.as_affine())
                    .map_err(|_| Error::SignatureMismatch)?;
                let signature = p521::ecdsa::Signature::from_der(signature)
                    .map_err(|_| Error::SignatureMismatch)?;
                verifying_key
                    .verify(message, &signature)
                    .map_err(|_| Error::SignatureMismatch)
            }
            KeyMaterial::Rsa { public, .. } => {
                let verifying_key = rsa::pss::VerifyingKey::<sha2::Sha256>::new(public.clone());
                let signature = rsa::pss::Signature::try_from(signature)
                    .map_err(|_| Error::SignatureMismatch)?;
                verifying_key
                    .verify(message, &signature)
                    .map_err(|_| Error::SignatureMismatch)
            }
            KeyMaterial::Ed25519 { public, .. } => {
                let signature = ed25519_dalek::Signature::from_slice(signature)
                    .map_err(|_| Error::SignatureMismatch)?;
                public
                    .verify(message, &signature)
                    .map_err(|_| Error::SignatureMismatch)
            }
        }
    }
}
