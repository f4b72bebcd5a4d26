//! Key-pair generation
//!
//! Generates fresh key pairs for the supported algorithm families and, for
//! private-key export, produces plain or passphrase-encrypted PKCS#8 armor.

use crate::codec::{KeyMaterial, LoadedKey};
use crate::error::{Error, Result};

use pkcs8::{LineEnding, PrivateKeyInfo};
use rand_core::OsRng;

/// Key-generation parameter sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySpec {
    /// ECDSA over NIST P-256
    EcdsaP256,
    /// ECDSA over NIST P-384
    EcdsaP384,
    /// ECDSA over NIST P-521
    EcdsaP521,
    /// RSA with a 2048-bit modulus
    Rsa2048,
    /// RSA with a 3072-bit modulus
    Rsa3072,
    /// RSA with a 4096-bit modulus
    Rsa4096,
    /// Ed25519
    Ed25519,
}

/// Generate a new key pair
pub fn generate(spec: KeySpec) -> Result<LoadedKey> {
    let material = match spec {
        KeySpec::EcdsaP256 => {
            let secret = p256::SecretKey::random(&mut OsRng);
            KeyMaterial::EcdsaP256 {
                public: secret.public_key(),
                private: Some(secret),
            }
        }
        KeySpec::EcdsaP384 => {
            let secret = p384::SecretKey::random(&mut OsRng);
            KeyMaterial::EcdsaP384 {
                public: secret.public_key(),
                private: Some(secret),
            }
        }
        KeySpec::EcdsaP521 => {
            let secret = p521::SecretKey::random(&mut OsRng);
            KeyMaterial::EcdsaP521 {
                public: secret.public_key(),
                private: Some(secret),
            }
        }
        KeySpec::Rsa2048 => rsa_material(2048)?,
        KeySpec::Rsa3072 => rsa_material(3072)?,
        KeySpec::Rsa4096 => rsa_material(4096)?,
        KeySpec::Ed25519 => {
            let signing = ed25519_dalek::SigningKey::generate(&mut OsRng);
            KeyMaterial::Ed25519 {
                public: signing.verifying_key(),
                private: Some(signing),
            }
        }
    };
    LoadedKey::from_material(material, None)
}

fn rsa_material(bits: usize) -> Result<KeyMaterial> {
    let private = rsa::RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| Error::KeyGeneration(format!("RSA-{} generation failed: {}", bits, e)))?;
    let public = private.to_public_key();
    Ok(KeyMaterial::Rsa {
        public,
        private: Some(private),
    })
}

/// Export the private key as passphrase-encrypted PKCS#8 PEM
///
/// Uses PBES2 with the pkcs8 crate's default parameters; the armor carries
/// the canonical `ENCRYPTED PRIVATE KEY` type, which [`crate::codec`]
/// decodes back (including via the vendor aliases).
pub fn encrypted_private_pem(loaded: &LoadedKey, passphrase: &str) -> Result<String> {
    let plain = loaded.material.private_pkcs8_der()?;
    let info = PrivateKeyInfo::try_from(plain.as_bytes())
        .map_err(|e| Error::Der(format!("invalid PKCS#8 structure: {}", e)))?;
    let encrypted = info
        .encrypt(OsRng, passphrase.as_bytes())
        .map_err(|e| Error::KeyGeneration(format!("PKCS#8 encryption failed: {}", e)))?;
    let pem = encrypted
        .to_pem("ENCRYPTED PRIVATE KEY", LineEnding::LF)
        .map_err(|e| Error::Pem(format!("PEM encoding failed: {}", e)))?;
    Ok(pem.to_string())
}
