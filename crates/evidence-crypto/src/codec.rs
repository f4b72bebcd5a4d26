//! Key codec: heterogeneous key encodings to normalized records
//!
//! Accepts PEM-armored key material and normalizes it into a [`KeyRecord`]
//! plus parsed algorithm objects. The first PEM block is decoded; OpenSSH
//! private keys are delegated to the SSH decoder, everything else is tried
//! in order PKCS#8 → PKCS#1 → PKIX → SEC1, first success wins.
//!
//! Encrypted blocks (explicit `ENCRYPTED ... PRIVATE KEY` types, or legacy
//! `Proc-Type: 4,ENCRYPTED` headers) are rejected here with
//! [`Error::EncryptedKey`]; callers catch that variant, obtain a passphrase
//! and retry through [`decode_with_passphrase`], which also accepts the
//! vendor aliases some signing tools use for PKCS#8-encrypted keys.

use crate::error::{Error, Result};
use crate::keyid;
use crate::record::{KeyRecord, KeyType};

use const_oid::db::rfc5912::{
    ID_EC_PUBLIC_KEY, RSA_ENCRYPTION, SECP_256_R_1, SECP_384_R_1, SECP_521_R_1,
};
use const_oid::db::rfc8410::ID_ED_25519;
use pkcs8::{
    DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey,
    EncryptedPrivateKeyInfo, LineEnding, PrivateKeyInfo, SecretDocument,
};
use rsa::pkcs1::DecodeRsaPrivateKey;

/// Scheme tag for ECDSA over P-256
pub const SCHEME_ECDSA_P256: &str = "ecdsa-sha2-nistp256";
/// Scheme tag for ECDSA over P-384
pub const SCHEME_ECDSA_P384: &str = "ecdsa-sha2-nistp384";
/// Scheme tag for ECDSA over P-521
pub const SCHEME_ECDSA_P521: &str = "ecdsa-sha2-nistp521";
/// Scheme tag for RSA-PSS with SHA-256
pub const SCHEME_RSA_PSS: &str = "rsassa-pss-sha256";
/// Scheme tag for Ed25519
pub const SCHEME_ED25519: &str = "ed25519";

/// Canonical PEM type for PKCS#8-encrypted private keys
const ENCRYPTED_PKCS8_TAG: &str = "ENCRYPTED PRIVATE KEY";

/// Vendor-specific aliases for the same PKCS#8-encrypted structure
const ENCRYPTED_TAG_ALIASES: &[&str] = &[
    "ENCRYPTED COSIGN PRIVATE KEY",
    "ENCRYPTED SIGSTORE PRIVATE KEY",
];

const OPENSSH_TAG: &str = "OPENSSH PRIVATE KEY";

/// Parsed key material for the supported algorithm families
///
/// The private half is optional; public-only material supports verification
/// but not signing.
#[derive(Debug)]
pub(crate) enum KeyMaterial {
    EcdsaP256 {
        public: p256::PublicKey,
        private: Option<p256::SecretKey>,
    },
    EcdsaP384 {
        public: p384::PublicKey,
        private: Option<p384::SecretKey>,
    },
    EcdsaP521 {
        public: p521::PublicKey,
        private: Option<p521::SecretKey>,
    },
    Rsa {
        public: rsa::RsaPublicKey,
        private: Option<rsa::RsaPrivateKey>,
    },
    Ed25519 {
        public: ed25519_dalek::VerifyingKey,
        private: Option<ed25519_dalek::SigningKey>,
    },
}

impl KeyMaterial {
    pub(crate) fn key_type(&self) -> KeyType {
        match self {
            KeyMaterial::EcdsaP256 { .. }
            | KeyMaterial::EcdsaP384 { .. }
            | KeyMaterial::EcdsaP521 { .. } => KeyType::Ecdsa,
            KeyMaterial::Rsa { .. } => KeyType::Rsa,
            KeyMaterial::Ed25519 { .. } => KeyType::Ed25519,
        }
    }

    pub(crate) fn scheme(&self) -> &'static str {
        match self {
            KeyMaterial::EcdsaP256 { .. } => SCHEME_ECDSA_P256,
            KeyMaterial::EcdsaP384 { .. } => SCHEME_ECDSA_P384,
            KeyMaterial::EcdsaP521 { .. } => SCHEME_ECDSA_P521,
            KeyMaterial::Rsa { .. } => SCHEME_RSA_PSS,
            KeyMaterial::Ed25519 { .. } => SCHEME_ED25519,
        }
    }

    /// Public material as stored in a record: PKIX PEM, hex for Ed25519
    pub(crate) fn public_string(&self) -> Result<String> {
        let pem = |r: std::result::Result<String, spki::Error>| {
            r.map_err(|e| Error::Pem(format!("public key PEM encoding failed: {}", e)))
        };
        match self {
            KeyMaterial::EcdsaP256 { public, .. } => pem(public.to_public_key_pem(LineEnding::LF)),
            KeyMaterial::EcdsaP384 { public, .. } => pem(public.to_public_key_pem(LineEnding::LF)),
            KeyMaterial::EcdsaP521 { public, .. } => pem(public.to_public_key_pem(LineEnding::LF)),
            KeyMaterial::Rsa { public, .. } => pem(public.to_public_key_pem(LineEnding::LF)),
            KeyMaterial::Ed25519 { public, .. } => Ok(hex::encode(public.to_bytes())),
        }
    }

    /// Private material as stored in a record: PKCS#8 PEM, hex for Ed25519
    pub(crate) fn private_string(&self) -> Result<Option<String>> {
        let pem = |r: std::result::Result<zeroize::Zeroizing<String>, pkcs8::Error>| {
            r.map(|z| Some(z.to_string()))
                .map_err(|e| Error::Pem(format!("private key PEM encoding failed: {}", e)))
        };
        match self {
            KeyMaterial::EcdsaP256 {
                private: Some(secret),
                ..
            } => pem(secret.to_pkcs8_pem(LineEnding::LF)),
            KeyMaterial::EcdsaP384 {
                private: Some(secret),
                ..
            } => pem(secret.to_pkcs8_pem(LineEnding::LF)),
            KeyMaterial::EcdsaP521 {
                private: Some(secret),
                ..
            } => pem(secret.to_pkcs8_pem(LineEnding::LF)),
            KeyMaterial::Rsa {
                private: Some(secret),
                ..
            } => pem(secret.to_pkcs8_pem(LineEnding::LF)),
            KeyMaterial::Ed25519 {
                private: Some(signing),
                ..
            } => Ok(Some(hex::encode(signing.to_bytes()))),
            _ => Ok(None),
        }
    }

    /// PKIX (SubjectPublicKeyInfo) DER of the public key
    pub(crate) fn public_key_der(&self) -> Result<Vec<u8>> {
        let doc = match self {
            KeyMaterial::EcdsaP256 { public, .. } => public.to_public_key_der(),
            KeyMaterial::EcdsaP384 { public, .. } => public.to_public_key_der(),
            KeyMaterial::EcdsaP521 { public, .. } => public.to_public_key_der(),
            KeyMaterial::Rsa { public, .. } => public.to_public_key_der(),
            KeyMaterial::Ed25519 { public, .. } => public.to_public_key_der(),
        };
        Ok(doc
            .map_err(|e| Error::Der(format!("public key DER encoding failed: {}", e)))?
            .as_bytes()
            .to_vec())
    }

    /// PKCS#8 DER of the private key
    pub(crate) fn private_pkcs8_der(&self) -> Result<SecretDocument> {
        let doc = match self {
            KeyMaterial::EcdsaP256 {
                private: Some(secret),
                ..
            } => secret.to_pkcs8_der(),
            KeyMaterial::EcdsaP384 {
                private: Some(secret),
                ..
            } => secret.to_pkcs8_der(),
            KeyMaterial::EcdsaP521 {
                private: Some(secret),
                ..
            } => secret.to_pkcs8_der(),
            KeyMaterial::Rsa {
                private: Some(secret),
                ..
            } => secret.to_pkcs8_der(),
            KeyMaterial::Ed25519 {
                private: Some(signing),
                ..
            } => signing.to_pkcs8_der(),
            _ => return Err(Error::NotPrivateKey),
        };
        doc.map_err(|e| Error::Der(format!("private key DER encoding failed: {}", e)))
    }
}

/// A decoded key: the normalized record plus the parsed algorithm objects
///
/// Created per operation and discarded with it; nothing here is cached
/// across invocations.
#[derive(Debug)]
pub struct LoadedKey {
    record: KeyRecord,
    pub(crate) material: KeyMaterial,
}

impl LoadedKey {
    pub(crate) fn from_material(
        material: KeyMaterial,
        private_override: Option<String>,
    ) -> Result<Self> {
        let public = material.public_string()?;
        let private = match private_override {
            Some(armor) => Some(armor),
            None => material.private_string()?,
        };
        let record = KeyRecord::new(material.key_type(), material.scheme(), public, private)?;
        Ok(Self { record, material })
    }

    /// The normalized key record
    pub fn record(&self) -> &KeyRecord {
        &self.record
    }

    /// Consume into the normalized record
    pub fn into_record(self) -> KeyRecord {
        self.record
    }

    /// Public-key fingerprint: base64(SHA-256(PKIX DER))
    pub fn fingerprint(&self) -> Result<String> {
        keyid::fingerprint(Some(&self.material.public_key_der()?))
    }
}

/// Decode PEM-armored key material into a [`LoadedKey`]
///
/// Encrypted inputs are rejected with [`Error::EncryptedKey`]; retry through
/// [`decode_with_passphrase`].
pub fn decode(raw: &[u8]) -> Result<LoadedKey> {
    let text = pem_text(raw)?;
    if text.contains("Proc-Type: 4,ENCRYPTED") {
        return Err(Error::EncryptedKey(
            "legacy OpenSSL encrypted PEM".to_string(),
        ));
    }
    let block = first_pem_block(text)?;
    let tag = block.tag();
    if tag == OPENSSH_TAG {
        let key = parse_openssh(text)?;
        if key.is_encrypted() {
            return Err(Error::EncryptedKey(
                "passphrase-protected OpenSSH key".to_string(),
            ));
        }
        return LoadedKey::from_material(material_from_openssh(&key)?, None);
    }
    if is_encrypted_tag(tag) {
        return Err(Error::EncryptedKey(format!("PEM type \"{}\"", tag)));
    }
    let loaded = LoadedKey::from_material(parse_der_any(block.contents())?, None)?;
    tracing::debug!(
        key_type = loaded.record().key_type().as_str(),
        scheme = loaded.record().scheme(),
        "key material decoded"
    );
    Ok(loaded)
}

/// Decode key material that may be passphrase-encrypted
///
/// Handles PKCS#8 PBES2 encryption (under the canonical PEM type or either
/// vendor alias, normalized first) and passphrase-protected OpenSSH keys.
/// Unencrypted input falls through to [`decode`]. A decryption failure is
/// reported as [`Error::WrongPassphrase`], distinguishable from the
/// structural errors.
pub fn decode_with_passphrase(raw: &[u8], passphrase: &str) -> Result<LoadedKey> {
    let text = pem_text(raw)?;
    if text.contains("Proc-Type: 4,ENCRYPTED") {
        return Err(Error::UnsupportedEncryption(
            "legacy OpenSSL PEM encryption (Proc-Type: 4,ENCRYPTED)".to_string(),
        ));
    }
    let block = first_pem_block(text)?;
    let tag = block.tag();
    if tag == OPENSSH_TAG {
        let key = parse_openssh(text)?;
        let key = if key.is_encrypted() {
            key.decrypt(passphrase.as_bytes())
                .map_err(|_| Error::WrongPassphrase)?
        } else {
            key
        };
        return LoadedKey::from_material(material_from_openssh(&key)?, None);
    }
    if !is_encrypted_tag(tag) {
        return decode(raw);
    }
    normalize_encrypted_tag(tag)?;
    let encrypted = EncryptedPrivateKeyInfo::try_from(block.contents())
        .map_err(|e| Error::Der(format!("invalid encrypted PKCS#8 structure: {}", e)))?;
    let document = encrypted
        .decrypt(passphrase.as_bytes())
        .map_err(|_| Error::WrongPassphrase)?;
    let material = parse_pkcs8(document.as_bytes())?;
    // The record keeps the original ciphertext armor, not the plaintext.
    LoadedKey::from_material(material, Some(text.to_string()))
}

/// Decode key material restricted to its public projection
///
/// Accepts public PEM, private PEM (projected to public), and the bare hex
/// form in which Ed25519 public keys are stored by the evidence catalog.
pub fn decode_public_only(raw: &[u8]) -> Result<KeyRecord> {
    if let Ok(text) = std::str::from_utf8(raw) {
        let trimmed = text.trim();
        if !trimmed.contains("-----BEGIN")
            && trimmed.len() == 64
            && trimmed.chars().all(|c| c.is_ascii_hexdigit())
        {
            return ed25519_public_from_hex(trimmed);
        }
    }
    let loaded = decode(raw)?;
    let record = loaded.record().public_only();
    if record.public().is_empty() {
        return Err(Error::NotPublic(
            "private key with no computable public projection".to_string(),
        ));
    }
    Ok(record)
}

fn ed25519_public_from_hex(hex_str: &str) -> Result<KeyRecord> {
    let bytes = hex::decode(hex_str)
        .map_err(|e| Error::NotPublic(format!("invalid hex public key: {}", e)))?;
    let arr: [u8; 32] = bytes
        .try_into()
        .map_err(|_| Error::NotPublic("hex public key is not 32 bytes".to_string()))?;
    let public = ed25519_dalek::VerifyingKey::from_bytes(&arr)
        .map_err(|e| Error::NotPublic(format!("invalid Ed25519 public key: {}", e)))?;
    Ok(LoadedKey::from_material(
        KeyMaterial::Ed25519 {
            public,
            private: None,
        },
        None,
    )?
    .into_record())
}

fn pem_text(raw: &[u8]) -> Result<&str> {
    std::str::from_utf8(raw).map_err(|_| Error::NoPemBlock("input is not UTF-8 text".to_string()))
}

fn first_pem_block(text: &str) -> Result<pem::Pem> {
    let blocks =
        pem::parse_many(text).map_err(|e| Error::NoPemBlock(format!("PEM parse failed: {}", e)))?;
    blocks
        .into_iter()
        .next()
        .ok_or_else(|| Error::NoPemBlock("no PEM block in input".to_string()))
}

fn is_encrypted_tag(tag: &str) -> bool {
    tag.contains("ENCRYPTED") && tag.ends_with("PRIVATE KEY")
}

/// Map the vendor aliases onto the canonical encrypted-PKCS#8 PEM type
fn normalize_encrypted_tag(tag: &str) -> Result<&'static str> {
    if tag == ENCRYPTED_PKCS8_TAG || ENCRYPTED_TAG_ALIASES.contains(&tag) {
        Ok(ENCRYPTED_PKCS8_TAG)
    } else {
        Err(Error::UnsupportedEncryption(format!(
            "unrecognized encrypted PEM type \"{}\"",
            tag
        )))
    }
}

/// Try the supported DER encodings in order: PKCS#8, PKCS#1, PKIX, SEC1
fn parse_der_any(der: &[u8]) -> Result<KeyMaterial> {
    if PrivateKeyInfo::try_from(der).is_ok() {
        // Structurally PKCS#8: algorithm dispatch errors are authoritative.
        return parse_pkcs8(der);
    }
    if let Ok(private) = rsa::RsaPrivateKey::from_pkcs1_der(der) {
        let public = private.to_public_key();
        return Ok(KeyMaterial::Rsa {
            public,
            private: Some(private),
        });
    }
    if spki::SubjectPublicKeyInfoRef::try_from(der).is_ok() {
        return parse_pkix(der);
    }
    if let Ok(secret) = p256::SecretKey::from_sec1_der(der) {
        return Ok(KeyMaterial::EcdsaP256 {
            public: secret.public_key(),
            private: Some(secret),
        });
    }
    if let Ok(secret) = p384::SecretKey::from_sec1_der(der) {
        return Ok(KeyMaterial::EcdsaP384 {
            public: secret.public_key(),
            private: Some(secret),
        });
    }
    if let Ok(secret) = p521::SecretKey::from_sec1_der(der) {
        return Ok(KeyMaterial::EcdsaP521 {
            public: secret.public_key(),
            private: Some(secret),
        });
    }
    Err(Error::Unparseable(
        "PEM block parses under none of PKCS#8, PKCS#1, PKIX or SEC1".to_string(),
    ))
}

fn parse_pkcs8(der: &[u8]) -> Result<KeyMaterial> {
    let info = PrivateKeyInfo::try_from(der)
        .map_err(|e| Error::Der(format!("invalid PKCS#8 structure: {}", e)))?;
    let algorithm = info.algorithm.oid;
    if algorithm == ID_EC_PUBLIC_KEY {
        let curve = info
            .algorithm
            .parameters_oid()
            .map_err(|e| Error::Der(format!("missing EC curve parameters: {}", e)))?;
        let der_err = |e: pkcs8::Error| Error::Der(format!("invalid EC private key: {}", e));
        if curve == SECP_256_R_1 {
            let secret = p256::SecretKey::from_pkcs8_der(der).map_err(der_err)?;
            Ok(KeyMaterial::EcdsaP256 {
                public: secret.public_key(),
                private: Some(secret),
            })
        } else if curve == SECP_384_R_1 {
            let secret = p384::SecretKey::from_pkcs8_der(der).map_err(der_err)?;
            Ok(KeyMaterial::EcdsaP384 {
                public: secret.public_key(),
                private: Some(secret),
            })
        } else if curve == SECP_521_R_1 {
            let secret = p521::SecretKey::from_pkcs8_der(der).map_err(der_err)?;
            Ok(KeyMaterial::EcdsaP521 {
                public: secret.public_key(),
                private: Some(secret),
            })
        } else {
            Err(Error::UnsupportedKeyType(format!("EC curve {}", curve)))
        }
    } else if algorithm == RSA_ENCRYPTION {
        let private = rsa::RsaPrivateKey::from_pkcs8_der(der)
            .map_err(|e| Error::Der(format!("invalid RSA private key: {}", e)))?;
        let public = private.to_public_key();
        Ok(KeyMaterial::Rsa {
            public,
            private: Some(private),
        })
    } else if algorithm == ID_ED_25519 {
        let signing = ed25519_dalek::SigningKey::from_pkcs8_der(der)
            .map_err(|e| Error::Der(format!("invalid Ed25519 private key: {}", e)))?;
        let public = signing.verifying_key();
        Ok(KeyMaterial::Ed25519 {
            public,
            private: Some(signing),
        })
    } else {
        Err(Error::UnsupportedKeyType(algorithm.to_string()))
    }
}

fn parse_pkix(der: &[u8]) -> Result<KeyMaterial> {
    let info = spki::SubjectPublicKeyInfoRef::try_from(der)
        .map_err(|e| Error::Der(format!("invalid SubjectPublicKeyInfo: {}", e)))?;
    let algorithm = info.algorithm.oid;
    if algorithm == ID_EC_PUBLIC_KEY {
        let curve = info
            .algorithm
            .parameters_oid()
            .map_err(|e| Error::Der(format!("missing EC curve parameters: {}", e)))?;
        let der_err = |e: spki::Error| Error::Der(format!("invalid EC public key: {}", e));
        if curve == SECP_256_R_1 {
            Ok(KeyMaterial::EcdsaP256 {
                public: p256::PublicKey::from_public_key_der(der).map_err(der_err)?,
                private: None,
            })
        } else if curve == SECP_384_R_1 {
            Ok(KeyMaterial::EcdsaP384 {
                public: p384::PublicKey::from_public_key_der(der).map_err(der_err)?,
                private: None,
            })
        } else if curve == SECP_521_R_1 {
            Ok(KeyMaterial::EcdsaP521 {
                public: p521::PublicKey::from_public_key_der(der).map_err(der_err)?,
                private: None,
            })
        } else {
            Err(Error::UnsupportedKeyType(format!("EC curve {}", curve)))
        }
    } else if algorithm == RSA_ENCRYPTION {
        Ok(KeyMaterial::Rsa {
            public: rsa::RsaPublicKey::from_public_key_der(der)
                .map_err(|e| Error::Der(format!("invalid RSA public key: {}", e)))?,
            private: None,
        })
    } else if algorithm == ID_ED_25519 {
        Ok(KeyMaterial::Ed25519 {
            public: ed25519_dalek::VerifyingKey::from_public_key_der(der)
                .map_err(|e| Error::Der(format!("invalid Ed25519 public key: {}", e)))?,
            private: None,
        })
    } else {
        Err(Error::UnsupportedKeyType(algorithm.to_string()))
    }
}

fn parse_openssh(text: &str) -> Result<ssh_key::PrivateKey> {
    ssh_key::PrivateKey::from_openssh(text)
        .map_err(|e| Error::Unparseable(format!("OpenSSH private key: {}", e)))
}

fn material_from_openssh(key: &ssh_key::PrivateKey) -> Result<KeyMaterial> {
    use ssh_key::private::{EcdsaKeypair, KeypairData};
    match key.key_data() {
        KeypairData::Ed25519(keypair) => {
            let signing = ed25519_dalek::SigningKey::try_from(keypair)
                .map_err(|e| Error::Unparseable(format!("OpenSSH Ed25519 key: {}", e)))?;
            Ok(KeyMaterial::Ed25519 {
                public: signing.verifying_key(),
                private: Some(signing),
            })
        }
        KeypairData::Ecdsa(EcdsaKeypair::NistP256 { private, .. }) => {
            let secret = p256::SecretKey::from_slice(private.as_slice())
                .map_err(|e| Error::Unparseable(format!("OpenSSH P-256 key: {}", e)))?;
            Ok(KeyMaterial::EcdsaP256 {
                public: secret.public_key(),
                private: Some(secret),
            })
        }
        KeypairData::Ecdsa(EcdsaKeypair::NistP384 { private, .. }) => {
            let secret = p384::SecretKey::from_slice(private.as_slice())
                .map_err(|e| Error::Unparseable(format!("OpenSSH P-384 key: {}", e)))?;
            Ok(KeyMaterial::EcdsaP384 {
                public: secret.public_key(),
                private: Some(secret),
            })
        }
        KeypairData::Ecdsa(EcdsaKeypair::NistP521 { private, .. }) => {
            let secret = p521::SecretKey::from_slice(private.as_slice())
                .map_err(|e| Error::Unparseable(format!("OpenSSH P-521 key: {}", e)))?;
            Ok(KeyMaterial::EcdsaP521 {
                public: secret.public_key(),
                private: Some(secret),
            })
        }
        KeypairData::Rsa(keypair) => {
            let private = rsa::RsaPrivateKey::try_from(keypair)
                .map_err(|e| Error::Unparseable(format!("OpenSSH RSA key: {}", e)))?;
            let public = private.to_public_key();
            Ok(KeyMaterial::Rsa {
                public,
                private: Some(private),
            })
        }
        _ => Err(Error::UnsupportedKeyType(
            "OpenSSH key algorithm is not ECDSA, RSA or Ed25519".to_string(),
        )),
    }
}
