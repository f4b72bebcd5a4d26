//! Cryptographic core of the evidence engine
//!
//! Loads heterogeneous key encodings (PEM-armored PKCS#8, PKCS#1, PKIX,
//! SEC1, OpenSSH, optionally passphrase-encrypted) into normalized
//! [`KeyRecord`]s, provides uniform sign/verify capabilities across ECDSA
//! (P-256/P-384/P-521), RSA-PSS and Ed25519, and derives the deterministic
//! key identity and fingerprint used for key matching.

pub mod codec;
pub mod error;
pub mod generate;
pub mod keyid;
pub mod record;
pub mod sign;

pub use codec::{
    decode, decode_public_only, decode_with_passphrase, LoadedKey, SCHEME_ECDSA_P256,
    SCHEME_ECDSA_P384, SCHEME_ECDSA_P521, SCHEME_ED25519, SCHEME_RSA_PSS,
};
pub use error::{Error, Result};
pub use generate::{encrypted_private_pem, generate, KeySpec};
pub use keyid::{canonical_json, derive_key_id, fingerprint};
pub use record::{KeyRecord, KeyType, KEY_ID_HASH_ALGORITHMS};
pub use sign::SignerVerifier;
