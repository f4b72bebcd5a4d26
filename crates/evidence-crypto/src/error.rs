//! Error types for evidence-crypto
//!
//! The variants mirror the error taxonomy of the engine: structural problems
//! (unparsable or unsupported key material) are distinct from the
//! authentication class (wrong passphrase) and from signature-verification
//! failure, so callers can branch on kind instead of matching message text.

use thiserror::Error;

/// Errors that can occur in key handling and signing operations
#[derive(Error, Debug)]
pub enum Error {
    /// The input contains no PEM block
    #[error("No PEM block found: {0}")]
    NoPemBlock(String),

    /// The PEM block parses under none of the supported encodings
    #[error("Unparsable key material: {0}")]
    Unparseable(String),

    /// The key algorithm is not ECDSA, RSA or Ed25519
    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// The key is encrypted and cannot be decoded without a passphrase
    ///
    /// Callers catch this variant specifically to obtain a passphrase and
    /// retry via the password-based loader.
    #[error("Encrypted private key requires a passphrase: {0}")]
    EncryptedKey(String),

    /// The encryption scheme of the key is not supported
    #[error("Unsupported key encryption: {0}")]
    UnsupportedEncryption(String),

    /// Decryption failed, most likely a wrong passphrase
    ///
    /// Authentication class: interactive callers may re-prompt. Never folded
    /// into the structural errors above.
    #[error("Key decryption failed: wrong passphrase")]
    WrongPassphrase,

    /// A signing operation was attempted with public-only material
    #[error("Cannot sign: key record holds no private key")]
    NotPrivateKey,

    /// Public key material was required but could not be produced
    #[error("Not a public key: {0}")]
    NotPublic(String),

    /// The signature does not verify against the key
    ///
    /// Distinct from structural errors so an orchestrator records it as a
    /// per-record Failed outcome instead of aborting.
    #[error("Signature verification failed")]
    SignatureMismatch,

    /// No public key was supplied where one is required
    #[error("Missing public key: {0}")]
    MissingPublicKey(String),

    /// Key generation error
    #[error("Key generation error: {0}")]
    KeyGeneration(String),

    /// PEM encoding/decoding error
    #[error("PEM error: {0}")]
    Pem(String),

    /// DER encoding/decoding error
    #[error("DER error: {0}")]
    Der(String),

    /// Canonical JSON serialization error
    #[error("Canonicalization error: {0}")]
    Canonicalization(String),
}

/// Result type for key handling and signing operations
pub type Result<T> = std::result::Result<T, Error>;
