//! Type-safe encoding wrappers
//!
//! Newtype wrappers around encoded string data so that base64 payloads,
//! signatures and hex digests cannot be confused at compile time.

use crate::error::{Error, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Base64-encoded data (standard alphabet)
///
/// Construction does not validate the encoding; use `decode()` to validate
/// and extract the raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Base64(String);

impl Base64 {
    /// Wrap an already-encoded string
    pub fn new(s: String) -> Self {
        Base64(s)
    }

    /// Encode raw bytes
    pub fn encode(bytes: &[u8]) -> Self {
        Base64(base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    /// Decode to raw bytes
    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.0)
            .map_err(|e| Error::InvalidEncoding(format!("invalid base64: {}", e)))
    }

    /// Get the underlying string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert into the underlying String
    pub fn into_string(self) -> String {
        self.0
    }

    /// Check whether the encoded string is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Base64 {
    fn from(s: String) -> Self {
        Base64(s)
    }
}

impl From<&str> for Base64 {
    fn from(s: &str) -> Self {
        Base64(s.to_string())
    }
}

impl AsRef<str> for Base64 {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Base64 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_roundtrip() {
        let data = b"hello world";
        let encoded = Base64::encode(data);
        let decoded = encoded.decode().unwrap();
        assert_eq!(&decoded, data);
    }

    #[test]
    fn test_base64_invalid() {
        let bad = Base64::new("not valid base64!!!".to_string());
        assert!(bad.decode().is_err());
    }
}
