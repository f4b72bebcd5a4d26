//! Evidence signature envelope (DSSE)
//!
//! Evidence is transported as a DSSE envelope: an opaque payload, its media
//! type, and one or more signatures over the Pre-Authentication Encoding of
//! `(payload_type, payload)`. Signing the PAE instead of the raw payload
//! prevents type confusion between payload kinds.
//!
//! Specification: https://github.com/secure-systems-lab/dsse

use crate::encoding::Base64;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Payload type for in-toto statement payloads
pub const PAYLOAD_TYPE_IN_TOTO: &str = "application/vnd.in-toto+json";

/// A signed evidence envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceEnvelope {
    /// Type URI of the payload
    pub payload_type: String,
    /// Base64-encoded payload (the statement JSON)
    pub payload: Base64,
    /// Signatures over the PAE, each tagged with the signing key's ID
    pub signatures: Vec<EnvelopeSignature>,
}

/// A single signature in an evidence envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeSignature {
    /// ID of the key that produced this signature
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub keyid: String,
    /// Base64-encoded signature bytes
    pub sig: Base64,
}

impl EvidenceEnvelope {
    /// Create a new envelope
    ///
    /// A created envelope must carry at least one signature; an empty
    /// signature set is rejected here rather than at transmission time.
    pub fn new(
        payload_type: impl Into<String>,
        payload: Base64,
        signatures: Vec<EnvelopeSignature>,
    ) -> Result<Self> {
        if signatures.is_empty() {
            return Err(Error::InvalidEnvelope(
                "envelope must carry at least one signature".to_string(),
            ));
        }
        Ok(Self {
            payload_type: payload_type.into(),
            payload,
            signatures,
        })
    }

    /// Parse an envelope from JSON
    pub fn from_json(json: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(json)?)
    }

    /// Serialize the envelope to JSON
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode the payload bytes
    pub fn decode_payload(&self) -> Result<Vec<u8>> {
        self.payload.decode()
    }

    /// Compute the Pre-Authentication Encoding for this envelope
    pub fn pae(&self) -> Result<Vec<u8>> {
        Ok(pae(&self.payload_type, &self.decode_payload()?))
    }
}

/// Compute the Pre-Authentication Encoding
///
/// Format: `DSSEv1 <len(type)> <type> <len(body)> <body>`
pub fn pae(payload_type: &str, payload: &[u8]) -> Vec<u8> {
    let mut result = Vec::new();
    result.extend_from_slice(b"DSSEv1 ");
    result.extend_from_slice(format!("{} ", payload_type.len()).as_bytes());
    result.extend_from_slice(payload_type.as_bytes());
    result.push(b' ');
    result.extend_from_slice(format!("{} ", payload.len()).as_bytes());
    result.extend_from_slice(payload);
    result
}
