//! In-toto attestation statement
//!
//! The envelope payload is an in-toto statement binding a predicate (an
//! arbitrary JSON claim, e.g. provenance or a scan result) to one or more
//! subjects identified by content digest.
//!
//! Specification: https://github.com/in-toto/attestation/blob/main/spec/v1/statement.md

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Statement type identifier for in-toto v1
pub const STATEMENT_TYPE_IN_TOTO_V1: &str = "https://in-toto.io/Statement/v1";

/// In-toto Statement v1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    /// Type identifier (typically [`STATEMENT_TYPE_IN_TOTO_V1`])
    #[serde(rename = "_type")]
    pub type_: String,
    /// Subjects being attested about
    pub subject: Vec<Subject>,
    /// Type of the predicate (e.g. "https://slsa.dev/provenance/v1")
    pub predicate_type: String,
    /// The claim itself; shape depends on `predicate_type`
    pub predicate: serde_json::Value,
}

/// Subject of a statement: an artifact identified by name and digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Name of the artifact (repository path)
    pub name: String,
    /// Cryptographic digest(s) of the artifact
    pub digest: Digest,
}

/// Digest set for a subject; sha256 is the minimum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    /// SHA-256 hash, hex-encoded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    /// SHA-512 hash, hex-encoded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha512: Option<String>,
}

impl Statement {
    /// Build a single-subject statement around a predicate
    pub fn new(
        subject_name: impl Into<String>,
        subject_sha256: impl Into<String>,
        predicate_type: impl Into<String>,
        predicate: serde_json::Value,
    ) -> Self {
        Self {
            type_: STATEMENT_TYPE_IN_TOTO_V1.to_string(),
            subject: vec![Subject {
                name: subject_name.into(),
                digest: Digest {
                    sha256: Some(subject_sha256.into()),
                    sha512: None,
                },
            }],
            predicate_type: predicate_type.into(),
            predicate,
        }
    }

    /// Parse a statement from its JSON payload bytes
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload)
            .map_err(|e| Error::InvalidStatement(format!("invalid statement payload: {}", e)))
    }

    /// Check whether any subject carries the given SHA-256 hash
    pub fn matches_sha256(&self, hash_hex: &str) -> bool {
        self.subject.iter().any(|subject| {
            subject
                .digest
                .sha256
                .as_ref()
                .is_some_and(|h| h == hash_hex)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_build_and_serde() {
        let statement = Statement::new(
            "repo/a.txt",
            "abc123",
            "https://slsa.dev/provenance/v1",
            serde_json::json!({"k": "v"}),
        );

        let json = serde_json::to_string(&statement).unwrap();
        assert!(json.contains(r#""_type":"https://in-toto.io/Statement/v1""#));
        assert!(json.contains(r#""predicateType":"https://slsa.dev/provenance/v1""#));

        let parsed: Statement = serde_json::from_str(&json).unwrap();
        assert_eq!(statement, parsed);
    }

    #[test]
    fn test_matches_sha256() {
        let statement = Statement::new("repo/a.txt", "hash1", "https://example.com/p/v1", serde_json::json!({}));
        assert!(statement.matches_sha256("hash1"));
        assert!(!statement.matches_sha256("hash2"));
    }

    #[test]
    fn test_from_payload_rejects_garbage() {
        assert!(Statement::from_payload(b"not json").is_err());
    }
}
