//! Key identity and fingerprint derivation
//!
//! The key ID is a wire format: the SHA-256 of a canonical-JSON encoding of
//! the key's public fields, hex-encoded. Canonicalization follows the OLPC
//! canonical-JSON rules (lexicographically sorted object keys, no
//! insignificant whitespace, only `\` and `"` escaped in strings) so that a
//! verifying counterpart reproduces the same bytes exactly.
//!
//! The fingerprint is independent of the key ID: SHA-256 over the PKIX DER
//! of the public key, standard-base64 encoded (44 ASCII characters).

use crate::error::{Error, Result};
use crate::record::{KeyType, KEY_ID_HASH_ALGORITHMS};
use base64::Engine;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Derive the key ID for a public key
///
/// Builds the canonical map
/// `{keytype, scheme, keyid_hash_algorithms, keyval: {public}}`,
/// canonicalizes, hashes with SHA-256 and hex-encodes.
pub fn derive_key_id(key_type: KeyType, scheme: &str, public: &str) -> Result<String> {
    let map = serde_json::json!({
        "keytype": key_type.as_str(),
        "scheme": scheme,
        "keyid_hash_algorithms": KEY_ID_HASH_ALGORITHMS,
        "keyval": { "public": public },
    });
    let canonical = canonical_json(&map)?;
    Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
}

/// Compute the public-key fingerprint over PKIX DER bytes
///
/// Returns the standard-base64 encoding of the SHA-256 digest; fails with a
/// descriptive error when no key is supplied.
pub fn fingerprint(public_der: Option<&[u8]>) -> Result<String> {
    let der = public_der.ok_or_else(|| {
        Error::MissingPublicKey("cannot fingerprint: no public key supplied".to_string())
    })?;
    let digest = Sha256::digest(der);
    Ok(base64::engine::general_purpose::STANDARD.encode(digest))
}

/// Serialize a JSON value under canonical-JSON rules
///
/// Floats are rejected: the canonical form has no representation for them,
/// and nothing in the key-ID map legitimately contains one.
pub fn canonical_json(value: &Value) -> Result<String> {
    let mut out = String::new();
    write_canonical(value, &mut out)?;
    Ok(out)
}

fn write_canonical(value: &Value, out: &mut String) -> Result<()> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => {
            let i = n.as_i64().ok_or_else(|| {
                Error::Canonicalization(format!("non-integer number not representable: {}", n))
            })?;
            out.push_str(&i.to_string());
        }
        Value::String(s) => write_canonical_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            // serde_json's map already iterates in sorted order, but the
            // ordering is an invariant of the wire format, so sort anyway.
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical_string(key, out);
                out.push(':');
                write_canonical(&map[key.as_str()], out)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

fn write_canonical_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_sorts_keys_and_strips_whitespace() {
        let value = serde_json::json!({"b": 1, "a": [true, null], "c": {"y": "z"}});
        assert_eq!(
            canonical_json(&value).unwrap(),
            r#"{"a":[true,null],"b":1,"c":{"y":"z"}}"#
        );
    }

    #[test]
    fn test_canonical_escapes_only_quote_and_backslash() {
        let value = Value::String("a\"b\\c\nd".to_string());
        // The newline passes through raw; only quote and backslash escape.
        assert_eq!(canonical_json(&value).unwrap(), "\"a\\\"b\\\\c\nd\"");
    }

    #[test]
    fn test_canonical_rejects_floats() {
        let value = serde_json::json!(1.5);
        assert!(canonical_json(&value).is_err());
    }

    #[test]
    fn test_key_id_deterministic() {
        let a = derive_key_id(KeyType::Ed25519, "ed25519", "aabbcc").unwrap();
        let b = derive_key_id(KeyType::Ed25519, "ed25519", "aabbcc").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_key_id_differs_across_keys_and_schemes() {
        let a = derive_key_id(KeyType::Ed25519, "ed25519", "aabbcc").unwrap();
        let b = derive_key_id(KeyType::Ed25519, "ed25519", "aabbcd").unwrap();
        let c = derive_key_id(KeyType::Ecdsa, "ecdsa-sha2-nistp256", "aabbcc").unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_key_id_pinned_vector() {
        // Pinned so any change to canonicalization is caught as a wire break.
        let map = serde_json::json!({
            "keytype": "ed25519",
            "scheme": "ed25519",
            "keyid_hash_algorithms": ["sha256", "sha512"],
            "keyval": { "public": "deadbeef" },
        });
        assert_eq!(
            canonical_json(&map).unwrap(),
            r#"{"keyid_hash_algorithms":["sha256","sha512"],"keytype":"ed25519","keyval":{"public":"deadbeef"},"scheme":"ed25519"}"#
        );
    }

    #[test]
    fn test_fingerprint_is_44_chars() {
        let fp = fingerprint(Some(b"some public key der bytes")).unwrap();
        assert_eq!(fp.len(), 44);
    }

    #[test]
    fn test_fingerprint_absent_key_fails() {
        let err = fingerprint(None).unwrap_err();
        assert!(matches!(err, Error::MissingPublicKey(_)));
    }
}
