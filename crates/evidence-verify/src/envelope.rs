//! Key-based envelope verification
//!
//! A received envelope is checked against a set of candidate public keys:
//! caller-supplied keys, keys resolved from the trusted-key store, or the
//! per-record signing key embedded in the catalog entry. The first
//! candidate that verifies any of the envelope's signatures wins, and its
//! source label is recorded in the report.

use crate::error::Result;
use evidence_crypto::SignerVerifier;
use evidence_types::EvidenceEnvelope;

/// A candidate verification key with a human-readable source label
pub struct Candidate {
    /// Verification handle for the candidate key
    pub verifier: SignerVerifier,
    /// Where the key came from (reported as `key_source` on a match)
    pub source: String,
}

impl Candidate {
    /// Wrap a verifier with its source label
    pub fn new(verifier: SignerVerifier, source: impl Into<String>) -> Self {
        Self {
            verifier,
            source: source.into(),
        }
    }
}

/// Outcome of checking an envelope against the candidate set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeOutcome {
    /// Some candidate verified a signature
    Matched {
        /// Source label of the matching candidate
        key_source: String,
        /// Key ID of the matching candidate
        key_id: String,
    },
    /// No candidate verified any signature
    NoMatch {
        /// How many candidates were attempted
        attempted: usize,
    },
}

/// Verify an envelope against candidate keys, first match wins
///
/// Candidates whose key ID matches a signature's `keyid` hint are tried
/// first; the hint is advisory and an exhaustive pass follows, so a wrong
/// hint never hides a valid key.
pub fn verify_envelope(
    envelope: &EvidenceEnvelope,
    candidates: &[&Candidate],
) -> Result<EnvelopeOutcome> {
    let pae = envelope.pae()?;

    let hinted = |candidate: &Candidate| {
        envelope
            .signatures
            .iter()
            .any(|s| !s.keyid.is_empty() && s.keyid == candidate.verifier.key_id())
    };

    let ordered = candidates
        .iter()
        .filter(|c| hinted(c))
        .chain(candidates.iter().filter(|c| !hinted(c)));

    for candidate in ordered {
        for signature in &envelope.signatures {
            let Ok(signature_bytes) = signature.sig.decode() else {
                continue;
            };
            if candidate.verifier.verify(&pae, &signature_bytes).is_ok() {
                tracing::debug!(
                    key_id = candidate.verifier.key_id(),
                    source = candidate.source.as_str(),
                    "envelope signature verified"
                );
                return Ok(EnvelopeOutcome::Matched {
                    key_source: candidate.source.clone(),
                    key_id: candidate.verifier.key_id().to_string(),
                });
            }
        }
    }

    Ok(EnvelopeOutcome::NoMatch {
        attempted: candidates.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidence_crypto::{generate, KeySpec};
    use evidence_types::{pae, Base64, EnvelopeSignature, PAYLOAD_TYPE_IN_TOTO};

    fn signed_envelope(signer: &SignerVerifier, payload: &[u8]) -> EvidenceEnvelope {
        let signature = signer
            .sign(&pae(PAYLOAD_TYPE_IN_TOTO, payload))
            .expect("signing");
        EvidenceEnvelope::new(
            PAYLOAD_TYPE_IN_TOTO,
            Base64::encode(payload),
            vec![EnvelopeSignature {
                keyid: signer.key_id().to_string(),
                sig: Base64::encode(&signature),
            }],
        )
        .expect("envelope")
    }

    #[test]
    fn test_first_match_wins_and_reports_source() {
        let signer = SignerVerifier::new(generate(KeySpec::Ed25519).unwrap());
        let envelope = signed_envelope(&signer, b"{\"x\":1}");

        let wrong = Candidate::new(
            SignerVerifier::new(generate(KeySpec::Ed25519).unwrap()),
            "unrelated key",
        );
        let matching = Candidate::new(
            SignerVerifier::from_public_record(&signer.public_key()).unwrap(),
            "provided key",
        );

        let outcome = verify_envelope(&envelope, &[&wrong, &matching]).unwrap();
        assert_eq!(
            outcome,
            EnvelopeOutcome::Matched {
                key_source: "provided key".to_string(),
                key_id: signer.key_id().to_string(),
            }
        );
    }

    #[test]
    fn test_no_match_is_not_an_error() {
        let signer = SignerVerifier::new(generate(KeySpec::Ed25519).unwrap());
        let envelope = signed_envelope(&signer, b"{\"x\":1}");

        let unrelated = Candidate::new(
            SignerVerifier::new(generate(KeySpec::EcdsaP256).unwrap()),
            "unrelated",
        );
        let outcome = verify_envelope(&envelope, &[&unrelated]).unwrap();
        assert_eq!(outcome, EnvelopeOutcome::NoMatch { attempted: 1 });
    }
}
