//! Sigstore-style bundle verification
//!
//! Externally pre-signed bundles carry their own certificate chain and
//! transparency material. Verification proceeds through a fixed sequence:
//! extract the signing certificate's issuer organization, select the
//! matching trust provider, check the provider's transparency-material
//! preconditions, then delegate cryptographic and log verification to the
//! trust library under an explicit policy.
//!
//! Structural problems (nil bundle, missing certificate or issuer,
//! unsupported issuer, unreachable trust root) are hard errors. A failed
//! cryptographic or policy check from the library is a `Failed` outcome so
//! the orchestrator can continue with sibling records.

use crate::error::{Error, Result};
use evidence_trust::{TrustProvider, TrustRootResolver};
use evidence_types::BundleVerification;

use const_oid::ObjectIdentifier;
use sigstore_verify::types::bundle::SignatureContent;
use sigstore_verify::types::{Bundle, Sha256Hash};
use sigstore_verify::VerificationPolicy;
use x509_cert::der::Decode;
use x509_cert::Certificate;

/// X.509 organizationName attribute: 2.5.4.10
const ORGANIZATION_NAME_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");

/// Outcome of verifying one bundle
#[derive(Debug)]
pub enum BundleOutcome {
    /// The library accepted the bundle under the selected trust root
    Verified {
        /// Trust provider that supplied the root
        provider: TrustProvider,
        /// Library outcome detail for the report
        detail: BundleVerification,
    },
    /// The bundle failed a precondition or the library's verification
    Failed {
        /// Trust provider selected for the bundle
        provider: TrustProvider,
        /// Why verification failed
        reason: String,
    },
}

/// Verify a bundle against the trust root selected by its issuer
pub fn verify_bundle(
    bundle: Option<&Bundle>,
    subject_sha256: &str,
    resolver: &dyn TrustRootResolver,
) -> Result<BundleOutcome> {
    let bundle = bundle.ok_or_else(|| Error::NilBundle("no bundle supplied".to_string()))?;
    if !matches!(bundle.content, SignatureContent::DsseEnvelope(_)) {
        return Err(Error::NilBundle(
            "bundle carries no DSSE envelope".to_string(),
        ));
    }

    let issuer = extract_issuer_organization(bundle)?;
    let provider = TrustProvider::for_issuer(&issuer)?;
    tracing::debug!(issuer = %issuer, provider = provider.name(), "bundle trust provider selected");

    if let Some(reason) = transparency_precondition(bundle, provider) {
        return Ok(BundleOutcome::Failed { provider, reason });
    }

    let trusted_root = resolver.resolve(provider)?;

    // Artifact-hash binding is skipped here and enforced by the orchestrator
    // against the resolved subject digest; identity/SAN matching is not yet
    // enforced.
    let policy = VerificationPolicy::default().skip_artifact_hash();
    let digest = Sha256Hash::from_hex(subject_sha256)
        .map_err(|e| Error::InvalidDigest(format!("{}: {}", subject_sha256, e)))?;

    match sigstore_verify::verify_with_trusted_root(digest.as_slice(), bundle, &policy, &trusted_root) {
        Ok(result) => Ok(BundleOutcome::Verified {
            provider,
            detail: BundleVerification {
                identity: result.identity,
                issuer: result.issuer,
                integrated_time: result.integrated_time,
                warnings: result.warnings,
            },
        }),
        Err(e) => Ok(BundleOutcome::Failed {
            provider,
            reason: adapt_library_failure(&e.to_string()),
        }),
    }
}

/// Extract the issuer organization from the bundle's leaf certificate
pub fn extract_issuer_organization(bundle: &Bundle) -> Result<String> {
    let certificate = bundle
        .signing_certificate()
        .ok_or(Error::MissingCertificate)?;
    issuer_organization_from_der(certificate.as_bytes())
}

fn issuer_organization_from_der(der: &[u8]) -> Result<String> {
    let certificate = Certificate::from_der(der)
        .map_err(|e| Error::Certificate(format!("failed to parse certificate: {}", e)))?;
    for rdn in certificate.tbs_certificate.issuer.0.iter() {
        for attribute in rdn.0.iter() {
            if attribute.oid == ORGANIZATION_NAME_OID {
                if let Some(value) = attribute_string(&attribute.value) {
                    return Ok(value);
                }
            }
        }
    }
    Err(Error::MissingIssuer)
}

fn attribute_string(value: &der::Any) -> Option<String> {
    if let Ok(s) = value.decode_as::<der::asn1::Utf8StringRef>() {
        return Some(s.to_string());
    }
    if let Ok(s) = value.decode_as::<der::asn1::PrintableStringRef>() {
        return Some(s.to_string());
    }
    if let Ok(s) = value.decode_as::<der::asn1::Ia5StringRef>() {
        return Some(s.to_string());
    }
    None
}

/// Per-provider transparency-material requirements, checked before any
/// trust-root load
fn transparency_precondition(bundle: &Bundle, provider: TrustProvider) -> Option<String> {
    let timestamps = bundle
        .verification_material
        .timestamp_verification_data
        .rfc3161_timestamps
        .len();
    match provider {
        TrustProvider::GitHubActions => {
            if timestamps == 0 {
                return Some(
                    "bundle carries no signed timestamp, required by the github trust policy"
                        .to_string(),
                );
            }
        }
        TrustProvider::PublicGood => {
            if timestamps == 0
                && !bundle.has_inclusion_promise()
                && !bundle.has_inclusion_proof()
            {
                return Some(
                    "bundle carries neither a signed timestamp, an inclusion promise, nor an \
                     inclusion proof"
                        .to_string(),
                );
            }
        }
    }
    None
}

/// Narrow adapter: the trust library's failure becomes a report reason
///
/// This is the single place an opaque third-party error crosses into the
/// report; everything of ours is typed.
fn adapt_library_failure(message: &str) -> String {
    format!("trust library rejected the bundle: {}", message)
}
