//! Verification report types
//!
//! One [`EvidenceVerificationResult`] per evaluated evidence record, rolled
//! up into a [`VerificationReport`]. The report is the hand-off point to the
//! report renderer; it carries no verification logic beyond the aggregation
//! invariant.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Outcome of verifying a single evidence record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// The record verified against some trusted key or trust root
    Success,
    /// The record did not verify; the reason is recorded alongside
    Failed,
}

/// Outcome detail from the transparency-log library for bundle-path records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleVerification {
    /// Identity from the signing certificate, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    /// OIDC issuer from the signing certificate, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    /// Integrated time from the transparency log, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrated_time: Option<i64>,
    /// Non-fatal warnings emitted by the library
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Per-record verification outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceVerificationResult {
    /// Pass/fail status for this record
    pub status: VerificationStatus,
    /// Which key or trust path matched (or was attempted)
    pub key_source: String,
    /// Present only when `status` is `Failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// Predicate type of the evidence record
    pub predicate_type: String,
    /// Catalog download path of the evidence record
    pub evidence_path: String,
    /// Library outcome for bundle-path records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle: Option<BundleVerification>,
}

impl EvidenceVerificationResult {
    /// A successful record outcome
    pub fn success(
        key_source: impl Into<String>,
        predicate_type: impl Into<String>,
        evidence_path: impl Into<String>,
    ) -> Self {
        Self {
            status: VerificationStatus::Success,
            key_source: key_source.into(),
            failure_reason: None,
            predicate_type: predicate_type.into(),
            evidence_path: evidence_path.into(),
            bundle: None,
        }
    }

    /// A failed record outcome with its reason
    pub fn failed(
        key_source: impl Into<String>,
        reason: impl Into<String>,
        predicate_type: impl Into<String>,
        evidence_path: impl Into<String>,
    ) -> Self {
        Self {
            status: VerificationStatus::Failed,
            key_source: key_source.into(),
            failure_reason: Some(reason.into()),
            predicate_type: predicate_type.into(),
            evidence_path: evidence_path.into(),
            bundle: None,
        }
    }

    /// Attach the library outcome for a bundle-path record
    pub fn with_bundle(mut self, bundle: BundleVerification) -> Self {
        self.bundle = Some(bundle);
        self
    }
}

/// Aggregated report over all evidence records for one subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    /// Repository path of the verified subject
    pub subject_path: String,
    /// SHA-256 digest of the verified subject
    pub subject_sha256: String,
    /// Success iff every evaluated record is Success
    pub overall_status: VerificationStatus,
    /// Per-record outcomes, in evaluation order
    pub results: Vec<EvidenceVerificationResult>,
}

impl VerificationReport {
    /// Build a report from per-record results, enforcing the aggregation
    /// invariant.
    ///
    /// A zero-record report is rejected: "no evidence found" must be
    /// surfaced as an error upstream, not as an empty Success report.
    pub fn new(
        subject_path: impl Into<String>,
        subject_sha256: impl Into<String>,
        results: Vec<EvidenceVerificationResult>,
    ) -> Result<Self> {
        if results.is_empty() {
            return Err(Error::InvalidReport(
                "report must contain at least one evidence record result".to_string(),
            ));
        }
        let overall_status = if results
            .iter()
            .all(|r| r.status == VerificationStatus::Success)
        {
            VerificationStatus::Success
        } else {
            VerificationStatus::Failed
        };
        Ok(Self {
            subject_path: subject_path.into(),
            subject_sha256: subject_sha256.into(),
            overall_status,
            results,
        })
    }

    /// Exit status for this report (see [`ExitStatus`])
    pub fn exit_status(&self) -> ExitStatus {
        match self.overall_status {
            VerificationStatus::Success => ExitStatus::Success,
            VerificationStatus::Failed => ExitStatus::VerificationFailed,
        }
    }
}

/// Process-level outcome signal
///
/// CI pipelines need to branch on "could not verify" (a processing error)
/// versus "verified and found invalid" (a completed run with failed
/// records), so the two map to distinct codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// All records verified
    Success,
    /// The run completed but at least one record failed verification
    VerificationFailed,
    /// The run could not complete (structural or upstream error)
    ProcessingError,
}

impl ExitStatus {
    /// Numeric process exit code
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::ProcessingError => 1,
            ExitStatus::VerificationFailed => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(path: &str) -> EvidenceVerificationResult {
        EvidenceVerificationResult::success("user key", "https://example.com/p/v1", path)
    }

    fn bad(path: &str) -> EvidenceVerificationResult {
        EvidenceVerificationResult::failed(
            "user key",
            "signature mismatch",
            "https://example.com/p/v1",
            path,
        )
    }

    #[test]
    fn test_all_success_aggregates_success() {
        let report =
            VerificationReport::new("repo/a.txt", "d1", vec![ok("e1"), ok("e2"), ok("e3")])
                .unwrap();
        assert_eq!(report.overall_status, VerificationStatus::Success);
        assert_eq!(report.exit_status(), ExitStatus::Success);
    }

    #[test]
    fn test_single_failure_aggregates_failed() {
        let report =
            VerificationReport::new("repo/a.txt", "d1", vec![ok("e1"), bad("e2"), ok("e3")])
                .unwrap();
        assert_eq!(report.overall_status, VerificationStatus::Failed);
        assert_eq!(report.exit_status(), ExitStatus::VerificationFailed);
    }

    #[test]
    fn test_zero_records_rejected() {
        assert!(VerificationReport::new("repo/a.txt", "d1", vec![]).is_err());
    }

    #[test]
    fn test_exit_codes_distinct() {
        assert_ne!(
            ExitStatus::VerificationFailed.code(),
            ExitStatus::ProcessingError.code()
        );
        assert_eq!(ExitStatus::Success.code(), 0);
    }

    #[test]
    fn test_failure_reason_serialized_only_when_failed() {
        let json = serde_json::to_string(&ok("e1")).unwrap();
        assert!(!json.contains("failureReason"));
        let json = serde_json::to_string(&bad("e1")).unwrap();
        assert!(json.contains("failureReason"));
    }
}
