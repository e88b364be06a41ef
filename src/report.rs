//! Structured results of a conformance run.
//!
//! Every check returns a record instead of printing, so the same run can
//! drive a terminal summary, a JSON artefact in CI, or assertions in tests.

use crate::error::{CheckError, FailureKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Exit code when every enabled check passed.
pub const EXIT_PASS: i32 = 0;
/// Exit code when the server was reachable but a check failed.
pub const EXIT_CHECK_FAILED: i32 = 1;
/// Exit code when the health probe failed and the run was aborted.
pub const EXIT_UNREACHABLE: i32 = 2;

/// Identifies a check in reports and progress events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckName {
    HealthProbe,
    Extract,
    Convert,
    Idempotence,
}

impl CheckName {
    /// Human-readable label used in summaries.
    pub fn label(self) -> &'static str {
        match self {
            CheckName::HealthProbe => "Health probe",
            CheckName::Extract => "Text extraction API",
            CheckName::Convert => "HWPX conversion API",
            CheckName::Idempotence => "Extraction idempotence",
        }
    }
}

impl fmt::Display for CheckName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of the health probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// Whether anything answered at the configured address.
    pub reachable: bool,
    /// HTTP status of the answer, if there was one.
    pub status: Option<u16>,
    /// Reachable, but with a status other than 200 or 405.
    pub lenient: bool,
    pub message: String,
    /// Failure classification when unreachable.
    pub failure: Option<FailureKind>,
    pub duration_ms: u64,
}

/// Result of one extraction, conversion or idempotence check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub name: CheckName,
    pub passed: bool,
    /// HTTP status of the (last) response, if one was received.
    pub status: Option<u16>,
    pub message: String,
    pub failure: Option<FailureKind>,
    /// Characters of extracted text, or bytes of the converted document.
    pub size: Option<u64>,
    /// Leading part of the extracted text (extraction only).
    pub preview: Option<String>,
    /// Whether `preview` is shorter than the full text.
    #[serde(default)]
    pub preview_truncated: bool,
    /// Where the converted document was written (conversion only).
    pub output_path: Option<PathBuf>,
    pub duration_ms: u64,
}

impl CheckOutcome {
    /// A passing outcome with only the essentials filled in.
    pub fn pass(name: CheckName, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            name,
            passed: true,
            status,
            message: message.into(),
            failure: None,
            size: None,
            preview: None,
            preview_truncated: false,
            output_path: None,
            duration_ms: 0,
        }
    }

    /// A failing outcome derived from `err`.
    pub fn fail(name: CheckName, err: &CheckError) -> Self {
        let status = match err {
            CheckError::BadStatus { status, .. } => Some(*status),
            _ => None,
        };
        Self {
            name,
            passed: false,
            status,
            message: err.to_string(),
            failure: Some(err.kind()),
            size: None,
            preview: None,
            preview_truncated: false,
            output_path: None,
            duration_ms: 0,
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// Result of a full run: probe plus whichever checks were executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub base_url: String,
    pub input: PathBuf,
    pub probe: ProbeOutcome,
    pub extract: Option<CheckOutcome>,
    pub convert: Option<CheckOutcome>,
    pub idempotence: Option<CheckOutcome>,
    /// The probe failed and no further checks were attempted.
    pub aborted: bool,
    /// Overall verdict: every check that ran passed. When no upload check
    /// was selected, the probe must have answered 200 or 405.
    pub passed: bool,
    pub total_duration_ms: u64,
}

impl SuiteReport {
    /// Every check that ran, in execution order.
    pub fn checks(&self) -> impl Iterator<Item = &CheckOutcome> {
        [&self.extract, &self.convert, &self.idempotence]
            .into_iter()
            .flatten()
    }

    /// Process exit code for this report.
    pub fn exit_code(&self) -> i32 {
        if self.aborted {
            EXIT_UNREACHABLE
        } else if self.passed {
            EXIT_PASS
        } else {
            EXIT_CHECK_FAILED
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(reachable: bool) -> ProbeOutcome {
        ProbeOutcome {
            reachable,
            status: reachable.then_some(405),
            lenient: false,
            message: String::new(),
            failure: (!reachable).then_some(FailureKind::Connectivity),
            duration_ms: 1,
        }
    }

    fn report(aborted: bool, passed: bool) -> SuiteReport {
        SuiteReport {
            base_url: "http://localhost:8500".into(),
            input: PathBuf::from("doc.hwp"),
            probe: probe(!aborted),
            extract: None,
            convert: None,
            idempotence: None,
            aborted,
            passed,
            total_duration_ms: 0,
        }
    }

    #[test]
    fn exit_codes() {
        assert_eq!(report(false, true).exit_code(), EXIT_PASS);
        assert_eq!(report(false, false).exit_code(), EXIT_CHECK_FAILED);
        assert_eq!(report(true, false).exit_code(), EXIT_UNREACHABLE);
    }

    #[test]
    fn fail_outcome_keeps_status_and_kind() {
        let err = CheckError::BadStatus {
            status: 500,
            body: "oops".into(),
        };
        let o = CheckOutcome::fail(CheckName::Extract, &err);
        assert!(!o.passed);
        assert_eq!(o.status, Some(500));
        assert_eq!(o.failure, Some(FailureKind::BadStatus));
        assert!(o.message.contains("oops"));
    }

    #[test]
    fn checks_iterates_only_present_outcomes() {
        let mut r = report(false, true);
        r.convert = Some(CheckOutcome::pass(CheckName::Convert, Some(200), "ok"));
        let names: Vec<_> = r.checks().map(|c| c.name).collect();
        assert_eq!(names, vec![CheckName::Convert]);
    }

    #[test]
    fn report_serialises_to_json() {
        let r = report(true, false);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["aborted"], true);
        assert_eq!(json["probe"]["failure"], "connectivity");
    }
}
