//! Error types for the hwp-reader-check library.
//!
//! [`CheckError`] carries the full detail of what went wrong (which URL,
//! which path, the raw server body). [`FailureKind`] is the closed taxonomy
//! callers branch on: every `CheckError` maps to exactly one kind via
//! [`CheckError::kind`], and the kind is what ends up in a
//! [`crate::report::CheckOutcome`] next to the human-readable message.
//!
//! Checks never propagate a `CheckError` to the caller. They catch it at the
//! check boundary and turn it into a failed outcome, so one broken endpoint
//! cannot hide the result of the other.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while talking to the reader service.
#[derive(Debug, Error)]
pub enum CheckError {
    // ── Connectivity ──────────────────────────────────────────────────────
    /// The transport could not reach the configured host/port.
    #[error("Cannot connect to server at '{url}': {reason}\nIs the reader service running?")]
    Unreachable { url: String, reason: String },

    /// The request did not complete within its timeout.
    #[error("Request to '{url}' timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    // ── Local input ───────────────────────────────────────────────────────
    /// Input document was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the input document.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Reading the input document failed for another reason.
    #[error("Failed to read input file '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Server responses ──────────────────────────────────────────────────
    /// The server answered, but not with the expected status.
    #[error("Server returned HTTP {status}: {body}")]
    BadStatus { status: u16, body: String },

    /// The response body could not be decoded as the endpoint promises.
    #[error("Could not decode response from '{url}': {detail}")]
    Decode { url: String, detail: String },

    // ── Output ────────────────────────────────────────────────────────────
    /// Could not create or write the converted document.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output file is missing or has the wrong size after writing.
    #[error("Output file '{path}' failed verification: expected {expected} bytes, found {found:?}")]
    OutputVerifyFailed {
        path: PathBuf,
        expected: u64,
        found: Option<u64>,
    },

    // ── Config ────────────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected transport or runtime error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Closed classification of check failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Server could not be reached or did not answer in time.
    Connectivity,
    /// The local input document does not exist or cannot be opened.
    NotFound,
    /// The server answered with an unexpected HTTP status.
    BadStatus,
    /// The response body did not match the endpoint's contract.
    Decode,
    /// Local I/O on the input or output file failed.
    Io,
    /// The check could not run because of invalid configuration.
    Config,
    /// Unexpected runtime failure outside the categories above.
    Internal,
}

impl CheckError {
    /// Map this error onto the closed [`FailureKind`] taxonomy.
    pub fn kind(&self) -> FailureKind {
        match self {
            CheckError::Unreachable { .. } | CheckError::Timeout { .. } => {
                FailureKind::Connectivity
            }
            CheckError::FileNotFound { .. } | CheckError::PermissionDenied { .. } => {
                FailureKind::NotFound
            }
            CheckError::BadStatus { .. } => FailureKind::BadStatus,
            CheckError::Decode { .. } => FailureKind::Decode,
            CheckError::InputReadFailed { .. }
            | CheckError::OutputWriteFailed { .. }
            | CheckError::OutputVerifyFailed { .. } => FailureKind::Io,
            CheckError::InvalidConfig(_) | CheckError::ClientBuild(_) => FailureKind::Config,
            CheckError::Internal(_) => FailureKind::Internal,
        }
    }

    /// Classify a transport error raised while sending a request to `url`.
    pub(crate) fn from_transport(url: &str, err: reqwest::Error, timeout_secs: Option<u64>) -> Self {
        if err.is_timeout() {
            return CheckError::Timeout {
                url: url.to_string(),
                secs: timeout_secs.unwrap_or(0),
            };
        }
        if err.is_body() || err.is_decode() {
            return CheckError::Decode {
                url: url.to_string(),
                detail: err.to_string(),
            };
        }
        if err.is_connect() || err.is_request() {
            return CheckError::Unreachable {
                url: url.to_string(),
                reason: err.to_string(),
            };
        }
        CheckError::Internal(err.to_string())
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FailureKind::Connectivity => "connectivity",
            FailureKind::NotFound => "not-found",
            FailureKind::BadStatus => "bad-status",
            FailureKind::Decode => "decode-error",
            FailureKind::Io => "io",
            FailureKind::Config => "config",
            FailureKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_status_display_includes_body() {
        let e = CheckError::BadStatus {
            status: 500,
            body: "처리 중 오류 발생: boom".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("500"), "got: {msg}");
        assert!(msg.contains("boom"), "got: {msg}");
        assert_eq!(e.kind(), FailureKind::BadStatus);
    }

    #[test]
    fn unreachable_and_timeout_are_connectivity() {
        let e = CheckError::Unreachable {
            url: "http://localhost:1".into(),
            reason: "connection refused".into(),
        };
        assert_eq!(e.kind(), FailureKind::Connectivity);
        assert!(e.to_string().contains("localhost:1"));

        let t = CheckError::Timeout {
            url: "http://localhost:1".into(),
            secs: 3,
        };
        assert_eq!(t.kind(), FailureKind::Connectivity);
        assert!(t.to_string().contains("3s"));
    }

    #[test]
    fn missing_input_is_not_found() {
        let e = CheckError::FileNotFound {
            path: PathBuf::from("/nope/doc.hwp"),
        };
        assert_eq!(e.kind(), FailureKind::NotFound);
        assert!(e.to_string().contains("/nope/doc.hwp"));
    }

    #[test]
    fn output_verify_failed_is_io() {
        let e = CheckError::OutputVerifyFailed {
            path: PathBuf::from("out.hwpx"),
            expected: 10,
            found: Some(3),
        };
        assert_eq!(e.kind(), FailureKind::Io);
    }

    #[test]
    fn client_build_is_config_and_internal_is_its_own_kind() {
        let e = CheckError::ClientBuild("no TLS backend".into());
        assert_eq!(e.kind(), FailureKind::Config);
        assert!(e.to_string().contains("no TLS backend"));

        let i = CheckError::Internal("runtime gone".into());
        assert_eq!(i.kind(), FailureKind::Internal);
        assert_eq!(FailureKind::Internal.to_string(), "internal");
    }

    #[test]
    fn failure_kind_serialises_snake_case() {
        let json = serde_json::to_string(&FailureKind::BadStatus).unwrap();
        assert_eq!(json, "\"bad_status\"");
        assert_eq!(FailureKind::Decode.to_string(), "decode-error");
    }
}
