//! # hwp-reader-check
//!
//! Conformance-test client for the HWP Reader document service.
//!
//! The service exposes two upload endpoints: one that extracts plain text
//! from a `.hwp`/`.hwpx` document and one that re-encodes it as HWPX. This
//! crate drives both against a running server and returns a structured
//! verdict instead of console noise, so it works equally well from a
//! terminal (`hwpcheck`) and from CI or other Rust code.
//!
//! ## Run Overview
//!
//! ```text
//! base URL
//!  │
//!  ├─ 1. Probe     GET  /api/reader/extract   (200 or 405 = alive, 3 s timeout)
//!  │               └─ unreachable → abort, exit 2
//!  ├─ 2. Extract   POST /api/reader/extract   multipart `file` → JSON {status, document}
//!  ├─ 3. Convert   POST /api/reader/content   multipart `file` → HWPX bytes → output file
//!  ├─ 4. (opt.)    extract twice, compare text
//!  └─ 5. Verdict   pass iff every check that ran passed
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hwp_reader_check::{run_suite, CheckConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CheckConfig::builder()
//!         .base_url("http://localhost:8500")
//!         .input("test_data/changing-image.hwp")
//!         .output("output.hwpx")
//!         .build()?;
//!     let report = run_suite(&config).await?;
//!     for check in report.checks() {
//!         println!("{}: {}", check.name, if check.passed { "ok" } else { "FAILED" });
//!     }
//!     std::process::exit(report.exit_code());
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `hwpcheck` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod checks;
pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod progress;
pub mod report;
pub mod suite;
pub mod upload;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use checks::{
    convert_check, convert_check_with, extract_check, extract_check_with, health_probe,
    idempotence_check,
};
pub use client::{ExtractResponse, ReaderClient};
pub use config::{CheckConfig, CheckConfigBuilder, CheckSelection};
pub use error::{CheckError, FailureKind};
pub use progress::{NoopProgressCallback, ProgressCallback, SuiteProgressCallback};
pub use report::{CheckName, CheckOutcome, ProbeOutcome, SuiteReport};
pub use suite::{run_suite, run_suite_sync, run_suite_with_progress};
pub use upload::{load_upload, UploadFile};
