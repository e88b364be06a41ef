//! Full conformance run: probe, then the upload checks, then a verdict.
//!
//! The probe gates everything else. If nothing answers at the base URL the
//! run stops there and the report says so (`aborted = true`). Otherwise the
//! selected checks run one after another. They share no state beyond the
//! HTTP client.

use crate::checks;
use crate::client::ReaderClient;
use crate::config::CheckConfig;
use crate::error::CheckError;
use crate::progress::ProgressCallback;
use crate::report::{CheckName, CheckOutcome, SuiteReport};
use std::future::Future;
use std::time::Instant;
use tracing::{info, warn};

/// Run every configured check against the reader service.
///
/// # Errors
/// Only a failure to build the HTTP client is returned as `Err`. Check
/// failures, including an unreachable server, are reported in the
/// [`SuiteReport`].
pub async fn run_suite(config: &CheckConfig) -> Result<SuiteReport, CheckError> {
    run_suite_with_progress(config, None).await
}

/// Same as [`run_suite`], reporting events to `progress` as it goes.
pub async fn run_suite_with_progress(
    config: &CheckConfig,
    progress: Option<ProgressCallback>,
) -> Result<SuiteReport, CheckError> {
    let total_start = Instant::now();
    let client = ReaderClient::new(config)?;
    info!(
        "Starting conformance run against {} with {}",
        config.base_url,
        config.input.display()
    );
    if let Some(ref cb) = progress {
        cb.on_suite_start(&config.base_url);
    }

    // ── Step 1: Health probe ─────────────────────────────────────────────
    if let Some(ref cb) = progress {
        cb.on_check_start(CheckName::HealthProbe);
    }
    let probe = checks::health_probe(&client).await;
    if let Some(ref cb) = progress {
        cb.on_probe_complete(&probe);
    }

    if !probe.reachable {
        warn!("Server at {} is not reachable; aborting run", config.base_url);
        let report = SuiteReport {
            base_url: config.base_url.clone(),
            input: config.input.clone(),
            probe,
            extract: None,
            convert: None,
            idempotence: None,
            aborted: true,
            passed: false,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };
        if let Some(ref cb) = progress {
            cb.on_suite_complete(&report);
        }
        return Ok(report);
    }

    // ── Step 2: Extraction ───────────────────────────────────────────────
    let extract = if config.selection.runs_extract() {
        Some(
            run_one(
                &progress,
                CheckName::Extract,
                checks::extract_check(&client, &config.input, config.preview_chars),
            )
            .await,
        )
    } else {
        None
    };

    // ── Step 3: Conversion ───────────────────────────────────────────────
    let convert = if config.selection.runs_convert() {
        Some(
            run_one(
                &progress,
                CheckName::Convert,
                checks::convert_check(&client, &config.input, &config.output),
            )
            .await,
        )
    } else {
        None
    };

    // ── Step 4: Optional idempotence ─────────────────────────────────────
    let idempotence = if config.verify_idempotent && config.selection.runs_extract() {
        Some(
            run_one(
                &progress,
                CheckName::Idempotence,
                checks::idempotence_check(&client, &config.input),
            )
            .await,
        )
    } else {
        None
    };

    // ── Step 5: Verdict ──────────────────────────────────────────────────
    // With no upload check selected the probe is the whole run, so it must
    // have answered 200 or 405 to pass.
    let ran: Vec<&CheckOutcome> = [&extract, &convert, &idempotence]
        .into_iter()
        .flatten()
        .collect();
    let passed = if ran.is_empty() {
        !probe.lenient
    } else {
        ran.iter().all(|o| o.passed)
    };

    let report = SuiteReport {
        base_url: config.base_url.clone(),
        input: config.input.clone(),
        probe,
        extract,
        convert,
        idempotence,
        aborted: false,
        passed,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conformance run {} in {}ms",
        if report.passed { "passed" } else { "failed" },
        report.total_duration_ms
    );
    if let Some(ref cb) = progress {
        cb.on_suite_complete(&report);
    }
    Ok(report)
}

/// Blocking wrapper around [`run_suite`].
///
/// Creates a temporary tokio runtime internally.
pub fn run_suite_sync(config: &CheckConfig) -> Result<SuiteReport, CheckError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CheckError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(run_suite(config))
}

/// Await one check, bracketing it with progress events.
///
/// `check` is a not-yet-polled future, so no request is sent before
/// `on_check_start` fires.
async fn run_one(
    progress: &Option<ProgressCallback>,
    name: CheckName,
    check: impl Future<Output = CheckOutcome>,
) -> CheckOutcome {
    if let Some(ref cb) = progress {
        cb.on_check_start(name);
    }
    let outcome = check.await;
    if let Some(ref cb) = progress {
        cb.on_check_complete(&outcome);
    }
    outcome
}
