//! The individual conformance checks.
//!
//! Each function is independently invocable and never returns `Err`:
//! failures are caught here and turned into a failed outcome carrying a
//! [`crate::error::FailureKind`]. Each upload check reads the source file on
//! its own.

use crate::client::ReaderClient;
use crate::config::CheckConfig;
use crate::error::CheckError;
use crate::format::{byte_size, preview};
use crate::report::{CheckName, CheckOutcome, ProbeOutcome};
use crate::upload::load_upload;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Status codes that count as a healthy answer to the GET probe.
///
/// The extraction endpoint only accepts POST, so 405 proves liveness too.
pub const PROBE_OK_STATUSES: [u16; 2] = [200, 405];

/// Check that something is listening at the configured base URL.
///
/// Any HTTP answer counts as reachable; statuses outside
/// [`PROBE_OK_STATUSES`] are flagged `lenient`.
pub async fn health_probe(client: &ReaderClient) -> ProbeOutcome {
    let start = Instant::now();
    let result = client.probe().await;
    let duration_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(status) if PROBE_OK_STATUSES.contains(&status) => {
            info!("Server answered probe with HTTP {}", status);
            ProbeOutcome {
                reachable: true,
                status: Some(status),
                lenient: false,
                message: format!("server responded (HTTP {status})"),
                failure: None,
                duration_ms,
            }
        }
        Ok(status) => {
            warn!("Server answered probe with unexpected HTTP {}", status);
            ProbeOutcome {
                reachable: true,
                status: Some(status),
                lenient: true,
                message: format!("server responded with unexpected HTTP {status}"),
                failure: None,
                duration_ms,
            }
        }
        Err(e) => {
            warn!("Health probe failed: {}", e);
            ProbeOutcome {
                reachable: false,
                status: None,
                lenient: false,
                message: e.to_string(),
                failure: Some(e.kind()),
                duration_ms,
            }
        }
    }
}

/// Upload `input` to the extraction endpoint and validate the JSON answer.
pub async fn extract_check(
    client: &ReaderClient,
    input: &Path,
    preview_chars: usize,
) -> CheckOutcome {
    let start = Instant::now();
    let outcome = match try_extract(client, input).await {
        Ok((status, service_status, document)) => {
            let p = preview(&document, preview_chars);
            info!("Extracted {} characters from {}", p.total_chars, input.display());
            let mut o = CheckOutcome::pass(
                CheckName::Extract,
                Some(status),
                format!(
                    "extracted {} characters (service status: {})",
                    p.total_chars,
                    service_status.as_deref().unwrap_or("n/a")
                ),
            );
            o.size = Some(p.total_chars as u64);
            o.preview = Some(p.text);
            o.preview_truncated = p.truncated;
            o
        }
        Err(e) => {
            warn!("Extraction check failed: {}", e);
            CheckOutcome::fail(CheckName::Extract, &e)
        }
    };
    outcome.with_duration(start.elapsed().as_millis() as u64)
}

/// Upload `input` to the conversion endpoint and save the returned bytes to `output`.
pub async fn convert_check(client: &ReaderClient, input: &Path, output: &Path) -> CheckOutcome {
    let start = Instant::now();
    let outcome = match try_convert(client, input, output).await {
        Ok((status, written)) => {
            info!("Converted document saved to {} ({})", output.display(), byte_size(written));
            let mut o = CheckOutcome::pass(
                CheckName::Convert,
                Some(status),
                format!("converted document saved: {}", byte_size(written)),
            );
            o.size = Some(written);
            o.output_path = Some(output.to_path_buf());
            o
        }
        Err(e) => {
            warn!("Conversion check failed: {}", e);
            CheckOutcome::fail(CheckName::Convert, &e)
        }
    };
    outcome.with_duration(start.elapsed().as_millis() as u64)
}

/// Run the extraction twice and require identical text both times.
pub async fn idempotence_check(client: &ReaderClient, input: &Path) -> CheckOutcome {
    let start = Instant::now();
    let outcome = match try_idempotent(client, input).await {
        Ok((status, chars)) => {
            let mut o = CheckOutcome::pass(
                CheckName::Idempotence,
                Some(status),
                format!("two extractions returned identical text ({chars} characters)"),
            );
            o.size = Some(chars as u64);
            o
        }
        Err(e) => {
            warn!("Idempotence check failed: {}", e);
            CheckOutcome::fail(CheckName::Idempotence, &e)
        }
    };
    outcome.with_duration(start.elapsed().as_millis() as u64)
}

/// Convenience wrapper building a client from `config` for one-off checks.
pub async fn extract_check_with(config: &CheckConfig) -> CheckOutcome {
    match ReaderClient::new(config) {
        Ok(client) => extract_check(&client, &config.input, config.preview_chars).await,
        Err(e) => CheckOutcome::fail(CheckName::Extract, &e),
    }
}

/// Convenience wrapper building a client from `config` for one-off checks.
pub async fn convert_check_with(config: &CheckConfig) -> CheckOutcome {
    match ReaderClient::new(config) {
        Ok(client) => convert_check(&client, &config.input, &config.output).await,
        Err(e) => CheckOutcome::fail(CheckName::Convert, &e),
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn try_extract(
    client: &ReaderClient,
    input: &Path,
) -> Result<(u16, Option<String>, String), CheckError> {
    let upload = load_upload(input).await?;
    let (status, body) = client.extract(&upload).await?;
    Ok((status, body.status, body.document))
}

async fn try_convert(
    client: &ReaderClient,
    input: &Path,
    output: &Path,
) -> Result<(u16, u64), CheckError> {
    let upload = load_upload(input).await?;
    let (status, bytes) = client.convert(&upload).await?;
    let written = write_output(output, bytes).await?;
    Ok((status, written))
}

async fn try_idempotent(client: &ReaderClient, input: &Path) -> Result<(u16, usize), CheckError> {
    let (_, _, first) = try_extract(client, input).await?;
    let (status, _, second) = try_extract(client, input).await?;
    if first != second {
        return Err(CheckError::Decode {
            url: client.extract_url().to_string(),
            detail: format!(
                "repeated extraction differs ({} vs {} characters)",
                first.chars().count(),
                second.chars().count()
            ),
        });
    }
    Ok((status, first.chars().count()))
}

/// Write `bytes` to `path` atomically and verify the result on disk.
///
/// The body goes into a temp file next to the destination and is then
/// renamed into place, so a failed write never leaves a truncated document.
async fn write_output(path: &Path, bytes: Vec<u8>) -> Result<u64, CheckError> {
    let expected = bytes.len() as u64;
    let target = path.to_path_buf();

    tokio::task::spawn_blocking(move || persist_atomically(&target, &bytes))
        .await
        .map_err(|e| CheckError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: std::io::Error::other(format!("writer task failed: {e}")),
        })??;

    let found = tokio::fs::metadata(path).await.ok().map(|m| m.len());
    if found != Some(expected) {
        return Err(CheckError::OutputVerifyFailed {
            path: path.to_path_buf(),
            expected,
            found,
        });
    }
    Ok(expected)
}

fn persist_atomically(path: &Path, bytes: &[u8]) -> Result<(), CheckError> {
    use std::io::Write;

    let write_err = |source: std::io::Error| CheckError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    #[tokio::test]
    async fn write_output_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.hwpx");
        let written = write_output(&path, vec![1, 2, 3, 4]).await.unwrap();
        assert_eq!(written, 4);
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn write_output_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.hwpx");
        std::fs::write(&path, vec![0u8; 100]).unwrap();
        write_output(&path, vec![9, 9]).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![9, 9]);
    }

    #[tokio::test]
    async fn write_output_onto_directory_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("taken");
        std::fs::create_dir(&target).unwrap();

        let err = write_output(&target, vec![1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, CheckError::OutputWriteFailed { .. }), "got: {err}");
        assert_eq!(err.kind(), FailureKind::Io);
        assert!(target.is_dir());
    }

    #[tokio::test]
    async fn extract_check_reports_missing_input_without_network() {
        let config = CheckConfig::builder()
            .base_url("http://127.0.0.1:9")
            .input("/definitely/not/here.hwp")
            .build()
            .unwrap();
        let outcome = extract_check_with(&config).await;
        assert!(!outcome.passed);
        assert_eq!(outcome.failure, Some(FailureKind::NotFound));
    }
}
