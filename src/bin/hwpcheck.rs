//! CLI binary for hwp-reader-check.
//!
//! A thin shim over the library crate that maps CLI flags to `CheckConfig`,
//! runs the suite and prints the results.

use anyhow::{Context, Result};
use clap::Parser;
use hwp_reader_check::format::byte_size;
use hwp_reader_check::{
    run_suite_with_progress, CheckConfig, CheckName, CheckOutcome, CheckSelection, ProbeOutcome,
    ProgressCallback, SuiteProgressCallback, SuiteReport,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal callback: a spinner while each request is in flight and one
/// result block per finished check.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        Arc::new(Self { bar })
    }
}

impl SuiteProgressCallback for CliProgressCallback {
    fn on_suite_start(&self, base_url: &str) {
        self.bar.println(format!("{} {}", bold("HWP Reader API check"), dim(base_url)));
    }

    fn on_check_start(&self, name: CheckName) {
        self.bar.set_prefix(name.label());
        self.bar.set_message("waiting for server…");
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_probe_complete(&self, outcome: &ProbeOutcome) {
        self.bar.disable_steady_tick();
        self.bar.set_message("");
        self.bar.println(probe_block(outcome));
    }

    fn on_check_complete(&self, outcome: &CheckOutcome) {
        self.bar.disable_steady_tick();
        self.bar.set_message("");
        self.bar.println(check_block(outcome));
    }

    fn on_suite_complete(&self, _report: &SuiteReport) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Check a local server with the bundled sample
  hwpcheck

  # Another server and document
  hwpcheck --server http://reader.internal:8500 report.hwpx -o converted.hwpx

  # Only the text extraction, and verify it is repeatable
  hwpcheck --only extract --verify-idempotent document.hwp

  # Machine-readable result for CI
  hwpcheck --json document.hwp > report.json

EXIT CODES:
  0  every check passed
  1  the server answered but at least one check failed
  2  the server could not be reached (remaining checks skipped)

ENVIRONMENT VARIABLES:
  HWPCHECK_SERVER            Base URL of the reader service
  HWPCHECK_INPUT             Document to upload
  HWPCHECK_OUTPUT            Where to save the converted HWPX
  RUST_LOG                   Overrides the log filter (e.g. hwp_reader_check=debug)
"#;

/// Conformance checks for the HWP Reader document service.
#[derive(Parser, Debug)]
#[command(
    name = "hwpcheck",
    version,
    about = "Conformance checks for the HWP Reader document service",
    long_about = "Probe a running HWP Reader service, upload a .hwp/.hwpx document to its text \
extraction and HWPX conversion endpoints, and report a pass/fail verdict per check.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local .hwp or .hwpx document to upload.
    #[arg(env = "HWPCHECK_INPUT", default_value = "test_data/changing-image.hwp")]
    input: PathBuf,

    /// Where to save the converted HWPX document.
    #[arg(short, long, env = "HWPCHECK_OUTPUT", default_value = "output.hwpx")]
    output: PathBuf,

    /// Base URL of the reader service.
    #[arg(long, env = "HWPCHECK_SERVER", default_value = "http://localhost:8500")]
    server: String,

    /// Health-probe timeout in seconds.
    #[arg(long, env = "HWPCHECK_PROBE_TIMEOUT", default_value_t = 3,
          value_parser = clap::value_parser!(u64).range(1..))]
    probe_timeout: u64,

    /// Upload request timeout in seconds (default: none).
    #[arg(long, env = "HWPCHECK_REQUEST_TIMEOUT",
          value_parser = clap::value_parser!(u64).range(1..))]
    request_timeout: Option<u64>,

    /// Characters of extracted text to show.
    #[arg(long, env = "HWPCHECK_PREVIEW_CHARS", default_value_t = 500)]
    preview_chars: usize,

    /// Run the extraction twice and require identical text.
    #[arg(long, env = "HWPCHECK_VERIFY_IDEMPOTENT")]
    verify_idempotent: bool,

    /// Run only one check after the probe. With `probe`, the run passes
    /// only when the server answers 200 or 405.
    #[arg(long, value_enum, default_value = "all")]
    only: OnlyArg,

    /// Print the full report as JSON on stdout.
    #[arg(long, env = "HWPCHECK_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "HWPCHECK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the exit code.
    #[arg(short, long, env = "HWPCHECK_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OnlyArg {
    All,
    Probe,
    Extract,
    Convert,
}

impl From<OnlyArg> for CheckSelection {
    fn from(v: OnlyArg) -> Self {
        match v {
            OnlyArg::All => CheckSelection::All,
            OnlyArg::Probe => CheckSelection::Probe,
            OnlyArg::Extract => CheckSelection::Extract,
            OnlyArg::Convert => CheckSelection::Convert,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The check blocks already say what happened; library INFO logs would
    // only repeat them, so the default is warnings and above.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    let show_progress = !cli.quiet && !cli.json;
    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as ProgressCallback)
    } else {
        None
    };

    let report = run_suite_with_progress(&config, progress)
        .await
        .context("Could not start the conformance run")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        eprintln!("{}", summary_block(&report));
    }

    Ok(ExitCode::from(report.exit_code() as u8))
}

/// Map CLI args to `CheckConfig`.
fn build_config(cli: &Cli) -> Result<CheckConfig> {
    CheckConfig::builder()
        .base_url(cli.server.clone())
        .input(cli.input.clone())
        .output(cli.output.clone())
        .probe_timeout_secs(cli.probe_timeout)
        .request_timeout_secs(cli.request_timeout)
        .preview_chars(cli.preview_chars)
        .verify_idempotent(cli.verify_idempotent)
        .selection(cli.only.into())
        .build()
        .context("Invalid configuration")
}

// ── Rendering ────────────────────────────────────────────────────────────────

fn probe_block(p: &ProbeOutcome) -> String {
    let mark = if !p.reachable {
        red("✗")
    } else if p.lenient {
        yellow("⚠")
    } else {
        green("✓")
    };
    format!(
        "{}\n{}\n{} {}  {}",
        RULE,
        bold(CheckName::HealthProbe.label()),
        mark,
        p.message,
        dim(&format!("{}ms", p.duration_ms))
    )
}

fn check_block(o: &CheckOutcome) -> String {
    let mut out = format!("{}\n{}\n", RULE, bold(o.name.label()));
    if let Some(status) = o.status {
        out.push_str(&format!("  status code: {status}\n"));
    }
    if o.passed {
        out.push_str(&format!("{} {}", green("✓"), o.message));
    } else {
        let kind = o.failure.map(|k| format!("[{k}] ")).unwrap_or_default();
        out.push_str(&format!("{} {}{}", red("✗"), dim(&kind), o.message));
    }
    if let Some(ref preview) = o.preview {
        out.push_str(&format!("\n{THIN_RULE}\n{preview}"));
        if o.preview_truncated {
            if let Some(total) = o.size {
                out.push_str(&format!("\n\n… ({total} characters total)"));
            }
        }
        out.push_str(&format!("\n{THIN_RULE}"));
    }
    if let Some(ref path) = o.output_path {
        out.push_str(&format!("\n  saved to: {}", path.display()));
    }
    out.push_str(&format!("  {}", dim(&format!("{}ms", o.duration_ms))));
    out
}

fn summary_block(r: &SuiteReport) -> String {
    let mut out = format!("\n{}\n{}\n{}\n", RULE, bold("Summary"), RULE);
    if r.aborted {
        out.push_str(&format!(
            "{} server at {} is not reachable; remaining checks skipped\n",
            red("✘"),
            r.base_url
        ));
        return out;
    }
    for check in r.checks() {
        let verdict = if check.passed { green("pass") } else { red("FAIL") };
        let size = match (check.name, check.size) {
            (CheckName::Convert, Some(n)) => format!("  {}", dim(&byte_size(n))),
            (_, Some(n)) => format!("  {}", dim(&format!("{n} chars"))),
            _ => String::new(),
        };
        out.push_str(&format!("{:<24} {}{}\n", check.name.label(), verdict, size));
    }
    out.push_str(RULE);
    out.push('\n');
    if r.passed {
        out.push_str(&format!("{} all checks passed", green("✔")));
    } else {
        out.push_str(&format!("{} some checks failed", yellow("⚠")));
    }
    out
}
