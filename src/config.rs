//! Configuration for a conformance run against the reader service.
//!
//! Every knob lives in [`CheckConfig`], built via [`CheckConfigBuilder`].
//! The CLI maps flags and environment variables onto the builder; library
//! callers set only what they need and get the defaults below for the rest.

use crate::error::CheckError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Path of the text-extraction endpoint (also used for the health probe).
pub const EXTRACT_PATH: &str = "/api/reader/extract";

/// Path of the container-conversion endpoint.
pub const CONVERT_PATH: &str = "/api/reader/content";

/// Server address used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8500";

/// Configuration for a conformance run.
///
/// # Example
/// ```rust
/// use hwp_reader_check::CheckConfig;
///
/// let config = CheckConfig::builder()
///     .base_url("http://reader.internal:8500/")
///     .input("docs/sample.hwp")
///     .output("out/sample.hwpx")
///     .build()
///     .unwrap();
/// assert_eq!(config.base_url, "http://reader.internal:8500");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Base URL of the reader service, without a trailing slash.
    pub base_url: String,

    /// Local document uploaded by the extraction and conversion checks.
    pub input: PathBuf,

    /// Destination for the converted document.
    pub output: PathBuf,

    /// Timeout for the health probe in seconds. Default: 3.
    ///
    /// The probe only asks "is anything listening?", so it must fail fast.
    pub probe_timeout_secs: u64,

    /// Timeout for the upload requests in seconds. Default: none.
    ///
    /// Conversion of a large document can take a while; with `None` the
    /// request blocks until the transport itself gives up.
    pub request_timeout_secs: Option<u64>,

    /// Number of characters of extracted text kept in the report preview. Default: 500.
    pub preview_chars: usize,

    /// Run the extraction twice and require identical text. Default: false.
    pub verify_idempotent: bool,

    /// Which checks to run after the probe. Default: [`CheckSelection::All`].
    pub selection: CheckSelection,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            input: PathBuf::from("test_data").join("changing-image.hwp"),
            output: PathBuf::from("output.hwpx"),
            probe_timeout_secs: 3,
            request_timeout_secs: None,
            preview_chars: 500,
            verify_idempotent: false,
            selection: CheckSelection::default(),
        }
    }
}

impl CheckConfig {
    /// Create a new builder for `CheckConfig`.
    pub fn builder() -> CheckConfigBuilder {
        CheckConfigBuilder {
            config: Self::default(),
        }
    }

    /// Full URL of the extraction endpoint.
    pub fn extract_url(&self) -> String {
        format!("{}{}", self.base_url, EXTRACT_PATH)
    }

    /// Full URL of the conversion endpoint.
    pub fn convert_url(&self) -> String {
        format!("{}{}", self.base_url, CONVERT_PATH)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Builder for [`CheckConfig`].
#[derive(Debug)]
pub struct CheckConfigBuilder {
    config: CheckConfig,
}

impl CheckConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim().trim_end_matches('/').to_string();
        self
    }

    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.input = path.into();
        self
    }

    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output = path.into();
        self
    }

    pub fn probe_timeout_secs(mut self, secs: u64) -> Self {
        self.config.probe_timeout_secs = secs;
        self
    }

    pub fn request_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn preview_chars(mut self, n: usize) -> Self {
        self.config.preview_chars = n;
        self
    }

    pub fn verify_idempotent(mut self, v: bool) -> Self {
        self.config.verify_idempotent = v;
        self
    }

    pub fn selection(mut self, selection: CheckSelection) -> Self {
        self.config.selection = selection;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CheckConfig, CheckError> {
        let c = &self.config;
        if c.base_url.is_empty() {
            return Err(CheckError::InvalidConfig("server URL must not be empty".into()));
        }
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(CheckError::InvalidConfig(format!(
                "server URL must start with http:// or https://, got '{}'",
                c.base_url
            )));
        }
        if reqwest::Url::parse(&c.base_url).is_err() {
            return Err(CheckError::InvalidConfig(format!(
                "server URL '{}' is not a valid URL",
                c.base_url
            )));
        }
        if c.probe_timeout_secs == 0 {
            return Err(CheckError::InvalidConfig(
                "probe timeout must be ≥ 1 second".into(),
            ));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(CheckError::InvalidConfig(
                "request timeout must be ≥ 1 second when set".into(),
            ));
        }
        if c.input.as_os_str().is_empty() {
            return Err(CheckError::InvalidConfig("input path must not be empty".into()));
        }
        if c.output.as_os_str().is_empty() {
            return Err(CheckError::InvalidConfig("output path must not be empty".into()));
        }
        Ok(self.config)
    }
}

/// Which checks a run should execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckSelection {
    /// Probe, then extraction and conversion (default).
    #[default]
    All,
    /// Health probe only.
    Probe,
    /// Probe, then extraction only.
    Extract,
    /// Probe, then conversion only.
    Convert,
}

impl CheckSelection {
    pub fn runs_extract(self) -> bool {
        matches!(self, CheckSelection::All | CheckSelection::Extract)
    }

    pub fn runs_convert(self) -> bool {
        matches!(self, CheckSelection::All | CheckSelection::Convert)
    }
}
