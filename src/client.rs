//! HTTP transport for the reader service.
//!
//! [`ReaderClient`] knows the three requests a conformance run makes and
//! nothing about pass/fail policy; that lives in [`crate::checks`]. Every
//! method performs exactly one request. There is no retry layer.

use crate::config::CheckConfig;
use crate::error::CheckError;
use crate::upload::UploadFile;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// JSON body returned by a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractResponse {
    /// Service-defined status string.
    #[serde(default)]
    pub status: Option<String>,
    /// Extracted plain text.
    pub document: String,
}

/// A response whose status the caller still has to judge.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Body as text, lossily decoded; used for error details.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Thin wrapper around a `reqwest::Client` pointed at one reader service.
#[derive(Debug, Clone)]
pub struct ReaderClient {
    http: reqwest::Client,
    extract_url: String,
    convert_url: String,
    probe_timeout: Duration,
    request_timeout: Option<Duration>,
}

impl ReaderClient {
    /// Build a client from the run configuration.
    pub fn new(config: &CheckConfig) -> Result<Self, CheckError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("hwpcheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CheckError::ClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            extract_url: config.extract_url(),
            convert_url: config.convert_url(),
            probe_timeout: config.probe_timeout(),
            request_timeout: config.request_timeout(),
        })
    }

    pub fn extract_url(&self) -> &str {
        &self.extract_url
    }

    pub fn convert_url(&self) -> &str {
        &self.convert_url
    }

    /// GET the extraction endpoint with the short probe timeout.
    ///
    /// Returns the status code of whatever answered. Only transport-level
    /// failures are errors here.
    pub async fn probe(&self) -> Result<u16, CheckError> {
        debug!("Probing {}", self.extract_url);
        let response = self
            .http
            .get(&self.extract_url)
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| {
                CheckError::from_transport(
                    &self.extract_url,
                    e,
                    Some(self.probe_timeout.as_secs()),
                )
            })?;
        Ok(response.status().as_u16())
    }

    /// POST `upload` to the extraction endpoint and decode the JSON body.
    pub async fn extract(&self, upload: &UploadFile) -> Result<(u16, ExtractResponse), CheckError> {
        let raw = self.post_upload(&self.extract_url, upload).await?;
        if raw.status != 200 {
            return Err(CheckError::BadStatus {
                status: raw.status,
                body: raw.text(),
            });
        }
        let parsed =
            serde_json::from_slice::<ExtractResponse>(&raw.body).map_err(|e| CheckError::Decode {
                url: self.extract_url.clone(),
                detail: e.to_string(),
            })?;
        Ok((raw.status, parsed))
    }

    /// POST `upload` to the conversion endpoint and return the opaque body.
    pub async fn convert(&self, upload: &UploadFile) -> Result<(u16, Vec<u8>), CheckError> {
        let raw = self.post_upload(&self.convert_url, upload).await?;
        if raw.status != 200 {
            return Err(CheckError::BadStatus {
                status: raw.status,
                body: raw.text(),
            });
        }
        Ok((raw.status, raw.body))
    }

    /// Send one multipart upload and collect the full body.
    async fn post_upload(&self, url: &str, upload: &UploadFile) -> Result<RawResponse, CheckError> {
        debug!(
            "POST {} ({} bytes as '{}')",
            url,
            upload.len(),
            upload.filename
        );
        let mut request = self.http.post(url).multipart(upload.to_form()?);
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }
        let timeout_secs = self.request_timeout.map(|t| t.as_secs());

        let response = request
            .send()
            .await
            .map_err(|e| CheckError::from_transport(url, e, timeout_secs))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| CheckError::from_transport(url, e, timeout_secs))?;

        debug!("{} answered HTTP {} with {} bytes", url, status, body.len());
        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}
