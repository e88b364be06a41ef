//! Upload preparation: turn a local document path into multipart-ready bytes.
//!
//! Each check calls [`load_upload`] on its own, so the extraction and
//! conversion checks never share a file handle or buffer.

use crate::error::CheckError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Content type declared on the multipart `file` part.
pub const UPLOAD_CONTENT_TYPE: &str = "application/octet-stream";

/// Multipart field name the service reads the document from.
pub const UPLOAD_FIELD: &str = "file";

/// Extensions the reader service accepts.
const SUPPORTED_EXTENSIONS: [&str; 2] = ["hwp", "hwpx"];

/// A local document read into memory, ready to be sent.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Where the bytes came from.
    pub path: PathBuf,
    /// Filename sent in the multipart part (the final path component).
    pub filename: String,
    /// Raw document bytes.
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Build the multipart form the reader endpoints expect.
    pub fn to_form(&self) -> Result<reqwest::multipart::Form, CheckError> {
        let part = reqwest::multipart::Part::bytes(self.bytes.clone())
            .file_name(self.filename.clone())
            .mime_str(UPLOAD_CONTENT_TYPE)
            .map_err(|e| CheckError::Internal(format!("invalid upload content type: {e}")))?;
        Ok(reqwest::multipart::Form::new().part(UPLOAD_FIELD, part))
    }
}

/// Read the document at `path`.
///
/// A missing file maps to [`CheckError::FileNotFound`] so the caller can
/// report it as its own failure kind rather than a generic I/O error.
pub async fn load_upload(path: &Path) -> Result<UploadFile, CheckError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => CheckError::FileNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => CheckError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => CheckError::InputReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let filename = upload_filename(path);
    if !has_supported_extension(&filename) {
        warn!(
            "'{}' does not end in .hwp or .hwpx; the server is likely to reject it",
            filename
        );
    }

    debug!("Loaded {} bytes from {}", bytes.len(), path.display());
    Ok(UploadFile {
        path: path.to_path_buf(),
        filename,
        bytes,
    })
}

/// Filename sent to the server: the last path component, or a fallback.
pub fn upload_filename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "document.hwp".to_string())
}

/// Whether the service would accept this filename's extension (case-insensitive).
pub fn has_supported_extension(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => SUPPORTED_EXTENSIONS
            .iter()
            .any(|s| ext.eq_ignore_ascii_case(s)),
        None => false,
    }
}
