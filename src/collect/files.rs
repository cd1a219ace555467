use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

/// One file submitted to the pipeline. Ephemeral, scoped to a single run.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    /// Declared MIME type (sniffed from content for CLI-read files).
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Read a file from disk, sniffing the declared type from its content.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = infer::get(&bytes)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        debug!(filename = %filename, content_type = %content_type, size = bytes.len(), "Read upload from disk");
        Ok(Self {
            filename,
            content_type,
            bytes,
        })
    }
}

/// Metadata-only view of an uploaded file. No content interpretation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileMeta {
    pub filename: String,
    pub content_type: String,
    pub size: usize,
    pub sha256: String,
}

pub fn collect_file_metadata(files: &[UploadedFile]) -> Vec<FileMeta> {
    files
        .iter()
        .map(|file| FileMeta {
            filename: file.filename.clone(),
            content_type: file.content_type.clone(),
            size: file.bytes.len(),
            sha256: hex::encode(Sha256::digest(&file.bytes)),
        })
        .collect()
}
