//! Reading policy exports from disk
//!
//! Both export files are JSON arrays. The raw bytes are hashed before
//! decoding so a report can name the exact snapshot it was produced from.

use crate::core::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::info;

/// One export file read into memory.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub path: PathBuf,
    /// Lowercase hex SHA-256 of the file contents
    pub sha256: String,
    pub records: Vec<serde_json::Value>,
}

/// Reads `path` and decodes it as a JSON array of records.
///
/// `what` names the export in error messages ("Object", "ACL").
///
/// # Errors
///
/// - [`Error::ReadExport`] if the file cannot be read
/// - [`Error::Serialization`] if it is not valid JSON
/// - [`Error::NotAnArray`] if the top-level value is not an array
pub fn read_export(path: &Path, what: &'static str) -> Result<ExportFile> {
    let bytes = std::fs::read(path).map_err(|source| Error::ReadExport {
        what,
        path: path.display().to_string(),
        source,
    })?;
    let sha256 = digest(&bytes);

    let value: serde_json::Value = serde_json::from_slice(&bytes)?;
    let serde_json::Value::Array(records) = value else {
        return Err(Error::NotAnArray { what });
    };

    info!(
        "Read {} {} records from {} (sha256 {})",
        records.len(),
        what,
        path.display(),
        sha256
    );

    Ok(ExportFile {
        path: path.to_path_buf(),
        sha256,
        records,
    })
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
