//! NF-007: Document files — load, save (atomic).

use super::error::{Error, Result};
use super::types::AggregatedDocument;
use std::path::{Path, PathBuf};

/// Temp path used while writing `path`.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Load a Terraform JSON document from disk.
pub fn load_document(path: &Path) -> Result<AggregatedDocument> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::fs(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

/// Write `contents` to `path` atomically (temp file, then rename), creating
/// the parent directory if needed. An existing file is replaced.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::fs(parent, e))?;
    }

    let tmp = temp_path(path);
    if let Err(e) = std::fs::write(&tmp, contents) {
        let _ = std::fs::remove_file(&tmp);
        return Err(Error::fs(&tmp, e));
    }
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(Error::fs(path, e));
    }
    Ok(())
}

/// Serialize a document and save it atomically. Returns the bytes written.
pub fn save_document(path: &Path, doc: &AggregatedDocument) -> Result<String> {
    let json = doc.to_pretty_json()?;
    write_atomic(path, &json)?;
    log::debug!("wrote {} bytes to {}", json.len(), path.display());
    Ok(json)
}
