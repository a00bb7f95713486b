//! Bundle file writing
//!
//! Serialization is deterministic: keys in construction order, 2-space
//! indentation, non-ASCII characters emitted literally, trailing newline.
//! The file is replaced via a temporary file in the same directory and an
//! atomic rename, so a failed write leaves the original untouched.

use std::io::Write as _;
use std::path::Path;

use serde_json::{
    Map,
    Value,
};
use tempfile::NamedTempFile;

use super::{
    Bundle,
    BundleError,
};

/// Render a bundle document in the fixed output style.
fn to_json_string(doc: &Map<String, Value>, path: &Path) -> Result<String, BundleError> {
    // serde_json pretty printing is 2-space indented and leaves non-ASCII
    // characters unescaped, matching the required style.
    let mut text = serde_json::to_string_pretty(doc).map_err(|source| BundleError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::other(source),
    })?;
    text.push('\n');
    Ok(text)
}

/// Overwrite the bundle's file with its current in-memory tree.
///
/// # Errors
/// - [`BundleError::Io`] on temp-file creation, write, or rename failure;
///   the temporary file is cleaned up and the original file is untouched
pub fn write_bundle(bundle: &Bundle) -> Result<(), BundleError> {
    let path = bundle.path();
    let text = to_json_string(bundle.doc(), path)?;

    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let io_err = |source| BundleError::Io { path: path.to_path_buf(), source };

    // Temp file in the target directory keeps the rename on one filesystem.
    let mut tmp = NamedTempFile::new_in(parent).map_err(io_err)?;
    tmp.write_all(text.as_bytes()).map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    tracing::debug!(path = %path.display(), bytes = text.len(), "Wrote bundle");

    Ok(())
}
