//! Patch manifest loading

use std::path::{
    Path,
    PathBuf,
};

use super::{
    ManifestError,
    PatchManifest,
};

/// Well-known manifest file name looked up when no path is given.
pub const MANIFEST_FILE_NAME: &str = ".locale-patch.json";

/// Look for a `.locale-patch.json` manifest in a root directory.
///
/// Returns `None` when the file does not exist; whether that is an error is
/// the caller's decision.
#[must_use]
pub fn discover_manifest(root: &Path) -> Option<PathBuf> {
    let manifest_path = root.join(MANIFEST_FILE_NAME);

    if manifest_path.exists() {
        tracing::debug!("Found patch manifest: {:?}", manifest_path);
        Some(manifest_path)
    } else {
        tracing::debug!("Patch manifest not found: {:?}", manifest_path);
        None
    }
}

/// Load and validate a patch manifest.
///
/// # Errors
/// - File read error
/// - JSON parse error
/// - Validation error (all problems collected, with field paths)
pub fn load_manifest(path: &Path) -> Result<PatchManifest, ManifestError> {
    tracing::debug!("Loading patch manifest from: {:?}", path);

    let content = std::fs::read_to_string(path)?;
    let manifest: PatchManifest = serde_json::from_str(&content)?;

    manifest.validate().map_err(ManifestError::ValidationErrors)?;

    Ok(manifest)
}
