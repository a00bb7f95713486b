//! Bundle file loading

use std::path::Path;

use serde_json::Value;

use super::{
    Bundle,
    BundleError,
};

/// Normalize a locale code (lowercase and replace - with _)
#[must_use]
pub fn normalize_locale_code(code: &str) -> String {
    code.to_lowercase().replace('-', "_")
}

/// Derive the locale code from a bundle file path.
///
/// The file stem is the locale, as in `locales/en.json` → `en` or
/// `locales/pt-BR.json` → `pt-BR`. Matching against manifest locales should
/// go through [`normalize_locale_code`] on both sides.
#[must_use]
pub fn locale_for_path(file_path: &Path) -> Option<String> {
    file_path.file_stem().map(|stem| stem.to_string_lossy().to_string())
}

/// Load one locale bundle into memory.
///
/// No schema validation is performed; the only structural requirement is a
/// JSON object at the root.
///
/// # Errors
/// - [`BundleError::NotFound`] when the file does not exist
/// - [`BundleError::Parse`] when the file is not valid JSON
/// - [`BundleError::NotAnObject`] when the document root is not an object
pub fn load_bundle(path: &Path) -> Result<Bundle, BundleError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            BundleError::NotFound(path.to_path_buf())
        } else {
            BundleError::Io { path: path.to_path_buf(), source }
        }
    })?;

    let json: Value = serde_json::from_str(&content)
        .map_err(|source| BundleError::Parse { path: path.to_path_buf(), source })?;

    let Value::Object(doc) = json else {
        return Err(BundleError::NotAnObject(path.to_path_buf()));
    };

    tracing::debug!(path = %path.display(), keys = doc.len(), "Loaded bundle");

    Ok(Bundle::new(path.to_path_buf(), doc))
}
