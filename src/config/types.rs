use indexmap::IndexMap;
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;
use thiserror::Error;

use crate::patch::KEY_SEPARATOR;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Manifest error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "locales.en.setIn")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Manifest validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load patch manifest: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse patch manifest: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The externally-loaded patch data consumed by one run.
///
/// Locale iteration order is the manifest's declared order; `locales` is an
/// insertion-ordered map for that reason.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatchManifest {
    /// Directory holding the `<locale>.json` bundles, resolved against the
    /// manifest's own directory when relative.
    pub locales_dir: String,

    /// Glob matching bundle files inside `locales_dir`. Only used to warn
    /// about bundles the manifest leaves untouched.
    pub file_pattern: String,

    /// Log a failed locale and keep going instead of stopping the run.
    pub continue_on_error: bool,

    pub locales: IndexMap<String, LocalePatch>,
}

/// Patch entries for a single locale.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalePatch {
    /// Top-level assignments. The key is replaced wholesale, not deep-merged.
    pub set: IndexMap<String, Value>,

    /// Leaf assignments inside an existing object, keyed by dotted path
    /// (e.g. `nav.vr`). Every ancestor must already exist in the bundle.
    pub set_in: IndexMap<String, Value>,
}

impl PatchManifest {
    /// # Errors
    /// - `localesDir` or `filePattern` is empty
    /// - `filePattern` is not a valid glob
    /// - A locale code is empty
    /// - A `setIn` key is malformed (no parent segment, or empty segments)
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.locales_dir.is_empty() {
            errors.push(ValidationError::new(
                "localesDir",
                "The locales directory cannot be empty. Example: \"src/i18n/locales\"",
            ));
        }

        if self.file_pattern.is_empty() {
            errors.push(ValidationError::new(
                "filePattern",
                "The pattern cannot be empty. Example: \"*.json\"",
            ));
        } else if let Err(e) = globset::Glob::new(&self.file_pattern) {
            errors.push(ValidationError::new(
                "filePattern",
                format!("Invalid glob pattern '{}': {e}", self.file_pattern),
            ));
        }

        for (locale, patch) in &self.locales {
            if locale.is_empty() {
                errors.push(ValidationError::new("locales", "Locale codes cannot be empty"));
                continue;
            }

            for key in patch.set_in.keys() {
                let field_path = format!("locales.{locale}.setIn");
                if !key.contains(KEY_SEPARATOR) {
                    errors.push(ValidationError::new(
                        field_path,
                        format!(
                            "Key '{key}' names no parent object. Use `set` for top-level keys"
                        ),
                    ));
                } else if key.split(KEY_SEPARATOR).any(str::is_empty) {
                    errors.push(ValidationError::new(
                        field_path,
                        format!("Key '{key}' contains an empty segment"),
                    ));
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for PatchManifest {
    fn default() -> Self {
        Self {
            locales_dir: "locales".to_string(),
            file_pattern: "*.json".to_string(),
            continue_on_error: false,
            locales: IndexMap::new(),
        }
    }
}
