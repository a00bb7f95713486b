//! Locale bundle input/output
//!
//! A bundle is one locale's JSON translation document. The in-memory tree
//! keeps key insertion order (`serde_json` with `preserve_order`), so a
//! load/write cycle never reorders existing keys.
mod loader;
mod writer;

use std::collections::HashMap;
use std::path::{
    Path,
    PathBuf,
};

pub use loader::{
    load_bundle,
    locale_for_path,
    normalize_locale_code,
};
use serde_json::{
    Map,
    Value,
};
use thiserror::Error;
pub use writer::write_bundle;

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Bundle file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to parse bundle {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Bundle root is not a JSON object: {}", .0.display())]
    NotAnObject(PathBuf),

    #[error("I/O error on bundle {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One locale's translation document, bound to its file path.
#[derive(Debug, Clone)]
pub struct Bundle {
    path: PathBuf,
    doc: Map<String, Value>,
}

impl Bundle {
    #[must_use]
    pub fn new(path: PathBuf, doc: Map<String, Value>) -> Self {
        Self { path, doc }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn doc(&self) -> &Map<String, Value> {
        &self.doc
    }

    pub fn doc_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.doc
    }
}

/// Flatten a bundle tree into a dot-separated leaf key map.
///
/// # Examples
/// ```
/// use locale_patch::bundle::flatten_keys;
///
/// let json = serde_json::json!({
///     "nav": { "home": "Home", "vr": "VR Experience" }
/// });
///
/// let flattened = flatten_keys(json.as_object().unwrap(), ".");
/// assert_eq!(flattened.get("nav.vr"), Some(&"VR Experience".to_string()));
/// ```
#[must_use]
pub fn flatten_keys(doc: &Map<String, Value>, separator: &str) -> HashMap<String, String> {
    let mut result = HashMap::new();
    for (key, value) in doc {
        flatten_value(value, separator, key, &mut result);
    }
    result
}

fn flatten_value(
    value: &Value,
    separator: &str,
    prefix: &str,
    result: &mut HashMap<String, String>,
) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let full_key = format!("{prefix}{separator}{key}");
                flatten_value(child, separator, &full_key, result);
            }
        }
        Value::Array(arr) => {
            for (index, child) in arr.iter().enumerate() {
                let full_key = format!("{prefix}[{index}]");
                flatten_value(child, separator, &full_key, result);
            }
        }
        Value::String(s) => {
            result.insert(prefix.to_string(), s.clone());
        }
        _ => {
            result.insert(prefix.to_string(), value.to_string());
        }
    }
}
