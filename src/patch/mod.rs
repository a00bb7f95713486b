//! Applying a locale's patch entries to a loaded bundle
//!
//! Two kinds of assignment exist. `set` entries replace a top-level key
//! wholesale. `setIn` entries address a single leaf through a dotted path
//! and require every ancestor to already exist as an object; an absent
//! ancestor is an error, not a reason to create one. `set` entries are
//! applied before `setIn` entries, so a leaf can land inside an object the
//! same patch just installed.

use serde_json::{
    Map,
    Value,
};
use thiserror::Error;

use crate::bundle::Bundle;
use crate::config::LocalePatch;

/// Separator for `setIn` paths.
pub const KEY_SEPARATOR: &str = ".";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// A `setIn` ancestor is missing from the bundle
    #[error("Cannot set '{key}': parent object '{parent}' does not exist")]
    MissingParent { key: String, parent: String },

    /// A `setIn` ancestor exists but is not a JSON object
    #[error("Cannot set '{key}': '{parent}' is not an object")]
    ParentNotObject { key: String, parent: String },
}

/// What a patch did to a bundle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchSummary {
    /// Keys that did not exist before
    pub added: usize,
    /// Keys that existed and were replaced
    pub overwritten: usize,
}

impl PatchSummary {
    #[must_use]
    pub fn total(&self) -> usize {
        self.added + self.overwritten
    }

    fn record(&mut self, existed: bool) {
        if existed {
            self.overwritten += 1;
        } else {
            self.added += 1;
        }
    }
}

/// Merge one locale's patch into the bundle tree.
///
/// Mutates the in-memory tree only; the caller decides whether to write the
/// file, and must not do so when this returns an error.
///
/// # Errors
/// - [`PatchError::MissingParent`] / [`PatchError::ParentNotObject`] when a
///   `setIn` path cannot be resolved
pub fn apply(bundle: &mut Bundle, patch: &LocalePatch) -> Result<PatchSummary, PatchError> {
    let mut summary = PatchSummary::default();
    let doc = bundle.doc_mut();

    for (key, value) in &patch.set {
        let existed = doc.insert(key.clone(), value.clone()).is_some();
        summary.record(existed);
    }

    for (key, value) in &patch.set_in {
        let existed = set_leaf(doc, key, value)?;
        summary.record(existed);
    }

    Ok(summary)
}

/// Set one leaf through a dotted path, requiring existing object ancestors.
/// Returns whether the leaf already existed.
fn set_leaf(doc: &mut Map<String, Value>, key: &str, value: &Value) -> Result<bool, PatchError> {
    let mut segments = key.split(KEY_SEPARATOR).collect::<Vec<_>>();
    let Some(leaf) = segments.pop() else {
        // Unreachable for validated manifests; treat as a missing parent.
        return Err(PatchError::MissingParent { key: key.to_string(), parent: String::new() });
    };

    let mut current = doc;
    let mut walked = Vec::with_capacity(segments.len());
    for segment in segments {
        walked.push(segment);
        current = match current.get_mut(segment) {
            Some(Value::Object(next)) => next,
            Some(_) => {
                return Err(PatchError::ParentNotObject {
                    key: key.to_string(),
                    parent: walked.join(KEY_SEPARATOR),
                });
            }
            None => {
                return Err(PatchError::MissingParent {
                    key: key.to_string(),
                    parent: walked.join(KEY_SEPARATOR),
                });
            }
        };
    }

    Ok(current.insert(leaf.to_string(), value.clone()).is_some())
}
