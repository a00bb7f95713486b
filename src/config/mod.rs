//! Patch manifest: the data file that replaces hard-coded translation tables
mod loader;
mod types;

pub use loader::{
    MANIFEST_FILE_NAME,
    discover_manifest,
    load_manifest,
};
pub use types::{
    LocalePatch,
    ManifestError,
    PatchManifest,
    ValidationError,
};
