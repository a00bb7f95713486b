//! Per-locale patch pipeline
//!
//! Runs load → apply → write once per manifest locale, in the manifest's
//! declared order, fully sequential. The first failure stops the run unless
//! the manifest sets `continueOnError`, in which case the failed locale is
//! logged and the run moves on. Files written before a failure stay written;
//! there is no rollback.

use std::collections::HashSet;
use std::path::{
    Path,
    PathBuf,
};

use globset::Glob;
use ignore::WalkBuilder;
use thiserror::Error;

use crate::bundle::{
    self,
    BundleError,
    normalize_locale_code,
};
use crate::config::{
    LocalePatch,
    PatchManifest,
};
use crate::patch::{
    self,
    PatchError,
    PatchSummary,
};

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Bundle(#[from] BundleError),
    #[error(transparent)]
    Patch(#[from] PatchError),
}

/// Result of one locale's pipeline.
#[derive(Debug)]
pub struct LocaleOutcome {
    pub locale: String,
    pub file_path: PathBuf,
    pub outcome: Result<PatchSummary, RunError>,
}

/// Per-locale outcomes of a run, in attempt order.
///
/// Locales skipped after a fail-fast stop do not appear.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<LocaleOutcome>,
}

impl RunReport {
    /// Number of bundles successfully patched and written.
    #[must_use]
    pub fn patched(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_ok()).count()
    }

    #[must_use]
    pub fn failed(&self) -> bool {
        self.outcomes.iter().any(|o| o.outcome.is_err())
    }
}

/// Run the whole manifest against its locales directory.
///
/// `manifest_dir` anchors a relative `localesDir`; pass the directory the
/// manifest file was loaded from.
#[must_use]
pub fn run(manifest: &PatchManifest, manifest_dir: &Path) -> RunReport {
    let locales_dir = resolve_locales_dir(manifest, manifest_dir);
    tracing::debug!(locales_dir = %locales_dir.display(), "Starting patch run");

    warn_uncovered_bundles(manifest, &locales_dir);

    let mut report = RunReport::default();
    for (locale, patch) in &manifest.locales {
        let file_path = locales_dir.join(format!("{locale}.json"));
        let outcome = patch_locale(&file_path, patch);

        match &outcome {
            Ok(summary) => {
                tracing::info!(
                    locale = %locale,
                    path = %file_path.display(),
                    added = summary.added,
                    overwritten = summary.overwritten,
                    "Patched bundle"
                );
            }
            Err(e) if manifest.continue_on_error => {
                tracing::warn!(locale = %locale, error = %e, "Skipping locale after failure");
            }
            Err(e) => {
                tracing::error!(locale = %locale, error = %e, "Stopping run after failure");
            }
        }

        let failed = outcome.is_err();
        report.outcomes.push(LocaleOutcome {
            locale: locale.clone(),
            file_path,
            outcome,
        });

        if failed && !manifest.continue_on_error {
            break;
        }
    }

    report
}

/// Load, patch, and write one bundle. The write only happens when the patch
/// applied cleanly, so a patch failure leaves the file byte-identical.
fn patch_locale(path: &Path, patch: &LocalePatch) -> Result<PatchSummary, RunError> {
    let mut bundle = bundle::load_bundle(path)?;
    let summary = patch::apply(&mut bundle, patch)?;
    bundle::write_bundle(&bundle)?;

    tracing::debug!(
        path = %path.display(),
        total_keys = bundle::flatten_keys(bundle.doc(), patch::KEY_SEPARATOR).len(),
        "Bundle after patch"
    );

    Ok(summary)
}

fn resolve_locales_dir(manifest: &PatchManifest, manifest_dir: &Path) -> PathBuf {
    let dir = Path::new(&manifest.locales_dir);
    if dir.is_absolute() { dir.to_path_buf() } else { manifest_dir.join(dir) }
}

/// Warn about bundle files in the locales directory that no manifest locale
/// covers, so drift between the manifest and the directory is visible.
fn warn_uncovered_bundles(manifest: &PatchManifest, locales_dir: &Path) {
    let matcher = match Glob::new(&manifest.file_pattern) {
        Ok(glob) => glob.compile_matcher(),
        Err(e) => {
            // Validation rejects bad patterns before a run; nothing to do here.
            tracing::debug!(error = %e, "Skipping bundle discovery");
            return;
        }
    };

    let known: HashSet<String> =
        manifest.locales.keys().map(|l| normalize_locale_code(l)).collect();

    for result in WalkBuilder::new(locales_dir)
        .hidden(false)
        .git_ignore(true)
        .follow_links(false)
        .build()
    {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(?err, "Failed to read directory entry");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        let Ok(relative_path) = path.strip_prefix(locales_dir) else {
            continue;
        };
        if !matcher.is_match(relative_path) {
            continue;
        }

        let covered = bundle::locale_for_path(path)
            .is_some_and(|locale| known.contains(&normalize_locale_code(&locale)));
        if !covered {
            tracing::warn!(path = %path.display(), "Bundle not covered by manifest");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use indexmap::IndexMap;
    use rstest::rstest;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn write_locale(dir: &Path, locale: &str, content: &str) -> PathBuf {
        let path = dir.join(format!("{locale}.json"));
        fs::write(&path, content).unwrap();
        path
    }

    fn nav_vr_manifest(locales: &[(&str, &str)]) -> PatchManifest {
        let locales = locales
            .iter()
            .map(|(code, label)| {
                let patch = LocalePatch {
                    set_in: IndexMap::from([("nav.vr".to_string(), json!(label))]),
                    ..LocalePatch::default()
                };
                ((*code).to_string(), patch)
            })
            .collect();
        PatchManifest { locales, ..PatchManifest::default() }
    }

    #[googletest::test]
    fn test_run_patches_locales_in_manifest_order() {
        let temp_dir = TempDir::new().unwrap();
        let locales_dir = temp_dir.path().join("locales");
        fs::create_dir(&locales_dir).unwrap();
        write_locale(&locales_dir, "en", r#"{"nav": {"home": "Home"}}"#);
        write_locale(&locales_dir, "es", r#"{"nav": {"home": "Inicio"}}"#);

        let manifest =
            nav_vr_manifest(&[("en", "VR Experience"), ("es", "Experiencia VR")]);
        let report = run(&manifest, temp_dir.path());

        expect_that!(report.failed(), eq(false));
        expect_that!(report.patched(), eq(2));
        let order: Vec<_> = report.outcomes.iter().map(|o| o.locale.clone()).collect();
        expect_that!(order, elements_are![eq("en"), eq("es")]);

        let es: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(locales_dir.join("es.json")).unwrap())
                .unwrap();
        expect_that!(es["nav"]["vr"], eq(&json!("Experiencia VR")));
    }

    #[googletest::test]
    fn test_run_fail_fast_stops_at_first_failure() {
        let temp_dir = TempDir::new().unwrap();
        let locales_dir = temp_dir.path().join("locales");
        fs::create_dir(&locales_dir).unwrap();
        write_locale(&locales_dir, "en", r#"{"nav": {"home": "Home"}}"#);
        // No nav object, so the patch must fail.
        let fr_path = write_locale(&locales_dir, "fr", r#"{"footer": {"legal": "Legal"}}"#);
        write_locale(&locales_dir, "es", r#"{"nav": {"home": "Inicio"}}"#);

        let manifest = nav_vr_manifest(&[
            ("en", "VR Experience"),
            ("fr", "Expérience VR"),
            ("es", "Experiencia VR"),
        ]);
        let report = run(&manifest, temp_dir.path());

        expect_that!(report.failed(), eq(true));
        expect_that!(report.patched(), eq(1));
        // es was never attempted.
        expect_that!(report.outcomes.len(), eq(2));

        // The failed file is untouched on disk.
        let fr = fs::read_to_string(fr_path).unwrap();
        expect_that!(fr, eq(r#"{"footer": {"legal": "Legal"}}"#));
        // es keeps its original single-line form since it was never written.
        let es = fs::read_to_string(locales_dir.join("es.json")).unwrap();
        expect_that!(es, eq(r#"{"nav": {"home": "Inicio"}}"#));
    }

    #[googletest::test]
    fn test_run_continue_on_error_patches_later_locales() {
        let temp_dir = TempDir::new().unwrap();
        let locales_dir = temp_dir.path().join("locales");
        fs::create_dir(&locales_dir).unwrap();
        write_locale(&locales_dir, "en", r#"{"nav": {"home": "Home"}}"#);
        write_locale(&locales_dir, "fr", r#"{"footer": {"legal": "Legal"}}"#);
        write_locale(&locales_dir, "es", r#"{"nav": {"home": "Inicio"}}"#);

        let manifest = PatchManifest {
            continue_on_error: true,
            ..nav_vr_manifest(&[
                ("en", "VR Experience"),
                ("fr", "Expérience VR"),
                ("es", "Experiencia VR"),
            ])
        };
        let report = run(&manifest, temp_dir.path());

        expect_that!(report.failed(), eq(true));
        expect_that!(report.patched(), eq(2));
        expect_that!(report.outcomes.len(), eq(3));

        let es: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(locales_dir.join("es.json")).unwrap())
                .unwrap();
        expect_that!(es["nav"]["vr"], eq(&json!("Experiencia VR")));
    }

    #[rstest]
    fn test_run_missing_bundle_is_a_locale_failure() {
        let temp_dir = TempDir::new().unwrap();
        let locales_dir = temp_dir.path().join("locales");
        fs::create_dir(&locales_dir).unwrap();

        let manifest = nav_vr_manifest(&[("en", "VR Experience")]);
        let report = run(&manifest, temp_dir.path());

        assert!(report.failed());
        assert!(matches!(
            report.outcomes[0].outcome,
            Err(RunError::Bundle(BundleError::NotFound(_)))
        ));
    }

    #[rstest]
    fn test_resolve_locales_dir_absolute_wins() {
        let manifest = PatchManifest {
            locales_dir: "/abs/locales".to_string(),
            ..PatchManifest::default()
        };

        let resolved = resolve_locales_dir(&manifest, Path::new("/somewhere/else"));

        assert_eq!(resolved, PathBuf::from("/abs/locales"));
    }
}
