//! Entry point for the locale bundle patch tool.

use std::path::{
    Path,
    PathBuf,
};
use std::process::ExitCode;

use locale_patch::config::{
    self,
    MANIFEST_FILE_NAME,
    ManifestError,
};
use locale_patch::runner::{
    self,
    RunReport,
};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
enum CliError {
    #[error("No patch manifest found: expected {MANIFEST_FILE_NAME} in {}", .0.display())]
    ManifestNotFound(PathBuf),

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

fn main() -> ExitCode {
    // Diagnostics go to stderr; stdout carries only the confirmation lines.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run_cli() {
        Ok(report) => {
            print_confirmations(&report);
            if report.failed() { ExitCode::FAILURE } else { ExitCode::SUCCESS }
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> Result<RunReport, CliError> {
    let manifest_path = resolve_manifest_path(std::env::args_os().nth(1).map(PathBuf::from))?;
    let manifest = config::load_manifest(&manifest_path)?;

    let manifest_dir = manifest_path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    Ok(runner::run(&manifest, &manifest_dir))
}

/// Resolve the manifest to run: an explicit file path, an explicit directory
/// to discover in, or discovery in the current directory.
fn resolve_manifest_path(arg: Option<PathBuf>) -> Result<PathBuf, CliError> {
    match arg {
        Some(path) if path.is_dir() => {
            config::discover_manifest(&path).ok_or(CliError::ManifestNotFound(path))
        }
        Some(path) => Ok(path),
        None => {
            let cwd = PathBuf::from(".");
            config::discover_manifest(&cwd).ok_or(CliError::ManifestNotFound(cwd))
        }
    }
}

/// One confirmation line per patched file, in run order.
#[allow(clippy::print_stdout)]
fn print_confirmations(report: &RunReport) {
    for outcome in &report.outcomes {
        if let Ok(summary) = &outcome.outcome {
            let name = outcome
                .file_path
                .file_name()
                .map_or_else(|| outcome.file_path.display().to_string(), |n| {
                    n.to_string_lossy().to_string()
                });
            println!(
                "Updated {name} ({} added, {} overwritten)",
                summary.added, summary.overwritten
            );
        }
    }
}
