use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const APP_DIR: &str = ".cfo-copilot";
const LOG_FILE: &str = "cfo-copilot.log";

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// `~/.cfo-copilot`, or `./.cfo-copilot` when there is no home directory.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Ensure the standard `~/.cfo-copilot/` hierarchy exists and return its root.
pub fn ensure_directories() -> anyhow::Result<PathBuf> {
    let base = app_dir();
    ensure_directories_in(&base)?;
    Ok(base)
}

/// Create `base` and its `logs/`, `reports/` and `data/` subdirectories.
pub fn ensure_directories_in(base: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(base)?;
    for sub in ["logs", "reports", "data"] {
        std::fs::create_dir_all(base.join(sub))?;
    }
    Ok(())
}

pub fn default_log_file(base: &Path) -> PathBuf {
    base.join("logs").join(LOG_FILE)
}

pub fn reports_dir(base: &Path) -> PathBuf {
    base.join("reports")
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `--log-level` name onto an `EnvFilter` directive.
fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Output goes to `log_file` (appended, parent created) when given, otherwise
/// to stderr. Unrecognised levels fall back to `info`.
pub fn setup_logging(log_level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, stderr_layer) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), None)
        }
        None => (
            None,
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

// ── Data-path discovery ────────────────────────────────────────────────────────

/// Pick the directory holding the CSV tables.
///
/// An explicit `--data-dir` always wins. Otherwise `./fixtures` is used when
/// it exists, then `~/.cfo-copilot/data`.
pub fn discover_data_dir(explicit: Option<&Path>) -> PathBuf {
    discover_data_dir_in(explicit, Path::new("fixtures"), &app_dir().join("data"))
}

pub fn discover_data_dir_in(explicit: Option<&Path>, local: &Path, fallback: &Path) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    if local.is_dir() {
        return local.to_path_buf();
    }
    fallback.to_path_buf()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
