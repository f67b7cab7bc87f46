use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{CopilotError, Result};

/// Entity used when the question does not say otherwise.
pub const DEFAULT_ENTITY: &str = "ParentCo";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Ask finance questions about actuals, budget, FX and cash tables
#[derive(Parser, Debug, Clone)]
#[command(
    name = "cfo-copilot",
    about = "Ask finance questions about actuals, budget, FX and cash tables",
    version
)]
pub struct Settings {
    /// Question to answer once and exit (starts the interactive UI when omitted)
    #[arg(short, long)]
    pub question: Option<String>,

    /// Print the one-shot answer as JSON
    #[arg(long)]
    pub json: bool,

    /// Directory holding data.csv, budget.csv, fx.csv and cash.csv
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Actuals table (overrides <data-dir>/data.csv)
    #[arg(long)]
    pub actuals: Option<PathBuf>,

    /// Budget table (overrides <data-dir>/budget.csv)
    #[arg(long)]
    pub budget: Option<PathBuf>,

    /// FX rate table (overrides <data-dir>/fx.csv)
    #[arg(long)]
    pub fx: Option<PathBuf>,

    /// Cash balance table (overrides <data-dir>/cash.csv)
    #[arg(long)]
    pub cash: Option<PathBuf>,

    /// Entity every analysis is computed for
    #[arg(long, default_value = DEFAULT_ENTITY)]
    pub entity: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.cfo-copilot/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl LastUsedParams {
    /// `~/.cfo-copilot/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".cfo-copilot").join("last_used.json")
    }

    /// Missing or unreadable files yield empty params.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Write via a temp file and rename.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    pub fn clear_at(path: &Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments, fill unset values from the last run and
    /// remember this run for next time.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// [`Settings::load_with_last_used`] against explicit args and config file.
    pub fn load_with_last_used_impl(
        args: Vec<OsString>,
        config_path: &Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins. clap stores arg ids by field name.
        if !is_arg_explicitly_set(&matches, "entity") {
            if let Some(v) = last.entity {
                settings.entity = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "data_dir") && settings.data_dir.is_none() {
            settings.data_dir = last.data_dir;
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }

        settings = Self::apply_debug(settings);

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::debug!(error = %e, "could not persist last-used params");
        }

        settings
    }

    /// Reject values that parse but cannot be used.
    pub fn validate(&self) -> Result<()> {
        if self.entity.trim().is_empty() {
            return Err(CopilotError::Config("entity must not be empty".to_string()));
        }
        if let Some(q) = &self.question {
            if q.trim().is_empty() {
                return Err(CopilotError::Config("question must not be empty".to_string()));
            }
        }
        if self.json && self.question.is_none() {
            return Err(CopilotError::Config(
                "--json requires --question".to_string(),
            ));
        }
        Ok(())
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            entity: Some(s.entity.clone()),
            data_dir: s.data_dir.clone(),
            theme: Some(s.theme.clone()),
        }
    }
}

/// `true` only for values typed on the command line, not defaults.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
