//! Exporting an answer to disk.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use copilot_core::chart::ChartSpec;
use copilot_core::error::Result;
use copilot_core::models::Intent;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::orchestrator::Response;

/// A saved question and its answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub question: String,
    pub generated_at: DateTime<Local>,
    pub intent: Intent,
    pub entity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    pub text: String,
    pub chart: Option<ChartSpec>,
}

impl Report {
    pub fn new(question: &str, response: &Response) -> Self {
        Self::at(question, response, Local::now())
    }

    pub fn at(question: &str, response: &Response, generated_at: DateTime<Local>) -> Self {
        Self {
            question: question.to_string(),
            generated_at,
            intent: response.intent,
            entity: response.entity.clone(),
            month: response.month.clone(),
            text: response.text.clone(),
            chart: response.chart.clone(),
        }
    }

    /// `CFO_Report_<YYYYmmdd>_<HHMMSS>.json`, local time.
    pub fn file_name(&self) -> String {
        self.generated_at
            .format("CFO_Report_%Y%m%d_%H%M%S.json")
            .to_string()
    }

    /// Atomically write the report as pretty JSON into `dir`, creating it if
    /// needed. Returns the final path.
    pub fn save_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;

        let path = dir.join(self.file_name());
        let json = serde_json::to_string_pretty(self)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)?;

        info!("Saved report to {}", path.display());
        Ok(path)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
