mod bootstrap;

use anyhow::{Context, Result};
use copilot_core::error::CopilotError;
use copilot_core::settings::Settings;
use copilot_data::reader::{load_tables, TablePaths};
use copilot_runtime::orchestrator::{OrchestratorConfig, QueryOrchestrator};
use copilot_ui::app::App;
use copilot_ui::chart_view::render_to_lines;

const CHART_WIDTH: u16 = 80;
const CHART_HEIGHT: u16 = 20;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();
    settings.validate()?;

    let base = bootstrap::ensure_directories()?;

    // The TUI owns the screen, so interactive runs always log to a file.
    let log_file = settings
        .log_file
        .clone()
        .or_else(|| settings.question.is_none().then(|| bootstrap::default_log_file(&base)));
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;

    tracing::info!("CFO Copilot v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("Entity: {}, Theme: {}", settings.entity, settings.theme);

    let data_dir = bootstrap::discover_data_dir(settings.data_dir.as_deref());
    tracing::info!("Data directory: {}", data_dir.display());

    let paths = TablePaths::in_dir(&data_dir).with_overrides(
        settings.actuals.clone(),
        settings.budget.clone(),
        settings.fx.clone(),
        settings.cash.clone(),
    );
    let tables = load_tables(&paths)
        .with_context(|| format!("loading source tables from {}", data_dir.display()))?;

    let orchestrator = QueryOrchestrator::new(OrchestratorConfig {
        default_entity: settings.entity.clone(),
    });

    match &settings.question {
        Some(question) => {
            let response = orchestrator.answer(question, &tables);

            if settings.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", response.text);
                if let Some(chart) = &response.chart {
                    println!();
                    for line in render_to_lines(chart, CHART_WIDTH, CHART_HEIGHT) {
                        println!("{line}");
                    }
                }
            }
        }
        None => {
            tracing::info!("Starting interactive mode...");
            let app = App::new(
                &settings.theme,
                orchestrator,
                tables,
                bootstrap::reports_dir(&base),
            );
            app.run()
                .map_err(|e| CopilotError::Terminal(e.to_string()))?;
        }
    }

    Ok(())
}
