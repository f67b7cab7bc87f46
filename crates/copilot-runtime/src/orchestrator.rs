//! Question answering.
//!
//! Classifies a question, pulls the month out of it, checks that the chosen
//! analysis has what it needs and dispatches to [`MetricEngine`]. Every
//! question gets an answer: missing parameters and unknown questions come
//! back as guidance text without a chart.

use copilot_core::chart::ChartSpec;
use copilot_core::models::{Intent, QueryContext, SourceTables};
use copilot_core::settings::DEFAULT_ENTITY;
use copilot_core::time_utils::{parse_month_year, MONTH_NAMES};
use copilot_data::metrics::{MetricEngine, MetricResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classifier::IntentClassifier;

pub const UNKNOWN_QUESTION_MESSAGE: &str = "Sorry, I could not understand the question.";
pub const CASH_MISSING_MESSAGE: &str = "Cash data not provided.";

// ── Public types ──────────────────────────────────────────────────────────────

/// Orchestrator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Entity every analysis is computed for.
    pub default_entity: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            default_entity: DEFAULT_ENTITY.to_string(),
        }
    }
}

/// The answer to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub intent: Intent,
    /// Month the question named, as `YYYY-MM`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    pub entity: String,
    pub text: String,
    /// Absent for guidance messages.
    pub chart: Option<ChartSpec>,
}

impl Response {
    fn message(ctx: QueryContext, text: impl Into<String>) -> Self {
        Self {
            intent: ctx.intent,
            month: ctx.month,
            entity: ctx.entity,
            text: text.into(),
            chart: None,
        }
    }

    fn from_metric(ctx: QueryContext, result: MetricResult) -> Self {
        Self {
            intent: ctx.intent,
            month: ctx.month,
            entity: ctx.entity,
            text: result.text,
            chart: Some(result.chart),
        }
    }
}

// ── QueryOrchestrator ─────────────────────────────────────────────────────────

/// Turns questions into [`Response`]s against a set of source tables.
///
/// Holds no state between questions; the tables are only borrowed.
pub struct QueryOrchestrator {
    config: OrchestratorConfig,
    month_pattern: Regex,
}

impl QueryOrchestrator {
    pub fn new(config: OrchestratorConfig) -> Self {
        let pattern = format!(r"(?i)({}) \d{{4}}", MONTH_NAMES.join("|"));
        Self {
            config,
            month_pattern: Regex::new(&pattern).expect("regex is valid"),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// First `"<Month> <YYYY>"` in `question`, as `YYYY-MM`.
    pub fn extract_month(&self, question: &str) -> Option<String> {
        let found = self.month_pattern.find(question)?;
        parse_month_year(found.as_str())
    }

    /// Intent, month and entity for `question`.
    pub fn parse_context(&self, question: &str) -> QueryContext {
        QueryContext {
            intent: IntentClassifier::classify(question),
            month: self.extract_month(question),
            entity: self.config.default_entity.clone(),
        }
    }

    /// Answer `question` from `tables`.
    pub fn answer(&self, question: &str, tables: &SourceTables) -> Response {
        let ctx = self.parse_context(question);
        info!(intent = %ctx.intent, month = ?ctx.month, entity = %ctx.entity, "classified question");

        let entity = ctx.entity.as_str();
        // Trend analyses always cover the full history, so only the monthly
        // arms look at the month.
        let outcome = match (ctx.intent, ctx.month.as_deref()) {
            (Intent::RevenueVsBudget, Some(month)) => Outcome::Metric(MetricEngine::revenue_vs_budget(
                month,
                entity,
                &tables.actuals,
                &tables.budget,
                &tables.fx,
            )),
            (Intent::OpexBreakdown, Some(month)) => Outcome::Metric(MetricEngine::opex_breakdown(
                month,
                entity,
                &tables.actuals,
                &tables.fx,
            )),
            (Intent::EbitdaVsBudget, Some(month)) => Outcome::Metric(MetricEngine::ebitda_vs_budget(
                month,
                entity,
                &tables.actuals,
                &tables.budget,
                &tables.fx,
            )),
            (Intent::RevenueVsBudget | Intent::OpexBreakdown | Intent::EbitdaVsBudget, None) => {
                debug!(intent = %ctx.intent, "question named no month");
                Outcome::Guidance(month_prompt(ctx.intent))
            }
            (Intent::GrossMarginTrend, _) => Outcome::Metric(MetricEngine::gross_margin_trend(
                &tables.actuals,
                &tables.fx,
                entity,
            )),
            (Intent::EbitdaTrend, _) => {
                Outcome::Metric(MetricEngine::ebitda_trend(&tables.actuals, &tables.fx, entity))
            }
            (Intent::CashRunway, _) => match &tables.cash {
                Some(cash) => Outcome::Metric(MetricEngine::cash_runway(
                    cash,
                    &tables.actuals,
                    &tables.fx,
                    entity,
                )),
                None => Outcome::Guidance(CASH_MISSING_MESSAGE.to_string()),
            },
            (Intent::Unknown, _) => Outcome::Guidance(UNKNOWN_QUESTION_MESSAGE.to_string()),
        };

        match outcome {
            Outcome::Metric(result) => Response::from_metric(ctx, result),
            Outcome::Guidance(text) => Response::message(ctx, text),
        }
    }
}

/// What a question resolved to before it is wrapped in a [`Response`].
enum Outcome {
    Metric(MetricResult),
    Guidance(String),
}

impl Default for QueryOrchestrator {
    fn default() -> Self {
        Self::new(OrchestratorConfig::default())
    }
}

/// Prompt asking for a month, for intents that need one.
fn month_prompt(intent: Intent) -> String {
    let analysis = match intent {
        Intent::RevenueVsBudget => "Revenue vs Budget",
        Intent::OpexBreakdown => "Opex breakdown",
        Intent::EbitdaVsBudget => "EBITDA vs Budget",
        _ => "this analysis",
    };
    format!("Please specify the month (e.g., June 2024) for {analysis}.")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use copilot_core::models::{CashRecord, FinancialRecord, FxRate};

    fn tables() -> SourceTables {
        SourceTables {
            actuals: vec![
                FinancialRecord::new("2024-05", "ParentCo", "Revenue", 800.0, "USD"),
                FinancialRecord::new("2024-06", "ParentCo", "Revenue", 1000.0, "USD"),
                FinancialRecord::new("2024-06", "ParentCo", "COGS", 200.0, "USD"),
                FinancialRecord::new("2024-06", "ParentCo", "Opex:Sales", 100.0, "USD"),
            ],
            budget: vec![FinancialRecord::new("2024-06", "ParentCo", "Revenue", 900.0, "USD")],
            fx: vec![FxRate::new("2024-05", "USD", 1.0), FxRate::new("2024-06", "USD", 1.0)],
            cash: Some(vec![CashRecord::new("2024-06", "ParentCo", 10_000.0)]),
        }
    }

    // ── extract_month ─────────────────────────────────────────────────────────

    #[test]
    fn test_extract_month_case_insensitive() {
        let orch = QueryOrchestrator::default();
        assert_eq!(orch.extract_month("revenue vs budget for june 2024").as_deref(), Some("2024-06"));
        assert_eq!(orch.extract_month("DECEMBER 2023 opex").as_deref(), Some("2023-12"));
    }

    #[test]
    fn test_extract_month_first_occurrence() {
        let orch = QueryOrchestrator::default();
        assert_eq!(
            orch.extract_month("March 2024 compared with April 2024").as_deref(),
            Some("2024-03")
        );
    }

    #[test]
    fn test_extract_month_rejects_other_shapes() {
        let orch = QueryOrchestrator::default();
        assert!(orch.extract_month("revenue for 2024-06").is_none());
        assert!(orch.extract_month("revenue for Jun 2024").is_none());
        assert!(orch.extract_month("revenue for June, 2024").is_none());
        assert!(orch.extract_month("revenue for June").is_none());
    }

    // ── parse_context ─────────────────────────────────────────────────────────

    #[test]
    fn test_parse_context_uses_configured_entity() {
        let orch = QueryOrchestrator::new(OrchestratorConfig {
            default_entity: "EMEA".to_string(),
        });
        let ctx = orch.parse_context("Opex breakdown for June 2024 for ParentCo");
        assert_eq!(ctx.intent, Intent::OpexBreakdown);
        assert_eq!(ctx.month.as_deref(), Some("2024-06"));
        assert_eq!(ctx.entity, "EMEA");
    }

    // ── answer ────────────────────────────────────────────────────────────────

    #[test]
    fn test_answer_unknown() {
        let response = QueryOrchestrator::default().answer("How are we doing?", &tables());
        assert_eq!(response.intent, Intent::Unknown);
        assert_eq!(response.text, UNKNOWN_QUESTION_MESSAGE);
        assert!(response.chart.is_none());
    }

    #[test]
    fn test_answer_missing_month_prompts() {
        let orch = QueryOrchestrator::default();
        let cases = [
            ("revenue vs budget", "Please specify the month (e.g., June 2024) for Revenue vs Budget."),
            ("opex breakdown", "Please specify the month (e.g., June 2024) for Opex breakdown."),
            ("ebitda vs budget", "Please specify the month (e.g., June 2024) for EBITDA vs Budget."),
        ];
        for (question, expected) in cases {
            let response = orch.answer(question, &tables());
            assert_eq!(response.text, expected);
            assert!(response.chart.is_none());
        }
    }

    #[test]
    fn test_answer_trend_ignores_month() {
        let orch = QueryOrchestrator::default();
        let with_month = orch.answer("gross margin for June 2024", &tables());
        let without = orch.answer("gross margin", &tables());
        assert_eq!(with_month.chart, without.chart);
        assert_eq!(with_month.chart.map(|c| c.categories.len()), Some(2));
    }

    #[test]
    fn test_answer_trend_keeps_named_month_without_filtering() {
        let response = QueryOrchestrator::default().answer("EBITDA trend since May 2024", &tables());
        assert_eq!(response.intent, Intent::EbitdaTrend);
        assert_eq!(response.month.as_deref(), Some("2024-05"));
        let chart = response.chart.expect("chart");
        assert_eq!(chart.categories, vec!["2024-05", "2024-06"]);
    }

    #[test]
    fn test_answer_monthly_intent_uses_named_month() {
        let response = QueryOrchestrator::default().answer("Opex breakdown for June 2024", &tables());
        assert_eq!(response.month.as_deref(), Some("2024-06"));
        assert_eq!(response.text, "Opex breakdown for 2024-06 (ParentCo):\nOpex:Sales: $100");
    }

    #[test]
    fn test_answer_cash_runway_without_cash_table() {
        let mut t = tables();
        t.cash = None;
        let response = QueryOrchestrator::default().answer("What is our cash runway?", &t);
        assert_eq!(response.intent, Intent::CashRunway);
        assert_eq!(response.text, CASH_MISSING_MESSAGE);
        assert!(response.chart.is_none());
    }

    #[test]
    fn test_answer_cash_runway_with_cash_table() {
        let response = QueryOrchestrator::default().answer("cash runway please", &tables());
        assert!(response.text.starts_with("Cash Runway for ParentCo:"), "{}", response.text);
        assert!(response.chart.is_some());
    }

    #[test]
    fn test_answer_ebitda_vs_budget() {
        let response = QueryOrchestrator::default().answer("EBITDA vs budget June 2024", &tables());
        assert_eq!(
            response.text,
            "EBITDA in 2024-06 for ParentCo: Actual $700 vs Budget $900"
        );
    }

    #[test]
    fn test_answer_does_not_modify_tables() {
        let t = tables();
        let before = format!("{:?}", t);
        let _ = QueryOrchestrator::default().answer("revenue vs budget June 2024", &t);
        assert_eq!(format!("{:?}", t), before);
    }

    #[test]
    fn test_response_serializes_intent_tag() {
        let response = QueryOrchestrator::default().answer("How are we doing?", &tables());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["intent"], "unknown");
        assert!(json["chart"].is_null());
    }
}
