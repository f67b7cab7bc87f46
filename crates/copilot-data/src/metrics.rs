//! The six finance analyses.
//!
//! Every analysis converts its inputs to USD itself, so callers always pass
//! the raw source tables. Nothing here fails: a slice with no usable rows
//! sums to zero and is reported as such.

use copilot_core::calculations::RunwayCalculator;
use copilot_core::chart::{ChartSeries, ChartSpec};
use copilot_core::currency::{CurrencyNormalizer, RateTable};
use copilot_core::formatting::{format_runway, format_usd};
use copilot_core::models::{CashRecord, FinancialRecord, FxRate, REVENUE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregator::MonthlyAggregator;

const USD_LABEL: &str = "USD";
const MONTH_LABEL: &str = "Month";

// ── MetricResult ──────────────────────────────────────────────────────────────

/// Human-readable summary plus the chart that illustrates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub text: String,
    pub chart: ChartSpec,
}

impl MetricResult {
    fn new(text: impl Into<String>, chart: ChartSpec) -> Self {
        Self {
            text: text.into(),
            chart,
        }
    }
}

// ── MetricEngine ──────────────────────────────────────────────────────────────

/// Stateless collection of the supported analyses.
pub struct MetricEngine;

impl MetricEngine {
    /// Actual vs budgeted revenue for one month and entity.
    pub fn revenue_vs_budget(
        month: &str,
        entity: &str,
        actuals: &[FinancialRecord],
        budget: &[FinancialRecord],
        fx: &[FxRate],
    ) -> MetricResult {
        let rates = RateTable::new(fx);
        let actual_usd = CurrencyNormalizer::normalize_with(actuals, &rates);
        let budget_usd = CurrencyNormalizer::normalize_with(budget, &rates);

        let actual = MonthlyAggregator::category_sum(&actual_usd, month, entity, REVENUE);
        let planned = MonthlyAggregator::category_sum(&budget_usd, month, entity, REVENUE);
        debug!(month, entity, actual, planned, "revenue vs budget");

        let text = format!(
            "Revenue in {month} for {entity}: Actual {} vs Budget {}",
            format_usd(actual),
            format_usd(planned)
        );
        let chart = ChartSpec::bar(
            format!("Revenue vs Budget - {month} ({entity})"),
            USD_LABEL,
            actual_vs_budget(),
            vec![actual, planned],
        );
        MetricResult::new(text, chart)
    }

    /// Gross margin % for every month the entity has data.
    ///
    /// Months without revenue have an undefined margin and show as gaps.
    pub fn gross_margin_trend(
        actuals: &[FinancialRecord],
        fx: &[FxRate],
        entity: &str,
    ) -> MetricResult {
        let normalized = CurrencyNormalizer::normalize(actuals, fx);
        let periods = MonthlyAggregator::aggregate_monthly(&normalized, entity);

        let months = periods.iter().map(|p| p.month.clone()).collect();
        let series = ChartSeries {
            label: None,
            values: periods.iter().map(|p| p.totals.gross_margin_pct()).collect(),
        };

        let chart = ChartSpec::line(
            format!("Gross Margin % Trend - {entity}"),
            MONTH_LABEL,
            "Gross Margin %",
            months,
            series,
        );
        MetricResult::new(format!("Gross Margin % Trend for {entity}:"), chart)
    }

    /// Opex per category for one month and entity.
    pub fn opex_breakdown(
        month: &str,
        entity: &str,
        actuals: &[FinancialRecord],
        fx: &[FxRate],
    ) -> MetricResult {
        let normalized = CurrencyNormalizer::normalize(actuals, fx);
        let by_category = MonthlyAggregator::opex_by_category(&normalized, month, entity);

        let mut lines = vec![format!("Opex breakdown for {month} ({entity}):")];
        lines.extend(
            by_category
                .iter()
                .map(|(category, amount)| format!("{category}: {}", format_usd(*amount))),
        );

        let (categories, values) = by_category.into_iter().unzip();
        let chart = ChartSpec::bar(
            format!("Opex Breakdown - {month} ({entity})"),
            USD_LABEL,
            categories,
            values,
        );
        MetricResult::new(lines.join("\n"), chart)
    }

    /// EBITDA (Revenue − COGS − Opex) for every month the entity has data.
    pub fn ebitda_trend(actuals: &[FinancialRecord], fx: &[FxRate], entity: &str) -> MetricResult {
        let normalized = CurrencyNormalizer::normalize(actuals, fx);
        let periods = MonthlyAggregator::aggregate_monthly(&normalized, entity);

        let months = periods.iter().map(|p| p.month.clone()).collect();
        let values = periods.iter().map(|p| p.totals.ebitda()).collect();

        let chart = ChartSpec::line(
            format!("EBITDA Trend - {entity}"),
            MONTH_LABEL,
            USD_LABEL,
            months,
            ChartSeries::labelled("EBITDA", values),
        );
        MetricResult::new(format!("EBITDA trend for {entity} over time."), chart)
    }

    /// Actual vs budgeted EBITDA for one month and entity.
    pub fn ebitda_vs_budget(
        month: &str,
        entity: &str,
        actuals: &[FinancialRecord],
        budget: &[FinancialRecord],
        fx: &[FxRate],
    ) -> MetricResult {
        let rates = RateTable::new(fx);
        let actual_usd = CurrencyNormalizer::normalize_with(actuals, &rates);
        let budget_usd = CurrencyNormalizer::normalize_with(budget, &rates);

        let actual = MonthlyAggregator::month_totals(&actual_usd, month, entity).ebitda();
        let planned = MonthlyAggregator::month_totals(&budget_usd, month, entity).ebitda();
        debug!(month, entity, actual, planned, "ebitda vs budget");

        let text = format!(
            "EBITDA in {month} for {entity}: Actual {} vs Budget {}",
            format_usd(actual),
            format_usd(planned)
        );
        let chart = ChartSpec::bar(
            format!("EBITDA vs Budget - {month} ({entity})"),
            USD_LABEL,
            actual_vs_budget(),
            vec![actual, planned],
        );
        MetricResult::new(text, chart)
    }

    /// Months of cash left at the average net burn of the latest three
    /// months.
    pub fn cash_runway(
        cash: &[CashRecord],
        actuals: &[FinancialRecord],
        fx: &[FxRate],
        entity: &str,
    ) -> MetricResult {
        let normalized = CurrencyNormalizer::normalize(actuals, fx);
        let periods = MonthlyAggregator::aggregate_monthly(&normalized, entity);

        let burns: Vec<f64> = periods.iter().map(|p| p.totals.net_burn()).collect();
        let avg_burn = RunwayCalculator::average_burn(&burns);
        let latest_cash = RunwayCalculator::latest_cash(cash, entity);
        let runway = RunwayCalculator::runway(latest_cash, avg_burn);
        debug!(entity, avg_burn, latest_cash, ?runway, "cash runway");

        let text = format!(
            "Cash Runway for {entity}: {} months (latest cash {}, avg burn {}/month)",
            format_runway(runway),
            format_usd(latest_cash),
            format_usd(avg_burn)
        );

        let months = periods.iter().map(|p| p.month.clone()).collect();
        let chart = ChartSpec::line(
            format!("Cash Burn Trend - {entity}"),
            MONTH_LABEL,
            USD_LABEL,
            months,
            ChartSeries::labelled("Net Burn", burns),
        )
        .with_reference_line(0.0);
        MetricResult::new(text, chart)
    }
}

fn actual_vs_budget() -> Vec<String> {
    vec!["Actual".to_string(), "Budget".to_string()]
}

// ── Tests ─────────────────────────────────────────────────────────────────────
