use serde::{Deserialize, Serialize};
use std::fmt;

/// Account category holding revenue lines.
pub const REVENUE: &str = "Revenue";

/// Account category holding cost of goods sold.
pub const COGS: &str = "COGS";

/// Prefix shared by every operating-expense category (`Opex:Marketing`, ...).
pub const OPEX_PREFIX: &str = "Opex";

/// Returns `true` when `category` is summed into total operating expense.
pub fn is_opex(category: &str) -> bool {
    category.starts_with(OPEX_PREFIX)
}

// ── Source rows ───────────────────────────────────────────────────────────────

/// One row of the actuals or budget table.
///
/// Every column is optional so that blank cells survive loading; whether a
/// row is usable is decided later by
/// [`drop_incomplete`](crate::data_processors::drop_incomplete).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    /// Period key in `YYYY-MM` form.
    #[serde(default)]
    pub month: Option<String>,
    /// Reporting entity, e.g. `"ParentCo"`.
    #[serde(default)]
    pub entity: Option<String>,
    /// Account category, e.g. `"Revenue"`, `"COGS"`, `"Opex:Marketing"`.
    #[serde(default)]
    pub account_category: Option<String>,
    /// Amount in the row's own currency.
    #[serde(default)]
    pub amount: Option<f64>,
    /// ISO currency code of `amount`.
    #[serde(default)]
    pub currency: Option<String>,
}

impl FinancialRecord {
    /// Convenience constructor for a fully populated row.
    pub fn new(month: &str, entity: &str, category: &str, amount: f64, currency: &str) -> Self {
        Self {
            month: Some(month.to_string()),
            entity: Some(entity.to_string()),
            account_category: Some(category.to_string()),
            amount: Some(amount),
            currency: Some(currency.to_string()),
        }
    }
}

/// Monthly conversion rate from `currency` into USD.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FxRate {
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    /// Multiplier that converts one unit of `currency` into USD.
    #[serde(default)]
    pub rate_to_usd: Option<f64>,
}

impl FxRate {
    pub fn new(month: &str, currency: &str, rate_to_usd: f64) -> Self {
        Self {
            month: Some(month.to_string()),
            currency: Some(currency.to_string()),
            rate_to_usd: Some(rate_to_usd),
        }
    }
}

/// End-of-period cash balance, already expressed in USD.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashRecord {
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub cash_usd: Option<f64>,
}

impl CashRecord {
    pub fn new(month: &str, entity: &str, cash_usd: f64) -> Self {
        Self {
            month: Some(month.to_string()),
            entity: Some(entity.to_string()),
            cash_usd: Some(cash_usd),
        }
    }
}

/// A [`FinancialRecord`] that could be converted to USD.
///
/// Only produced by [`CurrencyNormalizer`](crate::currency::CurrencyNormalizer);
/// the key fields and `amount_usd` are therefore always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub month: String,
    pub entity: Option<String>,
    pub account_category: Option<String>,
    pub amount: f64,
    pub currency: String,
    pub rate_to_usd: f64,
    pub amount_usd: f64,
}

impl NormalizedRecord {
    /// Whether this record belongs to `entity`.
    pub fn is_entity(&self, entity: &str) -> bool {
        self.entity.as_deref() == Some(entity)
    }

    /// Whether this record's category equals `category` exactly.
    pub fn is_category(&self, category: &str) -> bool {
        self.account_category.as_deref() == Some(category)
    }

    /// Whether this record is an operating expense (`Opex*` prefix).
    pub fn is_opex(&self) -> bool {
        self.account_category.as_deref().is_some_and(is_opex)
    }
}

/// The four read-only input tables every query is answered from.
#[derive(Debug, Clone, Default)]
pub struct SourceTables {
    pub actuals: Vec<FinancialRecord>,
    pub budget: Vec<FinancialRecord>,
    pub fx: Vec<FxRate>,
    /// `None` when no cash table was supplied at all.
    pub cash: Option<Vec<CashRecord>>,
}

// ── Query vocabulary ──────────────────────────────────────────────────────────

/// The bounded set of analyses a question can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    RevenueVsBudget,
    GrossMarginTrend,
    OpexBreakdown,
    EbitdaTrend,
    EbitdaVsBudget,
    CashRunway,
    Unknown,
}

impl Intent {
    /// Stable snake_case tag, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RevenueVsBudget => "revenue_vs_budget",
            Self::GrossMarginTrend => "gross_margin_trend",
            Self::OpexBreakdown => "opex_breakdown",
            Self::EbitdaTrend => "ebitda_trend",
            Self::EbitdaVsBudget => "ebitda_vs_budget",
            Self::CashRunway => "cash_runway",
            Self::Unknown => "unknown",
        }
    }

    /// Analyses that only make sense for a single month.
    pub fn requires_month(&self) -> bool {
        matches!(
            self,
            Self::RevenueVsBudget | Self::OpexBreakdown | Self::EbitdaVsBudget
        )
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters parsed from a single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryContext {
    pub intent: Intent,
    /// `YYYY-MM`, when the question named a month.
    pub month: Option<String>,
    pub entity: String,
}

/// Months of cash left at the current burn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Runway {
    Months(f64),
    /// Average burn is zero or negative: the business is not consuming cash.
    Infinite,
}

// ── Tests ──────────────────────────────────────────────────────────────────────
