use crate::data_processors::{cash_key, drop_incomplete};
use crate::models::{CashRecord, NormalizedRecord, Runway, COGS, REVENUE};

/// Number of trailing months averaged for the burn rate.
pub const BURN_WINDOW_MONTHS: usize = 3;

// ── AccountTotals ─────────────────────────────────────────────────────────────

/// Revenue, COGS and total Opex summed over a slice of normalized records.
///
/// An empty slice yields all zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AccountTotals {
    pub revenue: f64,
    pub cogs: f64,
    /// Sum of every `Opex*` category.
    pub opex: f64,
}

impl AccountTotals {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a NormalizedRecord>) -> Self {
        let mut totals = Self::default();
        for rec in records {
            totals.add(rec);
        }
        totals
    }

    /// Accumulate one record into the matching bucket. Other categories are
    /// ignored.
    pub fn add(&mut self, rec: &NormalizedRecord) {
        if rec.is_category(REVENUE) {
            self.revenue += rec.amount_usd;
        } else if rec.is_category(COGS) {
            self.cogs += rec.amount_usd;
        } else if rec.is_opex() {
            self.opex += rec.amount_usd;
        }
    }

    /// Revenue − COGS − Opex.
    pub fn ebitda(&self) -> f64 {
        self.revenue - self.cogs - self.opex
    }

    /// COGS + Opex − Revenue. Positive means cash is being consumed.
    pub fn net_burn(&self) -> f64 {
        self.cogs + self.opex - self.revenue
    }

    /// (Revenue − COGS) / Revenue × 100, undefined when revenue is zero.
    pub fn gross_margin_pct(&self) -> Option<f64> {
        if self.revenue == 0.0 {
            return None;
        }
        Some((self.revenue - self.cogs) / self.revenue * 100.0)
    }
}

// ── RunwayCalculator ──────────────────────────────────────────────────────────

/// Stateless collection of cash-runway calculations.
pub struct RunwayCalculator;

impl RunwayCalculator {
    /// Mean of the last [`BURN_WINDOW_MONTHS`] entries of `monthly_burns`.
    ///
    /// `monthly_burns` must already be in chronological order. Fewer months
    /// are averaged when fewer exist; an empty slice averages to `0.0`.
    pub fn average_burn(monthly_burns: &[f64]) -> f64 {
        let start = monthly_burns.len().saturating_sub(BURN_WINDOW_MONTHS);
        let window = &monthly_burns[start..];
        if window.is_empty() {
            return 0.0;
        }
        window.iter().sum::<f64>() / window.len() as f64
    }

    /// Latest cash balance for `entity`.
    ///
    /// Falls back to the latest balance across every entity when `entity` has
    /// none, and to `0.0` when the table has no complete rows at all. Among
    /// rows with the same month the later row in input order wins.
    pub fn latest_cash(cash: &[CashRecord], entity: &str) -> f64 {
        let complete = drop_incomplete(cash, "cash: missing month/entity/cash_usd", cash_key);

        let for_entity = complete
            .iter()
            .filter(|(_, (_, e, _))| *e == entity)
            .map(|(_, (month, _, value))| (*month, *value));
        if let Some(value) = latest_by_month(for_entity) {
            return value;
        }

        latest_by_month(complete.iter().map(|(_, (month, _, value))| (*month, *value)))
            .unwrap_or(0.0)
    }

    /// Months of runway: `cash / avg_burn`, infinite when not burning.
    pub fn runway(latest_cash: f64, avg_burn: f64) -> Runway {
        if avg_burn > 0.0 {
            Runway::Months(latest_cash / avg_burn)
        } else {
            Runway::Infinite
        }
    }
}

/// Value of the row with the greatest month; ties go to the later row.
fn latest_by_month<'a>(rows: impl Iterator<Item = (&'a str, f64)>) -> Option<f64> {
    rows.fold(None::<(&str, f64)>, |best, (month, value)| match best {
        Some((m, _)) if month < m => best,
        _ => Some((month, value)),
    })
    .map(|(_, value)| value)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(category: &str, amount_usd: f64) -> NormalizedRecord {
        NormalizedRecord {
            month: "2024-06".to_string(),
            entity: Some("ParentCo".to_string()),
            account_category: Some(category.to_string()),
            amount: amount_usd,
            currency: "USD".to_string(),
            rate_to_usd: 1.0,
            amount_usd,
        }
    }

    // ── AccountTotals ────────────────────────────────────────────────────────

    #[test]
    fn test_totals_bucket_by_category() {
        let records = vec![
            rec("Revenue", 1000.0),
            rec("COGS", 400.0),
            rec("Opex:Marketing", 100.0),
            rec("Opex:Sales", 50.0),
            rec("Other", 999.0),
        ];
        let totals = AccountTotals::from_records(&records);
        assert!((totals.revenue - 1000.0).abs() < 1e-9);
        assert!((totals.cogs - 400.0).abs() < 1e-9);
        assert!((totals.opex - 150.0).abs() < 1e-9);
        assert!((totals.ebitda() - 450.0).abs() < 1e-9);
        assert!((totals.net_burn() + 450.0).abs() < 1e-9);
    }

    #[test]
    fn test_totals_empty_slice_is_zero() {
        let totals = AccountTotals::from_records(&Vec::<NormalizedRecord>::new());
        assert_eq!(totals, AccountTotals::default());
        assert_eq!(totals.ebitda(), 0.0);
    }

    #[test]
    fn test_ebitda_without_opex_categories() {
        let records = vec![rec("Revenue", 500.0), rec("COGS", 200.0)];
        let totals = AccountTotals::from_records(&records);
        assert!((totals.ebitda() - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_gross_margin_pct() {
        let records = vec![rec("Revenue", 1000.0), rec("COGS", 250.0)];
        let pct = AccountTotals::from_records(&records).gross_margin_pct().unwrap();
        assert!((pct - 75.0).abs() < 1e-9, "pct = {pct}");
    }

    #[test]
    fn test_gross_margin_undefined_without_revenue() {
        let records = vec![rec("COGS", 250.0)];
        assert!(AccountTotals::from_records(&records).gross_margin_pct().is_none());
    }

    // ── average_burn ─────────────────────────────────────────────────────────

    #[test]
    fn test_average_burn_uses_last_three() {
        let avg = RunwayCalculator::average_burn(&[1000.0, 10.0, 20.0, 30.0]);
        assert!((avg - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_burn_fewer_than_three() {
        let avg = RunwayCalculator::average_burn(&[10.0, 30.0]);
        assert!((avg - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_burn_empty() {
        assert_eq!(RunwayCalculator::average_burn(&[]), 0.0);
    }

    // ── latest_cash ──────────────────────────────────────────────────────────

    #[test]
    fn test_latest_cash_for_entity() {
        let cash = vec![
            CashRecord::new("2024-06", "ParentCo", 600.0),
            CashRecord::new("2024-04", "ParentCo", 400.0),
            CashRecord::new("2024-09", "EMEA", 900.0),
        ];
        assert_eq!(RunwayCalculator::latest_cash(&cash, "ParentCo"), 600.0);
    }

    #[test]
    fn test_latest_cash_falls_back_to_all_entities() {
        let cash = vec![
            CashRecord::new("2024-06", "EMEA", 600.0),
            CashRecord::new("2024-09", "APAC", 900.0),
        ];
        assert_eq!(RunwayCalculator::latest_cash(&cash, "ParentCo"), 900.0);
    }

    #[test]
    fn test_latest_cash_no_rows() {
        assert_eq!(RunwayCalculator::latest_cash(&[], "ParentCo"), 0.0);
    }

    #[test]
    fn test_latest_cash_ignores_incomplete_rows() {
        let cash = vec![
            CashRecord::new("2024-01", "ParentCo", 100.0),
            CashRecord {
                cash_usd: None,
                ..CashRecord::new("2024-12", "ParentCo", 0.0)
            },
        ];
        assert_eq!(RunwayCalculator::latest_cash(&cash, "ParentCo"), 100.0);
    }

    #[test]
    fn test_latest_cash_skips_nan_balance() {
        let cash = vec![
            CashRecord::new("2024-05", "ParentCo", 500.0),
            CashRecord::new("2024-06", "ParentCo", f64::NAN),
        ];
        assert_eq!(RunwayCalculator::latest_cash(&cash, "ParentCo"), 500.0);
    }

    #[test]
    fn test_latest_cash_same_month_later_row_wins() {
        let cash = vec![
            CashRecord::new("2024-06", "ParentCo", 100.0),
            CashRecord::new("2024-06", "ParentCo", 200.0),
        ];
        assert_eq!(RunwayCalculator::latest_cash(&cash, "ParentCo"), 200.0);
    }

    // ── runway ───────────────────────────────────────────────────────────────

    #[test]
    fn test_runway_finite() {
        assert_eq!(RunwayCalculator::runway(1200.0, 100.0), Runway::Months(12.0));
    }

    #[test]
    fn test_runway_zero_burn_is_infinite() {
        assert_eq!(RunwayCalculator::runway(1200.0, 0.0), Runway::Infinite);
    }

    #[test]
    fn test_runway_negative_burn_is_infinite() {
        assert_eq!(RunwayCalculator::runway(1200.0, -50.0), Runway::Infinite);
    }
}
