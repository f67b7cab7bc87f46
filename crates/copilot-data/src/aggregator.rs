//! Grouping of normalized records by month and account category.

use std::collections::BTreeMap;

use copilot_core::calculations::AccountTotals;
use copilot_core::models::NormalizedRecord;

// ── MonthlyPeriod ─────────────────────────────────────────────────────────────

/// Everything one entity booked in one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPeriod {
    /// `"YYYY-MM"`.
    pub month: String,
    /// Revenue, COGS and Opex totals.
    pub totals: AccountTotals,
    /// USD sum per exact category name. Records without a category are not
    /// listed here.
    pub category_totals: BTreeMap<String, f64>,
}

impl MonthlyPeriod {
    fn new(month: impl Into<String>) -> Self {
        Self {
            month: month.into(),
            totals: AccountTotals::default(),
            category_totals: BTreeMap::new(),
        }
    }

    fn add_record(&mut self, rec: &NormalizedRecord) {
        self.totals.add(rec);
        if let Some(category) = &rec.account_category {
            *self.category_totals.entry(category.clone()).or_insert(0.0) += rec.amount_usd;
        }
    }
}

// ── MonthlyAggregator ─────────────────────────────────────────────────────────

/// Stateless helper that slices normalized records by entity and month.
pub struct MonthlyAggregator;

impl MonthlyAggregator {
    /// One period per month present for `entity`, sorted by month
    /// (lexicographic `YYYY-MM`, which is also chronological).
    pub fn aggregate_monthly(records: &[NormalizedRecord], entity: &str) -> Vec<MonthlyPeriod> {
        let mut map: BTreeMap<&str, MonthlyPeriod> = BTreeMap::new();

        for rec in records.iter().filter(|r| r.is_entity(entity)) {
            map.entry(rec.month.as_str())
                .or_insert_with(|| MonthlyPeriod::new(rec.month.as_str()))
                .add_record(rec);
        }

        map.into_values().collect()
    }

    /// Totals for a single month and entity; all zeros when nothing matches.
    pub fn month_totals(records: &[NormalizedRecord], month: &str, entity: &str) -> AccountTotals {
        AccountTotals::from_records(Self::slice(records, month, entity))
    }

    /// USD sum of one exact category for a month and entity.
    pub fn category_sum(
        records: &[NormalizedRecord],
        month: &str,
        entity: &str,
        category: &str,
    ) -> f64 {
        Self::slice(records, month, entity)
            .filter(|r| r.is_category(category))
            .map(|r| r.amount_usd)
            .sum()
    }

    /// USD sum per Opex category for a month and entity, ordered by
    /// category name.
    pub fn opex_by_category(
        records: &[NormalizedRecord],
        month: &str,
        entity: &str,
    ) -> BTreeMap<String, f64> {
        let mut out: BTreeMap<String, f64> = BTreeMap::new();
        for rec in Self::slice(records, month, entity).filter(|r| r.is_opex()) {
            if let Some(category) = &rec.account_category {
                *out.entry(category.clone()).or_insert(0.0) += rec.amount_usd;
            }
        }
        out
    }

    fn slice<'a>(
        records: &'a [NormalizedRecord],
        month: &'a str,
        entity: &'a str,
    ) -> impl Iterator<Item = &'a NormalizedRecord> + 'a {
        records
            .iter()
            .filter(move |r| r.month == month && r.is_entity(entity))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(month: &str, entity: &str, category: &str, amount_usd: f64) -> NormalizedRecord {
        NormalizedRecord {
            month: month.to_string(),
            entity: Some(entity.to_string()),
            account_category: Some(category.to_string()),
            amount: amount_usd,
            currency: "USD".to_string(),
            rate_to_usd: 1.0,
            amount_usd,
        }
    }

    fn sample() -> Vec<NormalizedRecord> {
        vec![
            rec("2024-02", "ParentCo", "Revenue", 200.0),
            rec("2024-01", "ParentCo", "Revenue", 100.0),
            rec("2024-01", "ParentCo", "COGS", 40.0),
            rec("2024-01", "ParentCo", "Opex:Sales", 10.0),
            rec("2024-01", "ParentCo", "Opex:Sales", 5.0),
            rec("2024-01", "ParentCo", "Opex:Marketing", 20.0),
            rec("2024-01", "EMEA", "Revenue", 999.0),
            rec("2023-12", "EMEA", "Revenue", 999.0),
        ]
    }

    // ── aggregate_monthly ─────────────────────────────────────────────────────

    #[test]
    fn test_monthly_groups_and_sorts() {
        let periods = MonthlyAggregator::aggregate_monthly(&sample(), "ParentCo");
        let months: Vec<&str> = periods.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, vec!["2024-01", "2024-02"]);
    }

    #[test]
    fn test_monthly_totals_per_period() {
        let periods = MonthlyAggregator::aggregate_monthly(&sample(), "ParentCo");
        let jan = &periods[0].totals;
        assert!((jan.revenue - 100.0).abs() < 1e-9);
        assert!((jan.cogs - 40.0).abs() < 1e-9);
        assert!((jan.opex - 35.0).abs() < 1e-9);
        assert!((periods[1].totals.revenue - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_category_totals() {
        let periods = MonthlyAggregator::aggregate_monthly(&sample(), "ParentCo");
        assert_eq!(periods[0].category_totals.get("Opex:Sales"), Some(&15.0));
        assert_eq!(periods[0].category_totals.len(), 4);
    }

    #[test]
    fn test_monthly_unknown_entity_is_empty() {
        assert!(MonthlyAggregator::aggregate_monthly(&sample(), "APAC").is_empty());
    }

    #[test]
    fn test_monthly_skips_record_without_entity() {
        let mut records = sample();
        records.push(NormalizedRecord {
            entity: None,
            ..rec("2024-03", "ParentCo", "Revenue", 1.0)
        });
        let periods = MonthlyAggregator::aggregate_monthly(&records, "ParentCo");
        assert_eq!(periods.len(), 2);
    }

    // ── month slices ──────────────────────────────────────────────────────────

    #[test]
    fn test_category_sum_exact_match() {
        let records = sample();
        assert_eq!(MonthlyAggregator::category_sum(&records, "2024-01", "ParentCo", "Revenue"), 100.0);
        assert_eq!(MonthlyAggregator::category_sum(&records, "2024-05", "ParentCo", "Revenue"), 0.0);
    }

    #[test]
    fn test_month_totals_empty_slice() {
        let totals = MonthlyAggregator::month_totals(&sample(), "2030-01", "ParentCo");
        assert_eq!(totals, AccountTotals::default());
    }

    #[test]
    fn test_opex_by_category_sorted_and_separate() {
        let opex = MonthlyAggregator::opex_by_category(&sample(), "2024-01", "ParentCo");
        let keys: Vec<&str> = opex.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Opex:Marketing", "Opex:Sales"]);
        assert!((opex["Opex:Sales"] - 15.0).abs() < 1e-9);
        assert!((opex["Opex:Marketing"] - 20.0).abs() < 1e-9);
    }
}
