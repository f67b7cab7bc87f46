//! Conversion of financial records into USD.

use std::collections::HashMap;

use crate::data_processors::{drop_incomplete, first_per_key, fx_key, record_key};
use crate::models::{FinancialRecord, FxRate, NormalizedRecord};

/// USD rate lookup keyed by `(month, currency)`.
///
/// Built once per table; the first complete row for a pair wins.
pub struct RateTable<'a> {
    rates: HashMap<(&'a str, &'a str), f64>,
}

impl<'a> RateTable<'a> {
    pub fn new(fx: &'a [FxRate]) -> Self {
        let complete = drop_incomplete(fx, "fx: incomplete rate rows", fx_key);
        let rates = first_per_key(
            complete
                .into_iter()
                .map(|(_, (month, currency, rate))| ((month, currency), rate)),
            "fx: duplicate (month, currency)",
        );
        Self { rates }
    }

    pub fn rate(&self, month: &str, currency: &str) -> Option<f64> {
        self.rates.get(&(month, currency)).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Stateless converter from raw records to [`NormalizedRecord`]s.
pub struct CurrencyNormalizer;

impl CurrencyNormalizer {
    /// Convert every record that has a complete key set and a matching FX
    /// rate; everything else is dropped.
    ///
    /// Neither input is modified. Output order follows `records`.
    pub fn normalize(records: &[FinancialRecord], fx: &[FxRate]) -> Vec<NormalizedRecord> {
        let rates = RateTable::new(fx);
        Self::normalize_with(records, &rates)
    }

    /// Same as [`normalize`](Self::normalize) with a prebuilt rate table, so
    /// actuals and budget can share one lookup.
    pub fn normalize_with(records: &[FinancialRecord], rates: &RateTable<'_>) -> Vec<NormalizedRecord> {
        let complete = drop_incomplete(records, "records: missing month/currency/amount", record_key);

        drop_incomplete(
            complete.iter(),
            "records: no matching fx rate",
            |(_, (month, currency, _))| rates.rate(month, currency),
        )
        .into_iter()
        .map(|((rec, (month, currency, amount)), rate)| NormalizedRecord {
            month: month.to_string(),
            entity: rec.entity.clone(),
            account_category: rec.account_category.clone(),
            amount: *amount,
            currency: currency.to_string(),
            rate_to_usd: rate,
            amount_usd: amount * rate,
        })
        .collect()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
