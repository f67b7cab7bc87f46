//! The data-gap policy.
//!
//! Rows that lack a required field, or that cannot be joined to an FX rate,
//! are dropped rather than reported. Every such decision in the crate goes
//! through [`drop_incomplete`] so the behaviour can be changed in one place.

use std::collections::HashMap;
use std::hash::Hash;

use tracing::debug;

use crate::models::{CashRecord, FinancialRecord, FxRate};

// ── Policy ────────────────────────────────────────────────────────────────────

/// Keep the rows for which `key` yields `Some`, paired with that key.
///
/// `stage` names the filtering step in the debug log. Input order is
/// preserved and the input is never modified.
pub fn drop_incomplete<'a, T, K>(
    rows: impl IntoIterator<Item = &'a T>,
    stage: &str,
    mut key: impl FnMut(&'a T) -> Option<K>,
) -> Vec<(&'a T, K)>
where
    T: 'a,
{
    let mut kept = Vec::new();
    let mut dropped = 0usize;

    for row in rows {
        match key(row) {
            Some(k) => kept.push((row, k)),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(stage, dropped, kept = kept.len(), "dropped incomplete rows");
    }

    kept
}

/// Index `(key, value)` pairs by key, keeping the first value seen for each.
pub fn first_per_key<K, V>(pairs: impl IntoIterator<Item = (K, V)>, stage: &str) -> HashMap<K, V>
where
    K: Eq + Hash,
{
    let mut map = HashMap::new();
    let mut duplicates = 0usize;

    for (k, v) in pairs {
        if map.contains_key(&k) {
            duplicates += 1;
            continue;
        }
        map.insert(k, v);
    }

    if duplicates > 0 {
        debug!(stage, duplicates, "ignored duplicate keys, first occurrence wins");
    }

    map
}

// ── Required key sets ─────────────────────────────────────────────────────────

/// A numeric cell counts as missing when absent or NaN.
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

/// `(month, currency, amount)` of a record, if all three are present.
pub fn record_key(rec: &FinancialRecord) -> Option<(&str, &str, f64)> {
    Some((
        rec.month.as_deref()?,
        rec.currency.as_deref()?,
        present(rec.amount)?,
    ))
}

/// `(month, currency, rate_to_usd)` of an FX row, if all three are present.
pub fn fx_key(rate: &FxRate) -> Option<(&str, &str, f64)> {
    Some((
        rate.month.as_deref()?,
        rate.currency.as_deref()?,
        present(rate.rate_to_usd)?,
    ))
}

/// `(month, entity, cash_usd)` of a cash row, if all three are present.
pub fn cash_key(rec: &CashRecord) -> Option<(&str, &str, f64)> {
    Some((
        rec.month.as_deref()?,
        rec.entity.as_deref()?,
        present(rec.cash_usd)?,
    ))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
