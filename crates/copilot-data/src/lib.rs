//! Data layer for CFO Copilot.
//!
//! Loads the actuals, budget, FX and cash tables from CSV, groups normalized
//! records by month and category, and implements the six finance analyses.

pub mod aggregator;
pub mod metrics;
pub mod reader;

pub use copilot_core as core;
