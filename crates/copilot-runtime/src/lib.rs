//! Runtime layer for CFO Copilot.
//!
//! Routes free-text questions to an analysis, validates the parameters each
//! analysis needs and exports answers as reports.

pub mod classifier;
pub mod orchestrator;
pub mod report;

pub use copilot_core as core;
pub use copilot_data as data;
