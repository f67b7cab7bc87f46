//! Core domain layer for CFO Copilot.
//!
//! Source table models, the data-gap policy, currency normalization, the
//! account arithmetic shared by every analysis, chart descriptions,
//! formatting helpers, settings and the error type.

pub mod calculations;
pub mod chart;
pub mod currency;
pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;
