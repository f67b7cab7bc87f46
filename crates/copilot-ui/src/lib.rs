//! Terminal UI layer for CFO Copilot.
//!
//! Provides themes, the chart renderer that turns a chart spec into
//! [`ratatui`] widgets (or plain text lines for one-shot output), and the
//! interactive question/answer application loop.

pub mod app;
pub mod chart_view;
pub mod themes;

pub use copilot_core as core;
