//! Turns a [`ChartSpec`] into terminal cells.
//!
//! Bar specs become a [`BarChart`], line specs a [`Chart`] with one
//! [`Dataset`] per series plus one for the reference line. The same drawing
//! code serves the live UI and [`render_to_lines`], which draws into an
//! off-screen buffer for plain-text output.

use copilot_core::chart::{ChartKind, ChartSpec};
use copilot_core::formatting::{format_number, format_usd};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph,
        Widget,
    },
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::themes::Theme;

const MIN_BAR_WIDTH: u16 = 3;
const MAX_BAR_WIDTH: u16 = 16;

// ── Public API ────────────────────────────────────────────────────────────────

/// Draw `spec` into `area` of the current frame.
pub fn render_chart(frame: &mut Frame, area: Rect, spec: &ChartSpec, theme: &Theme) {
    render_chart_in(frame.buffer_mut(), area, spec, theme);
}

/// Draw `spec` into `area` of an arbitrary buffer.
pub fn render_chart_in(buf: &mut Buffer, area: Rect, spec: &ChartSpec, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(Span::styled(format!(" {} ", spec.title), theme.chart_title));

    if spec.value_bounds().is_none() {
        Paragraph::new(Line::from(Span::styled("No data for this chart", theme.dim)))
            .block(block)
            .render(area, buf);
        return;
    }

    match spec.kind {
        ChartKind::Bar => render_bars(buf, area, spec, theme, block),
        ChartKind::Line => render_lines(buf, area, spec, theme, block),
    }
}

/// Render `spec` off-screen and return the rows as plain text, trailing
/// spaces removed.
pub fn render_to_lines(spec: &ChartSpec, width: u16, height: u16) -> Vec<String> {
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    render_chart_in(&mut buf, area, spec, &Theme::classic());

    (area.top()..area.bottom())
        .map(|y| {
            let row: String = (area.left()..area.right())
                .filter_map(|x| buf.cell((x, y)).map(|c| c.symbol().to_string()))
                .collect();
            row.trim_end().to_string()
        })
        .collect()
}

/// Truncate `text` to at most `max_width` terminal columns.
pub fn fit_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max_width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out
}

// ── Bar charts ────────────────────────────────────────────────────────────────

fn render_bars(buf: &mut Buffer, area: Rect, spec: &ChartSpec, theme: &Theme, block: Block) {
    let values: Vec<f64> = spec
        .series
        .first()
        .map(|s| s.values.iter().map(|v| v.unwrap_or(0.0)).collect())
        .unwrap_or_default();

    let count = spec.categories.len().max(1) as u16;
    let inner_width = area.width.saturating_sub(2);
    let bar_width = (inner_width / count)
        .saturating_sub(1)
        .clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH);

    let bars: Vec<Bar> = spec
        .categories
        .iter()
        .zip(values.iter().copied())
        .map(|(category, value)| {
            Bar::default()
                // Bars cannot go below the axis; negative amounts show as an
                // empty bar carrying the signed label.
                .value(value.max(0.0).round() as u64)
                .text_value(format_usd(value))
                .label(Line::from(fit_width(category, bar_width as usize)))
                .style(theme.bar_style(value))
        })
        .collect();

    let max = values.iter().copied().fold(0.0_f64, f64::max).round() as u64;

    BarChart::default()
        .block(block)
        .bar_width(bar_width)
        .bar_gap(1)
        .label_style(theme.label)
        .max(max.max(1))
        .data(BarGroup::default().bars(&bars))
        .render(area, buf);
}

// ── Line charts ───────────────────────────────────────────────────────────────

fn render_lines(buf: &mut Buffer, area: Rect, spec: &ChartSpec, theme: &Theme, block: Block) {
    let (lo, hi) = padded_bounds(spec);
    let last_x = spec.categories.len().saturating_sub(1).max(1) as f64;

    // Undefined points are left out, so the line bridges the gap.
    let series_points: Vec<(Option<&str>, Vec<(f64, f64)>)> = spec
        .series
        .iter()
        .map(|s| {
            let points = s
                .values
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.map(|y| (i as f64, y)))
                .collect();
            (s.label.as_deref(), points)
        })
        .collect();
    let reference_points: Vec<(f64, f64)> = spec
        .reference_line
        .map(|y| vec![(0.0, y), (last_x, y)])
        .unwrap_or_default();

    let mut datasets: Vec<Dataset> = series_points
        .iter()
        .map(|(label, points)| {
            let dataset = Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(theme.chart_line)
                .data(points);
            match label {
                Some(name) => dataset.name(name.to_string()),
                None => dataset,
            }
        })
        .collect();
    if !reference_points.is_empty() {
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Line)
                .style(theme.chart_reference)
                .data(&reference_points),
        );
    }

    let x_axis = Axis::default()
        .title(spec.x_label.clone().unwrap_or_default())
        .style(theme.chart_axis)
        .bounds([0.0, last_x])
        .labels(x_labels(&spec.categories));
    let y_axis = Axis::default()
        .title(spec.y_label.clone())
        .style(theme.chart_axis)
        .bounds([lo, hi])
        .labels(
            [lo, (lo + hi) / 2.0, hi]
                .into_iter()
                .map(|v| axis_value(spec, v))
                .collect::<Vec<_>>(),
        );

    Chart::new(datasets)
        .block(block)
        .x_axis(x_axis)
        .y_axis(y_axis)
        .render(area, buf);
}

/// First, middle and last category; fewer when there are fewer.
fn x_labels(categories: &[String]) -> Vec<String> {
    match categories.len() {
        0 => Vec::new(),
        1 | 2 => categories.to_vec(),
        n => vec![
            categories[0].clone(),
            categories[n / 2].clone(),
            categories[n - 1].clone(),
        ],
    }
}

fn padded_bounds(spec: &ChartSpec) -> (f64, f64) {
    let (lo, hi) = spec.value_bounds().unwrap_or((0.0, 1.0));
    if (hi - lo).abs() < f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

fn axis_value(spec: &ChartSpec, value: f64) -> String {
    if spec.y_label == "USD" {
        format_usd(value)
    } else {
        format_number(value, 1)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
