use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`. Background values
/// 0–6 are dark, 7–15 light. Absent or unparseable means dark.
pub fn detect_background() -> BackgroundType {
    std::env::var("COLORFGBG")
        .ok()
        .as_deref()
        .and_then(background_from_colorfgbg)
        .unwrap_or(BackgroundType::Dark)
}

fn background_from_colorfgbg(val: &str) -> Option<BackgroundType> {
    let bg = val.split(';').next_back()?.parse::<u8>().ok()?;
    Some(if bg <= 6 {
        BackgroundType::Dark
    } else {
        BackgroundType::Light
    })
}

/// Every style the copilot UI draws with.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Chrome ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub border: Style,
    pub text: Style,
    pub dim: Style,
    pub label: Style,

    // ── Question input ───────────────────────────────────────────────────────
    pub input: Style,
    pub input_placeholder: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub success: Style,
    pub warning: Style,
    pub error: Style,

    // ── Charts ───────────────────────────────────────────────────────────────
    pub chart_title: Style,
    pub chart_axis: Style,
    /// Bars and lines for non-negative values.
    pub chart_positive: Style,
    /// Bars for negative values (drawn at zero height with a red label).
    pub chart_negative: Style,
    pub chart_line: Style,
    pub chart_reference: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            border: Style::default().fg(Color::DarkGray),
            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),

            input: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            input_placeholder: Style::default().fg(Color::DarkGray),

            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            chart_title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            chart_axis: Style::default().fg(Color::Gray),
            chart_positive: Style::default().fg(Color::Blue),
            chart_negative: Style::default().fg(Color::Red),
            chart_line: Style::default().fg(Color::Green),
            chart_reference: Style::default().fg(Color::DarkGray),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            border: Style::default().fg(Color::Gray),
            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            label: Style::default().fg(Color::DarkGray),

            input: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            input_placeholder: Style::default().fg(Color::Gray),

            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            chart_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            chart_axis: Style::default().fg(Color::DarkGray),
            chart_positive: Style::default().fg(Color::Blue),
            chart_negative: Style::default().fg(Color::Red),
            chart_line: Style::default().fg(Color::Magenta),
            chart_reference: Style::default().fg(Color::Black),
        }
    }

    /// Basic 8-colour ANSI palette without bold modifiers.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            border: Style::default().fg(Color::DarkGray),
            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),

            input: Style::default().fg(Color::White),
            input_placeholder: Style::default().fg(Color::DarkGray),

            success: Style::default().fg(Color::Green),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            chart_title: Style::default().fg(Color::White),
            chart_axis: Style::default().fg(Color::White),
            chart_positive: Style::default().fg(Color::Cyan),
            chart_negative: Style::default().fg(Color::Red),
            chart_line: Style::default().fg(Color::Green),
            chart_reference: Style::default().fg(Color::White),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            BackgroundType::Dark => Self::dark(),
        }
    }

    /// Construct a theme by name. Unknown names (including `"auto"`) detect
    /// the background.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Bar colour for a value: negative amounts stand out.
    pub fn bar_style(&self, value: f64) -> Style {
        if value < 0.0 {
            self.chart_negative
        } else {
            self.chart_positive
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
