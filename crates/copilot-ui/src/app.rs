//! Interactive question/answer terminal UI.
//!
//! [`App`] owns the theme, the question being typed, and the last answer.
//! Key handling is kept separate from the terminal loop so it can be driven
//! directly in tests.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::{debug, warn};

use copilot_core::models::SourceTables;
use copilot_runtime::orchestrator::{QueryOrchestrator, Response};
use copilot_runtime::report::Report;

use crate::chart_view;
use crate::themes::Theme;

const PLACEHOLDER: &str = "Ask e.g. \"What was revenue vs budget in June 2024?\"";
const HELP: &str = "Enter ask · Ctrl+S export · Esc quit";

// ── Status ────────────────────────────────────────────────────────────────────

/// One-line feedback shown under the answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the copilot TUI.
pub struct App {
    pub theme: Theme,
    /// Question currently being typed.
    pub input: String,
    /// Question the current answer belongs to.
    pub last_question: Option<String>,
    pub last_response: Option<Response>,
    pub status: Option<Status>,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    orchestrator: QueryOrchestrator,
    tables: SourceTables,
    reports_dir: PathBuf,
}

impl App {
    pub fn new(
        theme_name: &str,
        orchestrator: QueryOrchestrator,
        tables: SourceTables,
        reports_dir: PathBuf,
    ) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            input: String::new(),
            last_question: None,
            last_response: None,
            status: None,
            should_quit: false,
            orchestrator,
            tables,
            reports_dir,
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the TUI until the user quits.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    // ── Input handling ────────────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('s') if ctrl => self.export(),
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) if !ctrl => self.input.push(c),
            _ => {}
        }
    }

    /// Answer the typed question. Blank input is ignored.
    pub fn submit(&mut self) {
        let question = self.input.trim().to_string();
        if question.is_empty() {
            return;
        }

        let response = self.orchestrator.answer(&question, &self.tables);
        debug!(intent = %response.intent, "answered question");

        self.input.clear();
        self.status = None;
        self.last_question = Some(question);
        self.last_response = Some(response);
    }

    /// Save the current answer as a report.
    pub fn export(&mut self) {
        let (Some(question), Some(response)) = (&self.last_question, &self.last_response) else {
            self.status = Some(Status::Error("Nothing to export yet".to_string()));
            return;
        };

        self.status = Some(
            match Report::new(question, response).save_to_dir(&self.reports_dir) {
                Ok(path) => Status::Info(format!("Saved {}", path.display())),
                Err(e) => {
                    warn!("Report export failed: {}", e);
                    Status::Error(format!("Export failed: {e}"))
                }
            },
        );
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame) {
        let answer_height = self
            .last_response
            .as_ref()
            .map_or(1, |r| r.text.lines().count() as u16)
            .saturating_add(2)
            .min(12);

        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(answer_height),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(frame.area());

        self.render_header(frame, chunks[0]);
        self.render_input(frame, chunks[1]);
        self.render_answer(frame, chunks[2]);

        match self.last_response.as_ref().and_then(|r| r.chart.as_ref()) {
            Some(chart) => chart_view::render_chart(frame, chunks[3], chart, &self.theme),
            None => frame.render_widget(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.border),
                chunks[3],
            ),
        }

        self.render_footer(frame, chunks[4]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled("CFO Copilot", self.theme.header),
            Span::styled(
                format!("  entity: {}", self.orchestrator.config().default_entity),
                self.theme.label,
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let content = if self.input.is_empty() {
            Span::styled(PLACEHOLDER, self.theme.input_placeholder)
        } else {
            Span::styled(format!("{}▏", self.input), self.theme.input)
        };
        frame.render_widget(
            Paragraph::new(Line::from(content)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.border)
                    .title(" Question "),
            ),
            area,
        );
    }

    fn render_answer(&self, frame: &mut Frame, area: Rect) {
        let text = match &self.last_response {
            Some(r) if r.chart.is_some() => Text::styled(r.text.clone(), self.theme.text),
            // Guidance messages carry no chart.
            Some(r) => Text::styled(r.text.clone(), self.theme.warning),
            None => Text::styled("No question asked yet.", self.theme.dim),
        };
        let title = match &self.last_question {
            Some(q) => format!(" {} ", q),
            None => " Answer ".to_string(),
        };
        frame.render_widget(
            Paragraph::new(text).wrap(Wrap { trim: false }).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.border)
                    .title(title),
            ),
            area,
        );
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let line = match &self.status {
            Some(Status::Info(msg)) => Line::from(Span::styled(msg.clone(), self.theme.success)),
            Some(Status::Error(msg)) => Line::from(Span::styled(msg.clone(), self.theme.error)),
            None => Line::from(Span::styled(HELP, self.theme.dim)),
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
