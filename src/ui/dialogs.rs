// Progress and error dialogs

use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::widgets::StepGauge;

/// Centered rectangle no larger than the frame
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}

fn ok_button() -> Line<'static> {
    Line::from(vec![Span::styled(
        "[Ok]",
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    )])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressDialogState {
    pub title: String,
    pub message: String,
    pub step: u64,
    pub max_steps: u64,
}

impl ProgressDialogState {
    pub fn new(title: &str, message: &str, max_steps: u64) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            step: 0,
            max_steps,
        }
    }

    pub fn update(&mut self, step: u64, message: &str) {
        self.step = step;
        self.message = message.to_string();
    }
}

pub struct ProgressDialog;

impl ProgressDialog {
    pub fn render(frame: &mut Frame, state: &ProgressDialogState) {
        let modal_area = centered(frame.area(), 64, 8);
        frame.render_widget(Clear, modal_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} ", state.title))
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black));
        let inner = block.inner(modal_area);
        frame.render_widget(block, modal_area);

        let [_, message_area, gauge_area, _, button_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        frame.render_widget(
            Paragraph::new(state.message.as_str()).style(Style::default().fg(Color::White)),
            message_area.inner(ratatui::layout::Margin::new(1, 0)),
        );
        frame.render_widget(
            StepGauge::new(state.step, state.max_steps),
            gauge_area.inner(ratatui::layout::Margin::new(1, 0)),
        );
        frame.render_widget(
            Paragraph::new(ok_button()).alignment(Alignment::Center),
            button_area,
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDialogState {
    pub title: String,
    pub lines: Vec<String>,
    pub scroll: usize,
}

impl ErrorDialogState {
    pub fn new(title: &str, lines: &[String]) -> Self {
        Self {
            title: title.to_string(),
            lines: lines.to_vec(),
            scroll: 0,
        }
    }

    /// Apply a key; returns true once the dialog is dismissed
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('o') | KeyCode::Char('O') => true,
            KeyCode::Down | KeyCode::Char('j') => {
                if self.scroll + 1 < self.lines.len() {
                    self.scroll += 1;
                }
                false
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
                false
            }
            _ => false,
        }
    }
}

pub struct ErrorDialog;

impl ErrorDialog {
    pub fn render(frame: &mut Frame, state: &ErrorDialogState) {
        let area = frame.area();
        let longest = state.lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let width = (longest as u16).saturating_add(4).max(40);
        let height = (state.lines.len() as u16).saturating_add(4);
        let modal_area = centered(area, width, height);
        frame.render_widget(Clear, modal_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(format!(" {} ", state.title))
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black));
        let inner = block.inner(modal_area);
        frame.render_widget(block, modal_area);

        let [list_area, button_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

        let lines: Vec<Line> = state
            .lines
            .iter()
            .skip(state.scroll)
            .map(|line| Line::from(Span::styled(line.as_str(), Style::default().fg(Color::White))))
            .collect();
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Left),
            list_area.inner(ratatui::layout::Margin::new(1, 0)),
        );
        frame.render_widget(
            Paragraph::new(ok_button()).alignment(Alignment::Center),
            button_area,
        );
    }
}
