// "Export:" option menu shown before an interactive run

use crossterm::event::KeyCode;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::dialogs::centered;
use crate::host::ExportSelection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChooserAction {
    Export(ExportSelection),
    Cancel,
}

#[derive(Debug, Clone, Default)]
pub struct ChooserState {
    pub selected: ExportSelection,
}

impl ChooserState {
    fn index(&self) -> usize {
        ExportSelection::ALL
            .iter()
            .position(|s| *s == self.selected)
            .unwrap_or(0)
    }

    fn step(&mut self, forward: bool) {
        let len = ExportSelection::ALL.len();
        let idx = self.index();
        let next = if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        };
        self.selected = ExportSelection::ALL[next];
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<ChooserAction> {
        match key {
            KeyCode::Down | KeyCode::Right | KeyCode::Tab | KeyCode::Char('j') => {
                self.step(true);
                None
            }
            KeyCode::Up | KeyCode::Left | KeyCode::BackTab | KeyCode::Char('k') => {
                self.step(false);
                None
            }
            KeyCode::Char('1') => {
                self.selected = ExportSelection::CurrentCamera;
                None
            }
            KeyCode::Char('2') => {
                self.selected = ExportSelection::SelectedCameras;
                None
            }
            KeyCode::Char('3') => {
                self.selected = ExportSelection::AllCameras;
                None
            }
            KeyCode::Enter => Some(ChooserAction::Export(self.selected)),
            KeyCode::Esc | KeyCode::Char('q') => Some(ChooserAction::Cancel),
            _ => None,
        }
    }
}

pub struct Chooser;

impl Chooser {
    pub fn render(frame: &mut Frame, title: &str, state: &ChooserState) {
        let modal_area = centered(frame.area(), 50, 9);
        frame.render_widget(Clear, modal_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(format!(" {} ", title))
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black));
        let inner = block.inner(modal_area);
        frame.render_widget(block, modal_area);

        let [options_area, _, button_area] = Layout::vertical([
            Constraint::Length(ExportSelection::ALL.len() as u16 + 1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(inner);

        let mut lines = vec![Line::from(Span::styled(
            "Export:",
            Style::default().fg(Color::Gray),
        ))];
        for option in ExportSelection::ALL {
            let line = if option == state.selected {
                Line::from(Span::styled(
                    format!("> {}", option.label()),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(format!("  {}", option.label()))
            };
            lines.push(line);
        }
        frame.render_widget(Paragraph::new(lines), options_area);

        let buttons = Line::from(vec![
            Span::styled(
                "[Enter]",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Export   "),
            Span::styled(
                "[Esc]",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Cancel"),
        ]);
        frame.render_widget(
            Paragraph::new(buttons).alignment(Alignment::Center),
            button_area,
        );
    }
}
