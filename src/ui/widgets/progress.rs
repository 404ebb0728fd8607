// Step gauge for the export progress dialog

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeState {
    Running,
    Done,
}

/// One-row bar filled to `step / max_steps`
pub struct StepGauge {
    step: u64,
    max_steps: u64,
    state: GaugeState,
}

impl StepGauge {
    pub fn new(step: u64, max_steps: u64) -> Self {
        let state = if max_steps > 0 && step >= max_steps {
            GaugeState::Done
        } else {
            GaugeState::Running
        };
        Self {
            step: step.min(max_steps),
            max_steps,
            state,
        }
    }

    pub fn state(&self) -> GaugeState {
        self.state
    }

    /// Number of filled cells for a bar `width` cells wide
    pub fn filled_width(&self, width: u16) -> u16 {
        if self.max_steps == 0 {
            return 0;
        }
        ((width as u64 * self.step) / self.max_steps) as u16
    }
}

impl Widget for StepGauge {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let filled_width = self.filled_width(area.width);

        let (filled_symbol, unfilled_symbol, filled_fg, unfilled_fg) = match self.state {
            GaugeState::Running => ("█", "░", Color::White, Color::DarkGray),
            GaugeState::Done => ("█", " ", Color::Green, Color::Black),
        };

        for x in 0..area.width {
            let (symbol, fg) = if x < filled_width {
                (filled_symbol, filled_fg)
            } else {
                (unfilled_symbol, unfilled_fg)
            };
            buf.set_string(area.x + x, area.y, symbol, Style::default().fg(fg));
        }
    }
}
