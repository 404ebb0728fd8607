//! Timer smoke test: an empty window whose events are serviced on a fixed
//! interval. Proves the terminal event loop works on this machine before a
//! long interactive export is started.

use crossterm::event::KeyCode;
use ratatui::{
    Terminal,
    backend::Backend,
    layout::Alignment,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
};
use std::io;
use std::time::{Duration, Instant};

use super::keys::KeySource;

#[derive(Debug, Clone)]
pub struct TimerSmoke {
    pub interval: Duration,
    pub ticks: u64,
    next_tick: Instant,
}

impl TimerSmoke {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            ticks: 0,
            next_tick: now + interval,
        }
    }

    /// Time left before the next tick is due
    pub fn until_next_tick(&self, now: Instant) -> Duration {
        self.next_tick.saturating_duration_since(now)
    }

    /// Record every tick that fell due by `now`; returns how many fired
    pub fn poll(&mut self, now: Instant) -> u64 {
        let mut fired = 0;
        while now >= self.next_tick {
            self.ticks += 1;
            self.next_tick += self.interval;
            fired += 1;
        }
        fired
    }
}

fn draw<B: Backend>(terminal: &mut Terminal<B>, smoke: &TimerSmoke) -> io::Result<()> {
    terminal.draw(|frame| {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Timer Smoke Test ")
            .title_alignment(Alignment::Center);
        let text = vec![
            Line::from(format!(
                "Timer every {} ms, {} ticks serviced",
                smoke.interval.as_millis(),
                smoke.ticks
            )),
            Line::from(""),
            Line::styled("[q] Close", Style::default().fg(Color::Gray)),
        ];
        frame.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(block),
            frame.area(),
        );
    })?;
    Ok(())
}

/// Run until q/Esc; returns the number of ticks serviced
pub fn run_timer_smoke<B: Backend, K: KeySource>(
    terminal: &mut Terminal<B>,
    keys: &mut K,
    interval: Duration,
) -> io::Result<u64> {
    let mut smoke = TimerSmoke::new(interval, Instant::now());
    draw(terminal, &smoke)?;

    loop {
        let wait = smoke.until_next_tick(Instant::now());
        match keys.read_key(Some(wait))? {
            Some(KeyCode::Char('q')) | Some(KeyCode::Esc) => break,
            _ => {}
        }

        if smoke.poll(Instant::now()) > 0 {
            tracing::trace!(ticks = smoke.ticks, "timer tick");
            draw(terminal, &smoke)?;
        }
    }

    Ok(smoke.ticks)
}
