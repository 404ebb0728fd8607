// Keyboard input for dialogs

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

/// Source of key presses for the dialogs
pub trait KeySource {
    /// Wait up to `timeout` (forever when `None`) for a key press
    fn read_key(&mut self, timeout: Option<Duration>) -> io::Result<Option<KeyCode>>;
}

/// Reads the real terminal through crossterm
#[derive(Debug, Default)]
pub struct CrosstermKeys;

impl KeySource for CrosstermKeys {
    fn read_key(&mut self, timeout: Option<Duration>) -> io::Result<Option<KeyCode>> {
        loop {
            if let Some(timeout) = timeout {
                if !event::poll(timeout)? {
                    return Ok(None);
                }
            }

            // Ignore release/repeat events (Windows reports both)
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(Some(key.code));
                }
            }

            if timeout.is_some() {
                return Ok(None);
            }
        }
    }
}

/// Replays a fixed sequence of keys; reports a timeout once it runs dry
#[derive(Debug, Default)]
pub struct ScriptedKeys {
    keys: VecDeque<KeyCode>,
}

impl ScriptedKeys {
    pub fn new(keys: impl IntoIterator<Item = KeyCode>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }
}

impl KeySource for ScriptedKeys {
    fn read_key(&mut self, timeout: Option<Duration>) -> io::Result<Option<KeyCode>> {
        match self.keys.pop_front() {
            Some(key) => Ok(Some(key)),
            None if timeout.is_some() => Ok(None),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no scripted keys left",
            )),
        }
    }
}
