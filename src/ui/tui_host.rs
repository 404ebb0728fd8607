// Host wrapper that renders the host dialogs in the terminal

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::{Terminal, backend::Backend};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::chooser::{Chooser, ChooserAction, ChooserState};
use super::dialogs::{ErrorDialog, ErrorDialogState, ProgressDialog, ProgressDialogState};
use super::keys::KeySource;
use crate::host::{CameraId, CameraInfo, ExportSelection, Host};

/// Delegates scene queries to `H` and draws the progress and error dialogs.
///
/// Drawing failures never abort an export; they are traced and the run goes
/// on without the dialog.
pub struct TuiHost<'t, H, B: Backend, K> {
    inner: H,
    terminal: &'t mut Terminal<B>,
    keys: K,
    progress: Option<ProgressDialogState>,
}

impl<'t, H: Host, B: Backend, K: KeySource> TuiHost<'t, H, B, K> {
    pub fn new(inner: H, terminal: &'t mut Terminal<B>, keys: K) -> Self {
        Self {
            inner,
            terminal,
            keys,
            progress: None,
        }
    }

    pub fn progress(&self) -> Option<&ProgressDialogState> {
        self.progress.as_ref()
    }

    /// Show the "Export:" menu; `None` when the user cancels
    pub fn choose_selection(&mut self, title: &str) -> io::Result<Option<ExportSelection>> {
        let mut state = ChooserState::default();
        loop {
            self.terminal
                .draw(|frame| Chooser::render(frame, title, &state))?;
            let Some(key) = self.keys.read_key(None)? else {
                continue;
            };
            match state.handle_key(key) {
                Some(ChooserAction::Export(selection)) => return Ok(Some(selection)),
                Some(ChooserAction::Cancel) => return Ok(None),
                None => {}
            }
        }
    }

    fn draw_progress(&mut self) {
        let Some(state) = self.progress.as_ref() else {
            return;
        };
        if let Err(e) = self
            .terminal
            .draw(|frame| ProgressDialog::render(frame, state))
        {
            tracing::warn!(error = %e, "failed to draw progress dialog");
        }

        // Give the UI a turn; the Ok action cannot interrupt the export
        if let Ok(Some(KeyCode::Enter)) = self.keys.read_key(Some(Duration::ZERO)) {
            tracing::debug!("progress dialog Ok pressed while export is running");
        }
    }

    fn run_error_dialog(&mut self, state: &mut ErrorDialogState) -> io::Result<()> {
        loop {
            self.terminal
                .draw(|frame| ErrorDialog::render(frame, state))?;
            if let Some(key) = self.keys.read_key(None)? {
                if state.handle_key(key) {
                    return Ok(());
                }
            }
        }
    }
}

impl<H: Host, B: Backend, K: KeySource> Host for TuiHost<'_, H, B, K> {
    fn current_camera(&self) -> Option<CameraId> {
        self.inner.current_camera()
    }

    fn camera_list(&self, selected_only: bool) -> Vec<CameraId> {
        self.inner.camera_list(selected_only)
    }

    fn camera(&self, id: CameraId) -> Option<CameraInfo> {
        self.inner.camera(id)
    }

    fn project_path(&self) -> Option<PathBuf> {
        self.inner.project_path()
    }

    fn preference(&self, key: &str) -> Option<String> {
        self.inner.preference(key)
    }

    fn install_path(&self) -> PathBuf {
        self.inner.install_path()
    }

    fn import_buffer_compression_file(&mut self, id: CameraId, artifact: &Path) -> Result<()> {
        self.inner.import_buffer_compression_file(id, artifact)
    }

    fn post_progress(&mut self, title: &str, message: &str, max_steps: u64) {
        self.progress = Some(ProgressDialogState::new(title, message, max_steps));
        self.draw_progress();
    }

    fn update_progress(&mut self, step: u64, message: &str) {
        if let Some(state) = self.progress.as_mut() {
            state.update(step, message);
            self.draw_progress();
        }
    }

    fn unpost_progress(&mut self) {
        self.progress = None;
        if let Err(e) = self.terminal.clear() {
            tracing::warn!(error = %e, "failed to clear terminal");
        }
    }

    fn show_errors(&mut self, title: &str, lines: &[String]) {
        let mut state = ErrorDialogState::new(title, lines);
        if let Err(e) = self.run_error_dialog(&mut state) {
            tracing::warn!(error = %e, "error dialog failed");
            for line in lines {
                tracing::error!("{}", line);
            }
        }
    }
}
