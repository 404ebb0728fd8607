// Terminal UI using Ratatui

pub mod chooser;
pub mod dialogs;
pub mod keys;
pub mod smoke;
pub mod terminal;
pub mod tui_host;
pub mod widgets;

pub use chooser::{Chooser, ChooserAction, ChooserState};
pub use dialogs::{ErrorDialog, ErrorDialogState, ProgressDialog, ProgressDialogState};
pub use keys::{CrosstermKeys, KeySource, ScriptedKeys};
pub use smoke::run_timer_smoke;
pub use terminal::{Tui, with_terminal};
pub use tui_host::TuiHost;
