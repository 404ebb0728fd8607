// Export engine - independent of UI

pub mod core;
pub mod driver;
pub mod runner;
pub mod tool;

pub use core::*;
pub use driver::{
    DriverOptions, ExportDriver, ExportError, ExportSummary, RunMode, TITLE, format_progress_line,
    percent,
};
pub use runner::{ProcessRunner, SystemRunner};
