use anyhow::Result;
use chrono::Local;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default debug log location: bcexport.log in the current directory
pub fn default_debug_log_path() -> Result<PathBuf> {
    Ok(std::env::current_dir()?.join("bcexport.log"))
}

/// Append a timestamped entry to the debug log, creating it if needed
pub fn write_debug_log(path: &Path, message: &str) -> Result<()> {
    use std::fs::OpenOptions;

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    writeln!(file, "[{}] {}", timestamp, message)?;
    Ok(())
}
