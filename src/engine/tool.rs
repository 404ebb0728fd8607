// Locating and checking the compression tool

use std::path::{Path, PathBuf};
use thiserror::Error;

use super::core::tool_path;

#[derive(Debug, Error)]
pub enum ToolCheckError {
    #[error("{} not found. Is the install path correct?", .0.display())]
    NotFound(PathBuf),

    #[error("{} is not a regular file", .0.display())]
    NotAFile(PathBuf),

    #[error("{} is not executable", .0.display())]
    NotExecutable(PathBuf),

    #[error("Failed to inspect {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Check that `<install>/bin/<executable>` exists and can be run.
/// Returns the resolved path.
pub fn check_tool(install_path: &Path, executable: &str) -> Result<PathBuf, ToolCheckError> {
    let path = tool_path(install_path, executable);

    let metadata = match std::fs::metadata(&path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ToolCheckError::NotFound(path));
        }
        Err(source) => return Err(ToolCheckError::Io { path, source }),
    };

    if !metadata.is_file() {
        return Err(ToolCheckError::NotAFile(path));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(ToolCheckError::NotExecutable(path));
        }
    }

    Ok(path)
}
