use super::types::JobTarget;
use crate::host::{Host, PREF_BCFILE_IN_DIR, PREF_CUSTOM_DIR};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where buffer compression files are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDirMode {
    /// Next to the footage (default)
    ImageDirectory,
    /// Next to the project file
    ProjectDirectory,
    /// A configured directory
    CustomDirectory(Option<String>),
}

impl OutputDirMode {
    /// Read the output switch from host preferences ("1" project, "2" custom)
    pub fn from_preferences<H: Host + ?Sized>(host: &H) -> Self {
        match host.preference(PREF_BCFILE_IN_DIR).as_deref().map(str::trim) {
            Some("1") => OutputDirMode::ProjectDirectory,
            Some("2") => OutputDirMode::CustomDirectory(
                host.preference(PREF_CUSTOM_DIR)
                    .filter(|dir| !dir.trim().is_empty()),
            ),
            _ => OutputDirMode::ImageDirectory,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("Can not save buffer to project directory. Project is not saved.")]
    ProjectNotSaved,

    #[error("Can not save buffer to custom directory. No directory is configured.")]
    CustomDirNotSet,
}

/// Work out the target path template and the tool's output directory.
///
/// `project_path` is the project file, not its directory.
pub fn resolve_target(
    mode: &OutputDirMode,
    source_path: &str,
    project_path: Option<&Path>,
) -> Result<JobTarget, TargetError> {
    let file_name = Path::new(source_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let target_path = match mode {
        OutputDirMode::ImageDirectory => source_path.to_string(),
        OutputDirMode::ProjectDirectory => {
            let project_dir = project_path
                .and_then(Path::parent)
                .filter(|dir| !dir.as_os_str().is_empty())
                .ok_or(TargetError::ProjectNotSaved)?;
            project_dir.join(&file_name).to_string_lossy().into_owned()
        }
        OutputDirMode::CustomDirectory(dir) => {
            let dir = dir.as_deref().ok_or(TargetError::CustomDirNotSet)?;
            Path::new(dir).join(&file_name).to_string_lossy().into_owned()
        }
    };

    let out_dir = Path::new(&target_path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    Ok(JobTarget {
        target_path,
        out_dir,
    })
}
