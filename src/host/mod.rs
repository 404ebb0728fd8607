//! The slice of the host application's API the exporter relies on.
//!
//! Everything the export driver needs from the matchmove host goes through
//! [`Host`]: camera enumeration and metadata, the project path, preference
//! lookup, artifact import, and the progress/error dialogs. [`scene::SceneHost`]
//! backs it with a JSON scene file; the terminal UI wraps any host to render
//! the dialogs.

pub mod scene;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Preference selecting where buffer compression files are written.
pub const PREF_BCFILE_IN_DIR: &str = "ICOMPRESS_BCFILE_IN_DIR";

/// Preference holding the custom output directory (used when
/// [`PREF_BCFILE_IN_DIR`] is `"2"`).
pub const PREF_CUSTOM_DIR: &str = "ICOMPRESS_CUSTOM_DIR";

/// Opaque handle of a camera inside the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CameraId(pub u32);

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CameraKind {
    Sequence,
    RefFrame,
}

/// Inclusive frame range of a sequence camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRange {
    pub start: i64,
    pub end: i64,
}

/// 8-bit color grading applied when the host decodes the footage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorGrading {
    pub gamma: f64,
    pub softclip: f64,
    pub black: f64,
    pub white: f64,
}

impl Default for ColorGrading {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            softclip: 0.0,
            black: 0.0,
            white: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFlags {
    /// Import the right eye of stereo SXR files
    pub sxr_right_eye: bool,
    /// Honour the EXR display window instead of the data window
    pub exr_display_window: bool,
}

/// Snapshot of a camera's metadata as reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraInfo {
    pub id: CameraId,
    pub name: String,
    pub kind: CameraKind,
    pub range: FrameRange,
    /// Footage path template (`#` marks frame-number digits); `None` when no
    /// footage is loaded
    pub footage_path: Option<String>,
    pub grading: ColorGrading,
    pub flags: ImportFlags,
}

/// Which cameras an export run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportSelection {
    #[default]
    CurrentCamera,
    SelectedCameras,
    AllCameras,
}

impl ExportSelection {
    pub const ALL: [ExportSelection; 3] = [
        ExportSelection::CurrentCamera,
        ExportSelection::SelectedCameras,
        ExportSelection::AllCameras,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ExportSelection::CurrentCamera => "Current Camera",
            ExportSelection::SelectedCameras => "Selected Cameras",
            ExportSelection::AllCameras => "All Cameras",
        }
    }

    /// Ask the host for the cameras this selection stands for
    pub fn resolve<H: Host + ?Sized>(self, host: &H) -> Vec<CameraId> {
        match self {
            ExportSelection::CurrentCamera => host.current_camera().into_iter().collect(),
            ExportSelection::SelectedCameras => host.camera_list(true),
            ExportSelection::AllCameras => host.camera_list(false),
        }
    }
}

/// Host application operations used by the exporter.
pub trait Host {
    fn current_camera(&self) -> Option<CameraId>;

    /// Cameras in scene order, optionally restricted to the selected ones
    fn camera_list(&self, selected_only: bool) -> Vec<CameraId>;

    fn camera(&self, id: CameraId) -> Option<CameraInfo>;

    /// Path of the project file, `None` while the project is unsaved
    fn project_path(&self) -> Option<PathBuf>;

    fn preference(&self, key: &str) -> Option<String>;

    /// Installation root; the compression tool lives in its `bin/`
    fn install_path(&self) -> PathBuf;

    /// Attach a freshly written buffer compression file to a camera
    fn import_buffer_compression_file(&mut self, id: CameraId, artifact: &Path) -> Result<()>;

    fn post_progress(&mut self, title: &str, message: &str, max_steps: u64);

    fn update_progress(&mut self, step: u64, message: &str);

    fn unpost_progress(&mut self);

    /// Show a modal listing one label per line
    fn show_errors(&mut self, title: &str, lines: &[String]);
}

impl<H: Host + ?Sized> Host for &mut H {
    fn current_camera(&self) -> Option<CameraId> {
        (**self).current_camera()
    }

    fn camera_list(&self, selected_only: bool) -> Vec<CameraId> {
        (**self).camera_list(selected_only)
    }

    fn camera(&self, id: CameraId) -> Option<CameraInfo> {
        (**self).camera(id)
    }

    fn project_path(&self) -> Option<PathBuf> {
        (**self).project_path()
    }

    fn preference(&self, key: &str) -> Option<String> {
        (**self).preference(key)
    }

    fn install_path(&self) -> PathBuf {
        (**self).install_path()
    }

    fn import_buffer_compression_file(&mut self, id: CameraId, artifact: &Path) -> Result<()> {
        (**self).import_buffer_compression_file(id, artifact)
    }

    fn post_progress(&mut self, title: &str, message: &str, max_steps: u64) {
        (**self).post_progress(title, message, max_steps)
    }

    fn update_progress(&mut self, step: u64, message: &str) {
        (**self).update_progress(step, message)
    }

    fn unpost_progress(&mut self) {
        (**self).unpost_progress()
    }

    fn show_errors(&mut self, title: &str, lines: &[String]) {
        (**self).show_errors(title, lines)
    }
}
