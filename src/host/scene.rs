// Scene-file backed host

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{
    CameraId, CameraInfo, CameraKind, ColorGrading, FrameRange, Host, ImportFlags,
};
use crate::config::Config;

/// One camera entry of a scene file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneCamera {
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: CameraKind,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub start: i64,
    #[serde(default)]
    pub end: i64,
    #[serde(default)]
    pub footage_path: Option<String>,
    #[serde(default = "default_gamma")]
    pub gamma: f64,
    #[serde(default)]
    pub softclip: f64,
    #[serde(default)]
    pub black: f64,
    #[serde(default = "default_white")]
    pub white: f64,
    #[serde(default)]
    pub import_sxr_right_eye: bool,
    #[serde(default)]
    pub import_exr_display_window: bool,
    /// Set once a buffer compression file has been imported
    #[serde(default)]
    pub buffer_compression_file: Option<PathBuf>,
}

fn default_kind() -> CameraKind {
    CameraKind::Sequence
}

fn default_gamma() -> f64 {
    1.0
}

fn default_white() -> f64 {
    1.0
}

impl SceneCamera {
    pub fn sequence(name: &str, start: i64, end: i64, footage_path: Option<&str>) -> Self {
        let grading = ColorGrading::default();
        Self {
            name: name.to_string(),
            kind: CameraKind::Sequence,
            selected: false,
            start,
            end,
            footage_path: footage_path.map(str::to_string),
            gamma: grading.gamma,
            softclip: grading.softclip,
            black: grading.black,
            white: grading.white,
            import_sxr_right_eye: false,
            import_exr_display_window: false,
            buffer_compression_file: None,
        }
    }
}

/// On-disk scene description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub project_path: Option<PathBuf>,
    #[serde(default)]
    pub install_path: Option<PathBuf>,
    #[serde(default)]
    pub current_camera: Option<u32>,
    #[serde(default)]
    pub preferences: BTreeMap<String, String>,
    #[serde(default)]
    pub cameras: Vec<SceneCamera>,
}

/// Headless host over a [`Scene`]; dialogs only produce trace events
#[derive(Debug, Clone, Default)]
pub struct SceneHost {
    scene: Scene,
    /// Config-level preference defaults
    fallback_preferences: BTreeMap<String, String>,
    fallback_install_path: Option<PathBuf>,
    source: Option<PathBuf>,
    dirty: bool,
}

impl SceneHost {
    pub fn new(scene: Scene) -> Self {
        Self {
            scene,
            ..Self::default()
        }
    }

    /// Read a scene file, layering the config's preferences and install path
    /// underneath it
    pub fn load(path: &Path, config: &Config) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file: {}", path.display()))?;
        let scene: Scene = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse scene file: {}", path.display()))?;

        if let Some(current) = scene.current_camera {
            if current as usize >= scene.cameras.len() {
                bail!(
                    "Scene {} names camera #{} as current but has {} cameras",
                    path.display(),
                    current,
                    scene.cameras.len()
                );
            }
        }

        tracing::debug!(scene = %path.display(), cameras = scene.cameras.len(), "loaded scene");

        Ok(Self {
            scene,
            fallback_preferences: config.preferences.clone(),
            fallback_install_path: config.tool.install_path.clone(),
            source: Some(path.to_path_buf()),
            dirty: false,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Whether an import changed the scene since it was loaded
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the scene back to the file it was loaded from
    pub fn save(&mut self) -> Result<()> {
        let path = self
            .source
            .clone()
            .context("Scene was not loaded from a file")?;
        self.save_to(&path)?;
        self.dirty = false;
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(&self.scene).context("Failed to serialize scene")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write scene file: {}", path.display()))
    }

    fn entry(&self, id: CameraId) -> Option<&SceneCamera> {
        self.scene.cameras.get(id.0 as usize)
    }
}

impl Host for SceneHost {
    fn current_camera(&self) -> Option<CameraId> {
        self.scene.current_camera.map(CameraId)
    }

    fn camera_list(&self, selected_only: bool) -> Vec<CameraId> {
        self.scene
            .cameras
            .iter()
            .enumerate()
            .filter(|(_, cam)| !selected_only || cam.selected)
            .map(|(idx, _)| CameraId(idx as u32))
            .collect()
    }

    fn camera(&self, id: CameraId) -> Option<CameraInfo> {
        let cam = self.entry(id)?;
        Some(CameraInfo {
            id,
            name: cam.name.clone(),
            kind: cam.kind,
            range: FrameRange {
                start: cam.start,
                end: cam.end,
            },
            footage_path: cam.footage_path.clone().filter(|p| !p.is_empty()),
            grading: ColorGrading {
                gamma: cam.gamma,
                softclip: cam.softclip,
                black: cam.black,
                white: cam.white,
            },
            flags: ImportFlags {
                sxr_right_eye: cam.import_sxr_right_eye,
                exr_display_window: cam.import_exr_display_window,
            },
        })
    }

    fn project_path(&self) -> Option<PathBuf> {
        self.scene
            .project_path
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
    }

    fn preference(&self, key: &str) -> Option<String> {
        self.scene
            .preferences
            .get(key)
            .or_else(|| self.fallback_preferences.get(key))
            .cloned()
    }

    fn install_path(&self) -> PathBuf {
        self.scene
            .install_path
            .clone()
            .or_else(|| self.fallback_install_path.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn import_buffer_compression_file(&mut self, id: CameraId, artifact: &Path) -> Result<()> {
        if !artifact.is_file() {
            bail!("{} is not a file", artifact.display());
        }
        let cam = self
            .scene
            .cameras
            .get_mut(id.0 as usize)
            .with_context(|| format!("Camera {} does not exist", id))?;
        cam.buffer_compression_file = Some(artifact.to_path_buf());
        self.dirty = true;
        tracing::info!(camera = %cam.name, artifact = %artifact.display(), "imported buffer compression file");
        Ok(())
    }

    fn post_progress(&mut self, title: &str, message: &str, max_steps: u64) {
        tracing::debug!(title, message, max_steps, "progress posted");
    }

    fn update_progress(&mut self, step: u64, message: &str) {
        tracing::debug!(step, message, "progress");
    }

    fn unpost_progress(&mut self) {
        tracing::debug!("progress unposted");
    }

    fn show_errors(&mut self, title: &str, lines: &[String]) {
        for line in lines {
            tracing::error!(title, "{}", line);
        }
    }
}
