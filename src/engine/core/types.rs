use crate::host::{CameraId, ColorGrading, ImportFlags};
use serde::Serialize;
use std::path::PathBuf;

/// Suffix of lines reporting per-frame progress
const PROGRESS_SUFFIX: &str = "image files processed";

/// Prefix of lines reporting a tool failure
const ERROR_PREFIX: &str = "Error";

/// One planned export: a sequence camera and its step estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraJob {
    pub camera: CameraId,
    pub name: String,
    pub start: i64,
    pub end: i64,
    pub frames: u64,
    pub steps: u64,
    pub source_path: Option<String>,
    #[serde(skip)]
    pub grading: ColorGrading,
    #[serde(skip)]
    pub flags: ImportFlags,
}

/// Where a job writes its artifact, fixed when the job starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTarget {
    /// Footage path relocated into the output directory (still a template)
    pub target_path: String,
    /// Directory handed to the tool as `-out`
    pub out_dir: PathBuf,
}

/// Terminal state of a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    NoFootage,
    DirectoryResolutionFailed,
    ToolError(String),
    ArtifactMissing(PathBuf),
    ImportFailed(PathBuf),
    Success {
        artifact: PathBuf,
        permissions_relaxed: bool,
    },
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Success { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobOutcome::NoFootage => "skipped (no footage)",
            JobOutcome::DirectoryResolutionFailed => "directory resolution failed",
            JobOutcome::ToolError(_) => "tool error",
            JobOutcome::ArtifactMissing(_) => "artifact missing",
            JobOutcome::ImportFailed(_) => "import failed",
            JobOutcome::Success { .. } => "done",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub camera: String,
    pub outcome: JobOutcome,
    pub charged_steps: u64,
}

/// Append-only list of user-facing failure messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorLog {
    entries: Vec<String>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "export error logged");
        self.entries.push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Entries split into display lines (compound entries span several)
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|entry| entry.lines())
            .map(str::to_string)
            .collect()
    }

    pub fn joined(&self) -> String {
        self.entries.join("\n")
    }
}

/// Classification of one line of tool stdout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolLine {
    Error(String),
    Progress { frame: u64 },
    Other,
}

impl ToolLine {
    /// Classify a raw stdout line (trailing whitespace is ignored)
    pub fn classify(raw: &str) -> Self {
        let line = raw.trim_end();

        if line.starts_with(ERROR_PREFIX) {
            return ToolLine::Error(line.to_string());
        }

        if line.ends_with(PROGRESS_SUFFIX) {
            if let Some((frame, _)) = line.split_once('/') {
                if let Ok(frame) = frame.trim().parse::<u64>() {
                    return ToolLine::Progress { frame };
                }
            }
        }

        ToolLine::Other
    }
}

/// Accumulates what a single tool run reported on stdout
#[derive(Debug, Default, Clone)]
pub struct ToolOutputParser {
    /// First error line seen; later ones are ignored
    pub error: Option<String>,
    pub last_frame: Option<u64>,
    pub lines_seen: usize,
}

impl ToolOutputParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line; returns the frame number for progress lines
    pub fn parse_line(&mut self, raw: &str) -> Option<u64> {
        self.lines_seen += 1;
        match ToolLine::classify(raw) {
            ToolLine::Error(message) => {
                if self.error.is_none() {
                    self.error = Some(message);
                }
                None
            }
            ToolLine::Progress { frame } => {
                self.last_frame = Some(frame);
                Some(frame)
            }
            ToolLine::Other => None,
        }
    }
}
