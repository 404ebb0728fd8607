//! The export driver: plans a run over the requested cameras, runs the
//! compression tool for each sequence camera in turn, and reports the result.
//!
//! Every job is charged its full step estimate once it ends, whatever the
//! outcome, so progress always finishes at 100%. Per-camera failures never
//! stop the batch; they are collected and surfaced once at the end, either as
//! an error dialog (interactive) or as a single [`ExportError::JobsFailed`]
//! (headless).

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::core::{
    CameraJob, DEFAULT_TOOL_NAME, ErrorLog, JobOutcome, JobReport, OutputDirMode,
    ToolOutputParser, bcompress_path, build_bcfile_args, format_bcfile_cmd, plan_export,
    relax_permissions, resolve_target, tool_path, write_debug_log,
};
use super::runner::ProcessRunner;
use crate::host::{CameraId, Host};

/// Title of the progress and error dialogs, printed first in headless runs
pub const TITLE: &str = "Export Fast Buffer Compression File...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Progress and errors go through the host's dialogs
    Interactive,
    /// Progress is printed; errors end the run with a failure
    #[default]
    Headless,
}

#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub mode: RunMode,
    /// File name of the tool inside `<install>/bin`
    pub executable: String,
    /// Append tool command lines and outcomes here when set
    pub debug_log: Option<PathBuf>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            mode: RunMode::default(),
            executable: DEFAULT_TOOL_NAME.to_string(),
            debug_log: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    pub reports: Vec<JobReport>,
    pub errors: ErrorLog,
    /// Step budget fixed by the plan
    pub total_steps: u64,
    /// Steps charged by finished jobs
    pub steps_done: u64,
}

impl ExportSummary {
    pub fn succeeded(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome.is_success())
            .count()
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    /// Headless run that logged at least one error; the message is the whole
    /// error log, one entry per line
    #[error("{message}")]
    JobsFailed {
        message: String,
        summary: Box<ExportSummary>,
    },

    #[error("Failed to write progress output")]
    Console(#[from] io::Error),
}

/// Percentage of `step` within `total`, truncated
pub fn percent(step: u64, total: u64) -> u64 {
    if total == 0 {
        return 100;
    }
    let pct = u128::from(step) * 100 / u128::from(total);
    u64::try_from(pct).unwrap_or(u64::MAX)
}

/// Console form of a progress update
pub fn format_progress_line(step: u64, total: u64, message: &str) -> String {
    format!("{:3}% {}", percent(step, total), message)
}

fn emit_progress<H: Host, W: Write>(
    host: &mut H,
    console: &mut W,
    mode: RunMode,
    step: u64,
    total: u64,
    message: &str,
) -> io::Result<()> {
    match mode {
        RunMode::Interactive => {
            host.update_progress(step, message);
            Ok(())
        }
        RunMode::Headless => {
            writeln!(console, "{}", format_progress_line(step, total, message))?;
            console.flush()
        }
    }
}

pub struct ExportDriver<H, R, W> {
    host: H,
    runner: R,
    console: W,
    options: DriverOptions,
}

impl<H: Host, R: ProcessRunner, W: Write> ExportDriver<H, R, W> {
    pub fn new(host: H, runner: R, console: W, options: DriverOptions) -> Self {
        Self {
            host,
            runner,
            console,
            options,
        }
    }

    /// Export every camera in `cameras`, in order
    pub fn run(mut self, cameras: &[CameraId]) -> Result<ExportSummary, ExportError> {
        let mut errors = ErrorLog::new();
        let plan = plan_export(&self.host, cameras, &mut errors);

        let mut summary = ExportSummary {
            total_steps: plan.total_steps,
            ..ExportSummary::default()
        };

        if plan.requested {
            match self.options.mode {
                RunMode::Interactive => {
                    self.host
                        .post_progress(TITLE, "Please wait...", plan.total_steps)
                }
                RunMode::Headless => writeln!(self.console, "{}", TITLE)?,
            }
        }

        tracing::info!(
            jobs = plan.jobs.len(),
            total_steps = plan.total_steps,
            "starting export"
        );

        let tool = tool_path(&self.host.install_path(), &self.options.executable);

        for job in &plan.jobs {
            let offset = summary.steps_done;
            emit_progress(
                &mut self.host,
                &mut self.console,
                self.options.mode,
                offset,
                plan.total_steps,
                &format!("Exporting: {} (starting)", job.name),
            )?;

            let outcome = self.export_job(job, offset, plan.total_steps, &tool, &mut errors)?;

            tracing::info!(camera = %job.name, outcome = outcome.label(), "job finished");
            self.debug_log(&format!("{}: {}", job.name, outcome.label()));

            summary.steps_done = summary.steps_done.saturating_add(job.steps);
            summary.reports.push(JobReport {
                camera: job.name.clone(),
                outcome,
                charged_steps: job.steps,
            });
        }

        self.finish(summary, errors)
    }

    fn export_job(
        &mut self,
        job: &CameraJob,
        offset: u64,
        total: u64,
        tool: &Path,
        errors: &mut ErrorLog,
    ) -> Result<JobOutcome, ExportError> {
        let dir_mode = OutputDirMode::from_preferences(&self.host);
        let project_path = self.host.project_path();
        let source_or_empty = job.source_path.as_deref().unwrap_or_default();

        let target = match resolve_target(&dir_mode, source_or_empty, project_path.as_deref()) {
            Ok(target) => target,
            Err(e) => {
                errors.push(e.to_string());
                return Ok(JobOutcome::DirectoryResolutionFailed);
            }
        };

        let Some(source) = job.source_path.as_deref() else {
            errors.push(format!(
                "Couldn't process camera {} because it doesn't have any Footage loaded.",
                job.name
            ));
            return Ok(JobOutcome::NoFootage);
        };

        let args = build_bcfile_args(job, source, &target);
        let command_line = format_bcfile_cmd(tool, &args);
        tracing::info!(camera = %job.name, command = %command_line, "running compression tool");
        self.debug_log(&format!("=== {} ===\n{}", job.name, command_line));

        let mut parser = ToolOutputParser::new();
        let mut progress_err: Option<io::Error> = None;
        let mode = self.options.mode;
        #[cfg(feature = "dev-logging")]
        let debug_log = self.options.debug_log.clone();

        let run_result = self.runner.run(tool, &args, &mut |line| {
            tracing::debug!(camera = %job.name, line, "tool output");
            #[cfg(feature = "dev-logging")]
            if let Some(path) = debug_log.as_deref() {
                let _ = write_debug_log(path, &format!("[{}] {}", job.name, line));
            }

            if let Some(frame) = parser.parse_line(line) {
                let message = format!("Exporting: {} ({}/{})", job.name, frame, job.frames);
                if let Err(e) = emit_progress(
                    &mut self.host,
                    &mut self.console,
                    mode,
                    offset.saturating_add(frame).saturating_add(1),
                    total,
                    &message,
                ) {
                    progress_err.get_or_insert(e);
                }
            }
        });

        if let Some(e) = progress_err {
            return Err(e.into());
        }

        match run_result {
            Ok(code) => {
                // The tool exits 0 even when it failed; only its output counts
                tracing::debug!(
                    camera = %job.name,
                    ?code,
                    lines = parser.lines_seen,
                    last_frame = ?parser.last_frame,
                    "tool done"
                );
            }
            Err(e) => {
                parser.error.get_or_insert_with(|| format!("Error: {:#}", e));
            }
        }

        if let Some(message) = parser.error {
            errors.push(format!(
                "Couldn't create Buffer Compression File for Camera {}.\nMessage >>    {}",
                job.name, message
            ));
            return Ok(JobOutcome::ToolError(message));
        }

        emit_progress(
            &mut self.host,
            &mut self.console,
            mode,
            offset.saturating_add(job.frames).saturating_add(2),
            total,
            &format!("Exporting: {} (finishing)", job.name),
        )?;

        let artifact = bcompress_path(source, &target.target_path);

        if !artifact.is_file() {
            tracing::debug!(camera = %job.name, artifact = %artifact.display(), "artifact not found");
            errors.push(format!(
                "Couldn't find Buffer Compression File for Camera {}.",
                job.name
            ));
            return Ok(JobOutcome::ArtifactMissing(artifact));
        }

        let imported = self
            .host
            .import_buffer_compression_file(job.camera, &artifact);
        if let Err(e) = &imported {
            let error = format!("{:#}", e);
            tracing::warn!(camera = %job.name, %error, "host import failed");
            errors.push(format!(
                "Couldn't import Buffer Compression File for Camera {}.",
                job.name
            ));
        }

        // Shared shots: let everyone else overwrite the cache later
        let permissions_relaxed = match relax_permissions(&artifact) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(artifact = %artifact.display(), error = %e, "chmod failed");
                errors.push(format!(
                    "Couldn't set permissions of Buffer Compression File for Camera {}.",
                    job.name
                ));
                false
            }
        };

        Ok(match imported {
            Ok(()) => JobOutcome::Success {
                artifact,
                permissions_relaxed,
            },
            Err(_) => JobOutcome::ImportFailed(artifact),
        })
    }

    fn finish(
        mut self,
        mut summary: ExportSummary,
        errors: ErrorLog,
    ) -> Result<ExportSummary, ExportError> {
        summary.errors = errors;

        match self.options.mode {
            RunMode::Interactive => {
                self.host.unpost_progress();
                if !summary.errors.is_empty() {
                    self.host.show_errors(TITLE, &summary.errors.lines());
                }
                Ok(summary)
            }
            RunMode::Headless => {
                writeln!(self.console, "100% Done.")?;
                self.console.flush()?;
                if summary.errors.is_empty() {
                    Ok(summary)
                } else {
                    Err(ExportError::JobsFailed {
                        message: summary.errors.joined(),
                        summary: Box::new(summary),
                    })
                }
            }
        }
    }

    fn debug_log(&self, message: &str) {
        if let Some(path) = self.options.debug_log.as_deref() {
            if let Err(e) = write_debug_log(path, message) {
                tracing::warn!(path = %path.display(), error = %e, "debug log write failed");
            }
        }
    }
}
