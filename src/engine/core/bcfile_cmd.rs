use super::types::{CameraJob, JobTarget};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Name of the compression tool inside `<install>/bin`
pub const DEFAULT_TOOL_NAME: &str = "makeBCFile";

/// Location of the compression tool under an installation root
pub fn tool_path(install_path: &Path, executable: &str) -> PathBuf {
    install_path.join("bin").join(executable)
}

/// Render a grading value the way the tool's own scripts always have
/// (integral values keep a trailing `.0`)
pub fn format_param(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Argument vector for one camera; the source path is passed untouched
/// (placeholders included)
pub fn build_bcfile_args(job: &CameraJob, source_path: &str, target: &JobTarget) -> Vec<String> {
    let mut args = vec![
        "-source".to_string(),
        source_path.to_string(),
        "-start".to_string(),
        job.start.to_string(),
        "-end".to_string(),
        job.end.to_string(),
        "-out".to_string(),
        target.out_dir.to_string_lossy().into_owned(),
    ];

    if job.flags.sxr_right_eye {
        args.push("-import_sxr_right_eye".to_string());
    }
    if job.flags.exr_display_window {
        args.push("-import_exr_display_window".to_string());
    }

    let grading = &job.grading;
    for (flag, value) in [
        ("-black", grading.black),
        ("-white", grading.white),
        ("-gamma", grading.gamma),
        ("-softclip", grading.softclip),
    ] {
        args.push(flag.to_string());
        args.push(format_param(value));
    }

    args
}

/// Build the process for a job (stdout is wired up by the runner)
pub fn build_bcfile_cmd(tool: &Path, args: &[String]) -> Command {
    let mut cmd = Command::new(tool);
    cmd.args(args);
    cmd
}

/// Shell-quoted command line for logs and dry runs
pub fn format_bcfile_cmd(tool: &Path, args: &[String]) -> String {
    let tool = tool.to_string_lossy();
    let parts = std::iter::once(tool.as_ref()).chain(args.iter().map(String::as_str));
    shlex::try_join(parts).unwrap_or_else(|_| {
        // Arguments with NUL bytes cannot be quoted; show them raw
        format!("{} {}", tool, args.join(" "))
    })
}
