// Running the compression tool and streaming its stdout

use anyhow::{Context, Result};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::Stdio;

use super::core::build_bcfile_cmd;

/// Something that can run a command and hand back its stdout line by line.
///
/// Implementations must drain stdout to EOF and reap the process before
/// returning. The returned exit code is informational only.
pub trait ProcessRunner {
    fn run(
        &mut self,
        program: &Path,
        args: &[String],
        on_line: &mut dyn FnMut(&str),
    ) -> Result<Option<i32>>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &mut R {
    fn run(
        &mut self,
        program: &Path,
        args: &[String],
        on_line: &mut dyn FnMut(&str),
    ) -> Result<Option<i32>> {
        (**self).run(program, args, on_line)
    }
}

/// Runs the real executable through `std::process`
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    /// Discard the tool's stderr instead of letting it reach the terminal
    /// (needed while a full-screen UI owns the terminal)
    pub quiet_stderr: bool,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self { quiet_stderr: true }
    }
}

impl ProcessRunner for SystemRunner {
    fn run(
        &mut self,
        program: &Path,
        args: &[String],
        on_line: &mut dyn FnMut(&str),
    ) -> Result<Option<i32>> {
        let mut cmd = build_bcfile_cmd(program, args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(if self.quiet_stderr {
            Stdio::null()
        } else {
            Stdio::inherit()
        });

        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn {}", program.display()))?;

        let drained = match child.stdout.take() {
            Some(stdout) => drain_lines(BufReader::new(stdout), on_line),
            None => Ok(()),
        };

        // Reap even when reading failed
        let status = child
            .wait()
            .with_context(|| format!("Failed to wait for {}", program.display()))?;
        drained.context("Failed to read tool output")?;

        tracing::debug!(program = %program.display(), ?status, "tool exited");
        Ok(status.code())
    }
}

/// Feed every line of `reader` to `on_line`, decoding invalid UTF-8 lossily so
/// a bad byte never cuts the stream short
pub fn drain_lines<R: BufRead>(mut reader: R, on_line: &mut dyn FnMut(&str)) -> std::io::Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        on_line(line.trim_end_matches(['\n', '\r']));
    }
}
