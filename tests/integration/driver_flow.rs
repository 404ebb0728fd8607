// End-to-end runs of the export driver against an in-memory host and a
// scripted tool

use crate::common::{
    HostEvent, MemoryHost, Script, ScriptedRunner, artifact_next_to, footage_in,
    progress_lines, read_lines, sequence_camera, touch,
};
use bcexport::engine::{
    DriverOptions, ExportDriver, ExportError, ExportSummary, JobOutcome, RunMode, TITLE,
};
use bcexport::host::{CameraId, CameraKind, PREF_BCFILE_IN_DIR, PREF_CUSTOM_DIR};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn headless() -> DriverOptions {
    DriverOptions::default()
}

fn interactive() -> DriverOptions {
    DriverOptions {
        mode: RunMode::Interactive,
        ..DriverOptions::default()
    }
}

fn run(
    host: &mut MemoryHost,
    runner: &mut ScriptedRunner,
    options: DriverOptions,
    cameras: &[CameraId],
) -> (Result<ExportSummary, ExportError>, Vec<String>) {
    let mut console = Vec::new();
    let result = ExportDriver::new(host, runner, &mut console, options).run(cameras);
    (result, read_lines(&console))
}

fn failed_summary(result: Result<ExportSummary, ExportError>) -> (String, ExportSummary) {
    match result {
        Err(ExportError::JobsFailed { message, summary }) => (message, *summary),
        other => panic!("expected JobsFailed, got {:?}", other.map(|s| s.reports)),
    }
}

#[test]
fn test_headless_single_camera_success() {
    let tmp = TempDir::new().unwrap();
    let footage = footage_in(tmp.path(), "plate");
    let artifact = artifact_next_to(&footage);

    let mut host = MemoryHost::new(vec![sequence_camera(0, "plate", 1, 4, Some(&footage))]);
    let mut runner = ScriptedRunner::new([Script::success(progress_lines(4), &artifact)]);

    let (result, console) = run(&mut host, &mut runner, headless(), &[CameraId(0)]);
    let summary = result.unwrap();

    assert_eq!(
        console,
        vec![
            TITLE,
            "  0% Exporting: plate (starting)",
            " 33% Exporting: plate (1/4)",
            " 50% Exporting: plate (2/4)",
            " 66% Exporting: plate (3/4)",
            " 83% Exporting: plate (4/4)",
            "100% Exporting: plate (finishing)",
            "100% Done.",
        ]
    );

    assert_eq!(summary.total_steps, 6);
    assert_eq!(summary.steps_done, 6);
    assert!(summary.errors.is_empty());
    assert_eq!(
        summary.reports[0].outcome,
        JobOutcome::Success {
            artifact: artifact.clone(),
            permissions_relaxed: true,
        }
    );
    assert_eq!(host.imported, vec![(CameraId(0), artifact.clone())]);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&artifact).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o666);
    }
}

#[test]
fn test_tool_invocation_arguments() {
    let tmp = TempDir::new().unwrap();
    let footage = footage_in(tmp.path(), "plate");

    let mut camera = sequence_camera(0, "plate", 1001, 1100, Some(&footage));
    camera.flags.exr_display_window = true;
    camera.grading.gamma = 2.2;
    let mut host = MemoryHost::new(vec![camera]);
    let mut runner = ScriptedRunner::default();

    let _ = run(&mut host, &mut runner, headless(), &[CameraId(0)]);

    assert_eq!(runner.invocations.len(), 1);
    let call = &runner.invocations[0];
    assert_eq!(call.program, PathBuf::from("/opt/3DE4/bin/makeBCFile"));
    assert_eq!(call.arg("-source"), Some(footage.as_str()));
    assert_eq!(call.arg("-start"), Some("1001"));
    assert_eq!(call.arg("-end"), Some("1100"));
    assert_eq!(call.arg("-out"), Some(tmp.path().to_str().unwrap()));
    assert_eq!(call.arg("-gamma"), Some("2.2"));
    assert_eq!(call.arg("-white"), Some("1.0"));
    assert!(call.args.contains(&"-import_exr_display_window".to_string()));
    assert!(!call.args.contains(&"-import_sxr_right_eye".to_string()));
}

#[test]
fn test_error_line_wins_over_progress() {
    let tmp = TempDir::new().unwrap();
    let footage = footage_in(tmp.path(), "plate");
    // Even a stray artifact is not imported once the tool reported an error
    touch(&artifact_next_to(&footage));

    let mut host = MemoryHost::new(vec![sequence_camera(0, "plate", 1, 100, Some(&footage))]);
    let mut runner = ScriptedRunner::new([Script::output(vec![
        "Error: disk full".to_string(),
        "50/100 image files processed".to_string(),
    ])]);

    let (result, console) = run(&mut host, &mut runner, headless(), &[CameraId(0)]);
    let (message, summary) = failed_summary(result);

    assert_eq!(
        message,
        "Couldn't create Buffer Compression File for Camera plate.\nMessage >>    Error: disk full"
    );
    assert_eq!(
        summary.reports[0].outcome,
        JobOutcome::ToolError("Error: disk full".to_string())
    );
    assert!(host.imported.is_empty());
    assert!(!console.iter().any(|l| l.contains("(finishing)")));
    assert_eq!(console.last().map(String::as_str), Some("100% Done."));
    // The job is still charged in full
    assert_eq!(summary.steps_done, summary.total_steps);
}

#[test]
fn test_first_error_line_is_reported() {
    let tmp = TempDir::new().unwrap();
    let footage = footage_in(tmp.path(), "plate");
    let mut host = MemoryHost::new(vec![sequence_camera(0, "plate", 1, 10, Some(&footage))]);
    let mut runner = ScriptedRunner::new([Script::output(vec![
        "Error: cannot open frame 3".to_string(),
        "Error: giving up".to_string(),
    ])]);

    let (result, _) = run(&mut host, &mut runner, headless(), &[CameraId(0)]);
    let (_, summary) = failed_summary(result);
    assert_eq!(
        summary.reports[0].outcome,
        JobOutcome::ToolError("Error: cannot open frame 3".to_string())
    );
}

#[test]
fn test_spawn_failure_is_a_tool_error() {
    let tmp = TempDir::new().unwrap();
    let footage = footage_in(tmp.path(), "plate");
    let mut host = MemoryHost::new(vec![sequence_camera(0, "plate", 1, 10, Some(&footage))]);
    let mut runner = ScriptedRunner::new([Script::spawn_failure()]);

    let (result, _) = run(&mut host, &mut runner, headless(), &[CameraId(0)]);
    let (message, summary) = failed_summary(result);

    assert!(matches!(summary.reports[0].outcome, JobOutcome::ToolError(_)));
    assert!(message.starts_with("Couldn't create Buffer Compression File for Camera plate."));
    assert!(message.contains("Failed to spawn"));
}

#[test]
fn test_non_sequence_camera_is_rejected_before_running() {
    let mut reference = sequence_camera(0, "witness", 1, 1, Some("/a/witness.jpg"));
    reference.kind = CameraKind::RefFrame;
    let mut host = MemoryHost::new(vec![reference]);
    let mut runner = ScriptedRunner::default();

    let (result, _) = run(&mut host, &mut runner, headless(), &[CameraId(0)]);
    let (message, summary) = failed_summary(result);

    assert_eq!(message, "Camera witness is not a Sequence Camera.");
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.reports.is_empty());
    assert!(runner.invocations.is_empty());
}

#[test]
fn test_empty_camera_list() {
    let mut host = MemoryHost::new(Vec::new());
    let mut runner = ScriptedRunner::default();

    let (result, console) = run(&mut host, &mut runner, headless(), &[]);
    let (message, summary) = failed_summary(result);

    assert_eq!(message, "Please choose a camera.");
    assert_eq!(summary.errors.len(), 1);
    assert!(runner.invocations.is_empty());
    // Nothing was requested, so no title is printed
    assert_eq!(console, vec!["100% Done."]);
}

#[test]
fn test_unknown_camera_id() {
    let mut host = MemoryHost::new(Vec::new());
    let mut runner = ScriptedRunner::default();

    let (result, _) = run(&mut host, &mut runner, headless(), &[CameraId(7)]);
    let (message, _) = failed_summary(result);
    assert_eq!(message, "Camera #7 does not exist.");
}

#[test]
fn test_project_directory_without_project_skips_tool() {
    let tmp = TempDir::new().unwrap();
    let footage = footage_in(tmp.path(), "plate");
    let mut host = MemoryHost::new(vec![sequence_camera(0, "plate", 1, 10, Some(&footage))])
        .with_preference(PREF_BCFILE_IN_DIR, "1");
    let mut runner = ScriptedRunner::default();

    let (result, _) = run(&mut host, &mut runner, headless(), &[CameraId(0)]);
    let (message, summary) = failed_summary(result);

    assert_eq!(
        message,
        "Can not save buffer to project directory. Project is not saved."
    );
    assert_eq!(
        summary.reports[0].outcome,
        JobOutcome::DirectoryResolutionFailed
    );
    assert!(runner.invocations.is_empty());
    assert_eq!(summary.steps_done, summary.total_steps);
}

#[test]
fn test_project_directory_target() {
    let shots = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let footage = footage_in(shots.path(), "plate");
    let artifact = project.path().join("plate.x.exr.3de_bcompress");

    let mut host = MemoryHost::new(vec![sequence_camera(0, "plate", 1, 3, Some(&footage))])
        .with_preference(PREF_BCFILE_IN_DIR, "1");
    host.project_path = Some(project.path().join("scene.3de"));
    let mut runner = ScriptedRunner::new([Script::success(progress_lines(3), &artifact)]);

    let (result, _) = run(&mut host, &mut runner, headless(), &[CameraId(0)]);
    let summary = result.unwrap();

    assert_eq!(
        runner.invocations[0].arg("-out"),
        Some(project.path().to_str().unwrap())
    );
    assert_eq!(runner.invocations[0].arg("-source"), Some(footage.as_str()));
    assert!(summary.reports[0].outcome.is_success());
    assert_eq!(host.imported, vec![(CameraId(0), artifact)]);
}

#[test]
fn test_custom_directory_target() {
    let shots = TempDir::new().unwrap();
    let cache = TempDir::new().unwrap();
    let footage = footage_in(shots.path(), "plate");
    let artifact = cache.path().join("plate.x.exr.3de_bcompress");

    let mut host = MemoryHost::new(vec![sequence_camera(0, "plate", 1, 3, Some(&footage))])
        .with_preference(PREF_BCFILE_IN_DIR, "2")
        .with_preference(PREF_CUSTOM_DIR, cache.path().to_str().unwrap());
    let mut runner = ScriptedRunner::new([Script::success(progress_lines(3), &artifact)]);

    let (result, _) = run(&mut host, &mut runner, headless(), &[CameraId(0)]);

    assert!(result.unwrap().reports[0].outcome.is_success());
    assert_eq!(
        runner.invocations[0].arg("-out"),
        Some(cache.path().to_str().unwrap())
    );
}

#[test]
fn test_custom_directory_unset() {
    let mut host = MemoryHost::new(vec![sequence_camera(0, "plate", 1, 3, Some("/a/p.##.exr"))])
        .with_preference(PREF_BCFILE_IN_DIR, "2");
    let mut runner = ScriptedRunner::default();

    let (result, _) = run(&mut host, &mut runner, headless(), &[CameraId(0)]);
    let (message, _) = failed_summary(result);
    assert_eq!(
        message,
        "Can not save buffer to custom directory. No directory is configured."
    );
    assert!(runner.invocations.is_empty());
}

#[test]
fn test_camera_without_footage() {
    let mut host = MemoryHost::new(vec![sequence_camera(0, "plate", 1, 10, None)]);
    let mut runner = ScriptedRunner::default();

    let (result, _) = run(&mut host, &mut runner, headless(), &[CameraId(0)]);
    let (message, summary) = failed_summary(result);

    assert_eq!(
        message,
        "Couldn't process camera plate because it doesn't have any Footage loaded."
    );
    assert_eq!(summary.reports[0].outcome, JobOutcome::NoFootage);
    assert!(runner.invocations.is_empty());
}

#[test]
fn test_missing_artifact() {
    let tmp = TempDir::new().unwrap();
    let footage = footage_in(tmp.path(), "plate");
    let mut host = MemoryHost::new(vec![sequence_camera(0, "plate", 1, 2, Some(&footage))]);
    let mut runner = ScriptedRunner::new([Script::output(progress_lines(2))]);

    let (result, console) = run(&mut host, &mut runner, headless(), &[CameraId(0)]);
    let (message, summary) = failed_summary(result);

    assert_eq!(
        message,
        "Couldn't find Buffer Compression File for Camera plate."
    );
    assert_eq!(
        summary.reports[0].outcome,
        JobOutcome::ArtifactMissing(artifact_next_to(&footage))
    );
    assert!(console.iter().any(|l| l.ends_with("(finishing)")));
    assert!(host.imported.is_empty());
}

#[test]
fn test_import_failure_still_relaxes_permissions() {
    let tmp = TempDir::new().unwrap();
    let footage = footage_in(tmp.path(), "plate");
    let artifact = artifact_next_to(&footage);
    let mut host = MemoryHost::new(vec![sequence_camera(0, "plate", 1, 2, Some(&footage))]);
    host.fail_import = true;
    let mut runner = ScriptedRunner::new([Script::success(progress_lines(2), &artifact)]);

    let (result, _) = run(&mut host, &mut runner, headless(), &[CameraId(0)]);
    let (message, summary) = failed_summary(result);

    assert_eq!(
        message,
        "Couldn't import Buffer Compression File for Camera plate."
    );
    assert_eq!(
        summary.reports[0].outcome,
        JobOutcome::ImportFailed(artifact.clone())
    );

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&artifact).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o666);
    }
}

#[test]
fn test_permission_failure_is_logged_but_not_fatal() {
    let tmp = TempDir::new().unwrap();
    let footage = footage_in(tmp.path(), "plate");
    let artifact = artifact_next_to(&footage);
    let mut host = MemoryHost::new(vec![sequence_camera(0, "plate", 1, 2, Some(&footage))]);
    host.consume_on_import = true;
    let mut runner = ScriptedRunner::new([Script::success(progress_lines(2), &artifact)]);

    let (result, console) = run(&mut host, &mut runner, headless(), &[CameraId(0)]);
    let (message, summary) = failed_summary(result);

    assert_eq!(
        message,
        "Couldn't set permissions of Buffer Compression File for Camera plate."
    );
    assert_eq!(
        summary.reports[0].outcome,
        JobOutcome::Success {
            artifact: artifact.clone(),
            permissions_relaxed: false,
        }
    );
    assert_eq!(host.imported, vec![(CameraId(0), artifact)]);
    assert_eq!(summary.steps_done, summary.total_steps);
    assert_eq!(summary.reports[0].charged_steps, 4);
    assert_eq!(console.last().map(String::as_str), Some("100% Done."));
}

#[test]
fn test_oversized_progress_frame_does_not_abort() {
    let tmp = TempDir::new().unwrap();
    let footage = footage_in(tmp.path(), "plate");
    let artifact = artifact_next_to(&footage);
    let mut host = MemoryHost::new(vec![sequence_camera(0, "plate", 1, 4, Some(&footage))]);
    let mut runner = ScriptedRunner::new([Script::success(
        vec![format!("{}/4 image files processed", u64::MAX)],
        &artifact,
    )]);

    let mut console = Vec::new();
    let summary = ExportDriver::new(&mut host, &mut runner, &mut console, interactive())
        .run(&[CameraId(0)])
        .unwrap();

    assert!(summary.reports[0].outcome.is_success());
    assert_eq!(host.progress_steps(), vec![0, u64::MAX, 6]);
    assert_eq!(summary.steps_done, 6);

    // Console mode prints the same update without overflowing the percentage
    let mut host = MemoryHost::new(vec![sequence_camera(0, "plate", 1, 4, Some(&footage))]);
    let mut runner = ScriptedRunner::new([Script::success(
        vec![format!("{}/4 image files processed", u64::MAX)],
        &artifact,
    )]);
    let (result, console) = run(&mut host, &mut runner, headless(), &[CameraId(0)]);
    result.unwrap();
    assert!(console[2].ends_with(&format!("Exporting: plate ({}/4)", u64::MAX)));
}

#[test]
fn test_uncountable_frame_range_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let footage = footage_in(tmp.path(), "good");
    let mut host = MemoryHost::new(vec![
        sequence_camera(0, "huge", i64::MIN, i64::MAX, Some("/a/huge.####.exr")),
        sequence_camera(1, "good", 1, 2, Some(&footage)),
    ]);
    let mut runner =
        ScriptedRunner::new([Script::success(progress_lines(2), artifact_next_to(&footage))]);
    let ids = host.ids();

    let (result, _) = run(&mut host, &mut runner, headless(), &ids);
    let (message, summary) = failed_summary(result);

    assert_eq!(
        message,
        format!(
            "Camera huge has an invalid frame range ({}..{}).",
            i64::MIN,
            i64::MAX
        )
    );
    assert_eq!(summary.reports.len(), 1);
    assert!(summary.reports[0].outcome.is_success());
    assert_eq!(summary.total_steps, 4);
    assert_eq!(runner.invocations.len(), 1);
}

#[test]
fn test_batch_continues_after_failures() {
    let tmp = TempDir::new().unwrap();
    let good = footage_in(tmp.path(), "good");
    let bad = footage_in(tmp.path(), "bad");

    let mut host = MemoryHost::new(vec![
        sequence_camera(0, "bad", 1, 50, Some(&bad)),
        sequence_camera(1, "nofootage", 1, 20, None),
        sequence_camera(2, "good", 1, 150, Some(&good)),
    ]);
    let mut runner = ScriptedRunner::new([
        Script::output(vec!["Error: codec missing".to_string()]),
        Script::success(progress_lines(150), artifact_next_to(&good)),
    ]);
    let ids = host.ids();

    let (result, _) = run(&mut host, &mut runner, headless(), &ids);
    let (message, summary) = failed_summary(result);

    // Errors keep their order, one entry per line group
    assert_eq!(
        message,
        [
            "Couldn't create Buffer Compression File for Camera bad.\nMessage >>    Error: codec missing",
            "Couldn't process camera nofootage because it doesn't have any Footage loaded.",
        ]
        .join("\n")
    );
    assert_eq!(runner.invocations.len(), 2);
    assert_eq!(summary.succeeded(), 1);

    // 52 + 22 + 153
    assert_eq!(summary.total_steps, 227);
    assert_eq!(summary.steps_done, 227);
    let charged: u64 = summary.reports.iter().map(|r| r.charged_steps).sum();
    assert_eq!(charged, 227);
}

#[test]
fn test_progress_offsets_accumulate_across_jobs() {
    let tmp = TempDir::new().unwrap();
    let a = footage_in(tmp.path(), "a");
    let b = footage_in(tmp.path(), "b");
    let mut host = MemoryHost::new(vec![
        sequence_camera(0, "a", 1, 2, Some(&a)),
        sequence_camera(1, "b", 1, 3, Some(&b)),
    ]);
    let mut runner = ScriptedRunner::new([
        Script::success(progress_lines(2), artifact_next_to(&a)),
        Script::success(progress_lines(3), artifact_next_to(&b)),
    ]);
    let ids = host.ids();

    let mut console = Vec::new();
    let summary = ExportDriver::new(&mut host, &mut runner, &mut console, interactive())
        .run(&ids)
        .unwrap();

    // a: 4 steps starting at 0, b: 5 steps starting at 4
    assert_eq!(host.progress_steps(), vec![0, 2, 3, 4, 4, 6, 7, 8, 9]);
    assert_eq!(summary.total_steps, 9);
    assert!(console.is_empty());
}

#[test]
fn test_interactive_dialog_sequence() {
    let tmp = TempDir::new().unwrap();
    let footage = footage_in(tmp.path(), "plate");
    let mut host = MemoryHost::new(vec![sequence_camera(0, "plate", 1, 10, Some(&footage))]);
    let mut runner = ScriptedRunner::new([Script::output(vec!["Error: disk full".to_string()])]);

    let mut console = Vec::new();
    let result = ExportDriver::new(&mut host, &mut runner, &mut console, interactive())
        .run(&[CameraId(0)]);

    // Interactive runs report through the dialog instead of failing
    let summary = result.unwrap();
    assert_eq!(summary.errors.len(), 1);
    assert!(console.is_empty());

    assert_eq!(
        host.events,
        vec![
            HostEvent::Posted {
                title: TITLE.to_string(),
                message: "Please wait...".to_string(),
                max_steps: 12,
            },
            HostEvent::Progress {
                step: 0,
                message: "Exporting: plate (starting)".to_string(),
            },
            HostEvent::Unposted,
            HostEvent::Errors {
                title: TITLE.to_string(),
                lines: vec![
                    "Couldn't create Buffer Compression File for Camera plate.".to_string(),
                    "Message >>    Error: disk full".to_string(),
                ],
            },
        ]
    );
}

#[test]
fn test_interactive_success_has_no_error_dialog() {
    let tmp = TempDir::new().unwrap();
    let footage = footage_in(tmp.path(), "plate");
    let mut host = MemoryHost::new(vec![sequence_camera(0, "plate", 1, 2, Some(&footage))]);
    let mut runner =
        ScriptedRunner::new([Script::success(progress_lines(2), artifact_next_to(&footage))]);

    let mut console = Vec::new();
    ExportDriver::new(&mut host, &mut runner, &mut console, interactive())
        .run(&[CameraId(0)])
        .unwrap();

    assert!(host.error_dialogs().is_empty());
    assert_eq!(host.events.last(), Some(&HostEvent::Unposted));
}

#[test]
fn test_empty_list_interactive_shows_single_error() {
    let mut host = MemoryHost::new(Vec::new());
    let mut runner = ScriptedRunner::default();

    let mut console = Vec::new();
    ExportDriver::new(&mut host, &mut runner, &mut console, interactive())
        .run(&[])
        .unwrap();

    // No progress dialog for an empty request
    assert!(!host
        .events
        .iter()
        .any(|e| matches!(e, HostEvent::Posted { .. })));
    let dialogs = host.error_dialogs();
    assert_eq!(dialogs.len(), 1);
    assert_eq!(dialogs[0].to_vec(), vec!["Please choose a camera.".to_string()]);
}

#[test]
fn test_debug_log_records_commands() {
    let tmp = TempDir::new().unwrap();
    let footage = footage_in(tmp.path(), "plate");
    let log = tmp.path().join("bcexport.log");
    let mut host = MemoryHost::new(vec![sequence_camera(0, "plate", 1, 2, Some(&footage))]);
    let mut runner =
        ScriptedRunner::new([Script::success(progress_lines(2), artifact_next_to(&footage))]);

    let options = DriverOptions {
        debug_log: Some(log.clone()),
        ..headless()
    };
    let (result, _) = run(&mut host, &mut runner, options, &[CameraId(0)]);
    result.unwrap();

    let contents = std::fs::read_to_string(&log).unwrap();
    assert!(contents.contains("=== plate ==="));
    assert!(contents.contains("makeBCFile -source"));
    assert!(contents.contains("plate: done"));
    assert!(Path::new(&log).is_file());
}
