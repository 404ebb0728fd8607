use super::types::{CameraJob, ErrorLog};
use crate::host::{CameraId, CameraKind, Host};
use serde::Serialize;

/// Jobs for one export run plus the fixed step budget they add up to
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportPlan {
    pub jobs: Vec<CameraJob>,
    pub total_steps: u64,
    /// Whether any camera was requested at all
    pub requested: bool,
}

/// Number of frames in an inclusive range, independent of direction.
/// `None` when the count doesn't fit in a `u64`.
pub fn frame_count(start: i64, end: i64) -> Option<u64> {
    let span = i128::from(end) - i128::from(start) + 1;
    u64::try_from(span.unsigned_abs()).ok()
}

/// Progress steps charged for a job: one per frame, one per hundred frames,
/// plus start and finish
pub fn estimate_steps(frames: u64) -> u64 {
    frames.saturating_add(frames / 100).saturating_add(2)
}

/// Validate the requested cameras and size the run.
///
/// Non-sequence and unknown cameras, and ranges too long to count, are
/// logged and left out. An empty request
/// logs a single "choose a camera" error.
pub fn plan_export<H: Host + ?Sized>(
    host: &H,
    cameras: &[CameraId],
    errors: &mut ErrorLog,
) -> ExportPlan {
    let mut plan = ExportPlan {
        requested: !cameras.is_empty(),
        ..ExportPlan::default()
    };

    if cameras.is_empty() {
        errors.push("Please choose a camera.");
        return plan;
    }

    for &id in cameras {
        let Some(info) = host.camera(id) else {
            errors.push(format!("Camera {} does not exist.", id));
            continue;
        };

        if info.kind != CameraKind::Sequence {
            errors.push(format!("Camera {} is not a Sequence Camera.", info.name));
            continue;
        }

        let Some(frames) = frame_count(info.range.start, info.range.end) else {
            errors.push(format!(
                "Camera {} has an invalid frame range ({}..{}).",
                info.name, info.range.start, info.range.end
            ));
            continue;
        };
        let steps = estimate_steps(frames);
        plan.total_steps = plan.total_steps.saturating_add(steps);

        tracing::debug!(camera = %info.name, frames, steps, "planned job");

        plan.jobs.push(CameraJob {
            camera: id,
            name: info.name,
            start: info.range.start,
            end: info.range.end,
            frames,
            steps,
            source_path: info.footage_path.filter(|p| !p.is_empty()),
            grading: info.grading,
            flags: info.flags,
        });
    }

    plan
}
