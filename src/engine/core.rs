mod artifact;
mod bcfile_cmd;
mod log;
mod output_dir;
mod plan;
mod types;

pub use artifact::{BCOMPRESS_SUFFIX, FRAME_JOIN, FRAME_PLACEHOLDER, bcompress_path, relax_permissions};
pub use bcfile_cmd::{
    DEFAULT_TOOL_NAME, build_bcfile_args, build_bcfile_cmd, format_bcfile_cmd, format_param,
    tool_path,
};
pub use log::{default_debug_log_path, write_debug_log};
pub use output_dir::{OutputDirMode, TargetError, resolve_target};
pub use plan::{ExportPlan, estimate_steps, frame_count, plan_export};
pub use types::{
    CameraJob, ErrorLog, JobOutcome, JobReport, JobTarget, ToolLine, ToolOutputParser,
};
