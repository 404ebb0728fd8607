use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extension the tool appends to its output
pub const BCOMPRESS_SUFFIX: &str = ".3de_bcompress";

/// Character marking frame-number digits in a path template
pub const FRAME_PLACEHOLDER: char = '#';

/// What a placeholder run collapses to in the artifact name
pub const FRAME_JOIN: &str = "x";

/// Path of the file the tool writes for `target_path`.
///
/// The run length is taken from the placeholder count of `source_path`, while
/// the replacement happens in `target_path`. These differ only when the output
/// directory itself contains `#`; keep it that way, the tool names its output
/// the same way.
pub fn bcompress_path(source_path: &str, target_path: &str) -> PathBuf {
    let run_len = source_path
        .chars()
        .filter(|&c| c == FRAME_PLACEHOLDER)
        .count();

    let collapsed = if run_len == 0 {
        target_path.to_string()
    } else {
        let run = FRAME_PLACEHOLDER.to_string().repeat(run_len);
        target_path.replace(&run, FRAME_JOIN)
    };

    PathBuf::from(format!("{}{}", collapsed, BCOMPRESS_SUFFIX))
}

/// Make the artifact readable and writable by everyone
pub fn relax_permissions(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o666))
    }

    #[cfg(not(unix))]
    {
        let mut permissions = fs::metadata(path)?.permissions();
        permissions.set_readonly(false);
        fs::set_permissions(path, permissions)
    }
}
