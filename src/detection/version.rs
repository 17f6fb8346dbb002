//! Async version check with timeout.

use super::DetectionError;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Check the version of an executable.
///
/// Runs the executable with `--version` and captures its output. The call is
/// wrapped in `limit` so a stuck binary cannot hang verification.
///
/// # Arguments
///
/// * `path` - Path to the executable to check
/// * `limit` - Maximum time to wait for the command
/// * `vars` - Extra environment for the child (toolchain proxies need
///   `RUSTUP_HOME` and `CARGO_HOME`)
///
/// # Returns
///
/// `Ok(String)` with the version output (stdout preferred, stderr fallback),
/// or a `DetectionError` on failure:
/// - `Timeout` if the command takes longer than `limit`
/// - `PermissionDenied` if the executable cannot be run due to permissions
/// - `IoError` for other I/O failures or non-zero exit codes
/// - `VersionParseFailed` if output is not valid UTF-8
pub(crate) async fn check_version(
    path: &Path,
    limit: Duration,
    vars: &[(&str, OsString)],
) -> Result<String, DetectionError> {
    let mut command = Command::new(path);
    command
        .arg("--version")
        .envs(vars.iter().map(|(k, v)| (*k, v)))
        .stdin(Stdio::null())
        .kill_on_drop(true);

    let output = timeout(limit, command.output())
        .await
        .map_err(|_| DetectionError::Timeout)?
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                DetectionError::PermissionDenied
            } else {
                DetectionError::IoError
            }
        })?;

    if !output.status.success() {
        return Err(DetectionError::IoError);
    }

    // Some tools write their version to stderr
    let out = if !output.stdout.is_empty() {
        output.stdout
    } else {
        output.stderr
    };

    String::from_utf8(out).map_err(|_| DetectionError::VersionParseFailed)
}
