//! Executable lookup against an explicit search path.

use std::path::PathBuf;

/// Find an executable by name.
///
/// Each directory of `search_path` is tried in order via the `which` crate,
/// which handles symlinks and the executable bit. The ambient `PATH` of the
/// current process is never consulted.
///
/// # Arguments
///
/// * `name` - The executable name to search for (e.g., "pacman", "rustc")
/// * `search_path` - Directories to search, highest priority first
///
/// # Returns
///
/// `Some(PathBuf)` if the executable is found, `None` otherwise.
pub(crate) fn find_executable(name: &str, search_path: &[PathBuf]) -> Option<PathBuf> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
    search_path
        .iter()
        .find_map(|dir| which::which_in(name, Some(dir.as_path()), &cwd).ok())
}
