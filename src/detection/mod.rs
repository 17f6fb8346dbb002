//! Detection implementation submodule.
//!
//! Internal helpers for probing the host:
//!
//! - `find_executable`: lookup against an explicit search path
//! - `check_version`: async `--version` query with a timeout
//! - `parse_version`: regex-based version extraction from CLI output

mod parser;
mod path_finder;
mod version;

pub(crate) use parser::parse_version;
pub(crate) use path_finder::find_executable;
pub(crate) use version::check_version;

/// Ways a probe of an installed binary can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DetectionError {
    /// The probe did not finish in time.
    Timeout,

    /// Permission denied executing the binary.
    PermissionDenied,

    /// Output did not contain a recognizable version.
    VersionParseFailed,

    /// Spawn failure or non-zero exit.
    IoError,
}

impl DetectionError {
    pub(crate) fn description(&self) -> &'static str {
        match self {
            Self::Timeout => "Version query timed out",
            Self::PermissionDenied => "Permission denied",
            Self::VersionParseFailed => "Failed to parse version",
            Self::IoError => "I/O error during version query",
        }
    }
}
