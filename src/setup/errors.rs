//! Error types for setup runs.
//!
//! Every failure is fatal to the run. Each variant carries an actionable
//! `fix` suggestion for the user.

use crate::{InstallerStrategy, ToolchainAction};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a setup run.
///
/// `exit_code` fields are `None` when the command could not be started at
/// all (for example, `sudo` is not installed).
///
/// # Example
///
/// ```rust
/// use toolchain_bootstrap::SetupError;
///
/// fn report(error: &SetupError) {
///     eprintln!("error: {}", error);
///     eprintln!("fix: {}", error.fix_suggestion());
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SetupError {
    /// `HOME` is not set, so no profile or toolchain location can be derived.
    #[error("HOME is not set")]
    MissingHome {
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// None of the supported package managers is on the search path.
    #[error("No supported package manager found (looked for apt-get, yum, dnf, pacman)")]
    UnsupportedPackageManager {
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// `sudo -v` failed, so privileged steps cannot run.
    #[error("Could not obtain sudo credentials{}", exit_suffix(.exit_code))]
    SudoUnavailable {
        /// Exit code of `sudo -v`, if it ran.
        exit_code: Option<i32>,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// A package-manager step exited non-zero.
    #[error("{strategy} step '{step}' failed{}", exit_suffix(.exit_code))]
    DependencyInstallFailed {
        /// The selected strategy.
        strategy: InstallerStrategy,
        /// Label of the failed step.
        step: String,
        /// Exit code of the step, if it ran.
        exit_code: Option<i32>,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// Installing or updating the toolchain failed.
    #[error("Toolchain {action} failed{}", exit_suffix(.exit_code))]
    ToolchainInstallFailed {
        /// Whether this was a fresh install or an update.
        action: ToolchainAction,
        /// Exit code of the installer, if it ran.
        exit_code: Option<i32>,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// The search path could not be extended with the toolchain's bin directory.
    #[error("Failed to update PATH: {message}")]
    PathUpdateFailed {
        /// Description of the failure.
        message: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// The shell profile could not be read or written.
    #[error("Failed to update {}: {message}", .path.display())]
    ProfileUpdateFailed {
        /// The profile file.
        path: PathBuf,
        /// Description of the failure.
        message: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// The toolchain binaries are missing after installation.
    #[error("Verification failed: {} not found after installation", .missing.join(", "))]
    VerificationFailed {
        /// Names of the binaries that were not found.
        missing: Vec<String>,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },
}

impl SetupError {
    /// Get an actionable suggestion for fixing this error.
    pub fn fix_suggestion(&self) -> &str {
        match self {
            Self::MissingHome { fix } => fix,
            Self::UnsupportedPackageManager { fix } => fix,
            Self::SudoUnavailable { fix, .. } => fix,
            Self::DependencyInstallFailed { fix, .. } => fix,
            Self::ToolchainInstallFailed { fix, .. } => fix,
            Self::PathUpdateFailed { fix, .. } => fix,
            Self::ProfileUpdateFailed { fix, .. } => fix,
            Self::VerificationFailed { fix, .. } => fix,
        }
    }

    /// Process exit code for this error. Every setup failure is fatal.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

fn exit_suffix(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!(" with exit code {}", code),
        None => ": command could not be started".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_variants() -> Vec<SetupError> {
        vec![
            SetupError::MissingHome {
                fix: "Set HOME".to_string(),
            },
            SetupError::UnsupportedPackageManager {
                fix: "Install build tools manually".to_string(),
            },
            SetupError::SudoUnavailable {
                exit_code: Some(1),
                fix: "Run as a sudoer or pass --no-sudo".to_string(),
            },
            SetupError::DependencyInstallFailed {
                strategy: InstallerStrategy::Pacman,
                step: "Installing libraries".to_string(),
                exit_code: Some(1),
                fix: "Run the command by hand".to_string(),
            },
            SetupError::ToolchainInstallFailed {
                action: ToolchainAction::FreshInstall,
                exit_code: None,
                fix: "Check network".to_string(),
            },
            SetupError::PathUpdateFailed {
                message: "bad entry".to_string(),
                fix: "Fix CARGO_HOME".to_string(),
            },
            SetupError::ProfileUpdateFailed {
                path: PathBuf::from("/home/dev/.bashrc"),
                message: "Permission denied".to_string(),
                fix: "Check permissions".to_string(),
            },
            SetupError::VerificationFailed {
                missing: vec!["rustc".to_string(), "cargo".to_string()],
                fix: "Check PATH".to_string(),
            },
        ]
    }

    #[test]
    fn test_all_variants_have_fix_and_exit_code() {
        for error in all_variants() {
            assert!(!error.fix_suggestion().is_empty(), "{:?}", error);
            assert_eq!(error.exit_code(), 1);
        }
    }

    #[test]
    fn test_dependency_failure_display() {
        let error = SetupError::DependencyInstallFailed {
            strategy: InstallerStrategy::Apt,
            step: "Refreshing package metadata".to_string(),
            exit_code: Some(100),
            fix: "x".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "APT step 'Refreshing package metadata' failed with exit code 100"
        );
    }

    #[test]
    fn test_verification_failed_display() {
        let error = SetupError::VerificationFailed {
            missing: vec!["rustc".to_string(), "cargo".to_string()],
            fix: "x".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Verification failed: rustc, cargo not found after installation"
        );
    }

    #[test]
    fn test_toolchain_failure_display() {
        let error = SetupError::ToolchainInstallFailed {
            action: ToolchainAction::Update,
            exit_code: Some(1),
            fix: "x".to_string(),
        };
        assert_eq!(error.to_string(), "Toolchain update failed with exit code 1");

        let error = SetupError::ToolchainInstallFailed {
            action: ToolchainAction::FreshInstall,
            exit_code: None,
            fix: "x".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Toolchain fresh install failed: command could not be started"
        );
    }

    #[test]
    fn test_profile_failure_display() {
        let error = SetupError::ProfileUpdateFailed {
            path: PathBuf::from("/home/dev/.zshrc"),
            message: "Read-only file system".to_string(),
            fix: "x".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to update /home/dev/.zshrc: Read-only file system"
        );
    }
}
