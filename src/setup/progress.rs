//! Progress reporting types for setup runs.
//!
//! The [`SetupProgress`] enum represents the discrete stages of a run. They
//! are reported through a callback so the caller decides how to present them;
//! the per-command spinner is rendered separately by the runner's indicator.

use crate::{InstallerStrategy, ToolchainAction};
use std::path::PathBuf;

/// Progress stages during a setup run, in the order they occur.
///
/// # Example
///
/// ```rust
/// use toolchain_bootstrap::SetupProgress;
///
/// fn on_progress(progress: SetupProgress) {
///     match &progress {
///         SetupProgress::InstallingDependencies { strategy } => {
///             println!("Installing build prerequisites with {}", strategy);
///         }
///         SetupProgress::UpdatingProfile { path } => {
///             println!("Updating {}", path.display());
///         }
///         other => println!("{}", other.description()),
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupProgress {
    /// The run has started.
    Started,

    /// Build prerequisites are being installed.
    InstallingDependencies {
        /// The selected strategy.
        strategy: InstallerStrategy,
    },

    /// One step of the dependency chain finished successfully.
    StepCompleted {
        /// The step label.
        label: String,
    },

    /// The toolchain is being installed or updated.
    InstallingToolchain {
        /// Fresh install or update.
        action: ToolchainAction,
    },

    /// The toolchain environment is being loaded into the run's search path.
    UpdatingEnvironment,

    /// The shell profile is being checked and possibly edited.
    UpdatingProfile {
        /// The profile file.
        path: PathBuf,
    },

    /// The toolchain binaries are being verified.
    Verifying,

    /// Setup completed successfully.
    Completed,
}

impl SetupProgress {
    /// Get a human-readable description of the current progress stage.
    ///
    /// # Example
    ///
    /// ```rust
    /// use toolchain_bootstrap::SetupProgress;
    ///
    /// assert_eq!(SetupProgress::Verifying.description(), "Verifying installation");
    /// ```
    pub fn description(&self) -> &'static str {
        match self {
            Self::Started => "Starting setup",
            Self::InstallingDependencies { .. } => "Installing build prerequisites",
            Self::StepCompleted { .. } => "Step completed",
            Self::InstallingToolchain { action } => action.description(),
            Self::UpdatingEnvironment => "Loading toolchain environment",
            Self::UpdatingProfile { .. } => "Updating shell profile",
            Self::Verifying => "Verifying installation",
            Self::Completed => "Setup complete",
        }
    }

    /// Check if this progress stage indicates completion.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_progress_description() {
        assert_eq!(SetupProgress::Started.description(), "Starting setup");
        assert_eq!(
            SetupProgress::InstallingDependencies {
                strategy: InstallerStrategy::Dnf
            }
            .description(),
            "Installing build prerequisites"
        );
        assert_eq!(
            SetupProgress::InstallingToolchain {
                action: ToolchainAction::FreshInstall
            }
            .description(),
            "Installing the Rust toolchain"
        );
        assert_eq!(
            SetupProgress::InstallingToolchain {
                action: ToolchainAction::Update
            }
            .description(),
            "Updating the Rust toolchain"
        );
        assert_eq!(
            SetupProgress::UpdatingProfile {
                path: PathBuf::from("/home/dev/.bashrc")
            }
            .description(),
            "Updating shell profile"
        );
        assert_eq!(SetupProgress::Completed.description(), "Setup complete");
    }

    #[test]
    fn test_setup_progress_is_complete() {
        assert!(SetupProgress::Completed.is_complete());
        assert!(!SetupProgress::Started.is_complete());
        assert!(!SetupProgress::Verifying.is_complete());
        assert!(!SetupProgress::UpdatingEnvironment.is_complete());
    }
}
