//! Install-or-update of the toolchain manager.
//!
//! The toolchain is either absent or present. A fresh install downloads the
//! remote bootstrap script and runs it with `-y`; an existing install is
//! updated in place. There are no other transitions.

use crate::detection::find_executable;
use crate::{CommandSpec, SetupEnv, SetupOptions, StrategyStep};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the toolchain manager executable.
pub const TOOLCHAIN_MANAGER: &str = "rustup";

/// Whether the toolchain manager is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolchainState {
    NotInstalled,
    Installed {
        /// Where `rustup` was found.
        path: PathBuf,
    },
}

/// What the toolchain step will do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolchainAction {
    /// Download and run the bootstrap script.
    FreshInstall,
    /// Run `rustup update`.
    Update,
}

impl ToolchainAction {
    pub fn description(&self) -> &'static str {
        match self {
            Self::FreshInstall => "Installing the Rust toolchain",
            Self::Update => "Updating the Rust toolchain",
        }
    }
}

impl std::fmt::Display for ToolchainAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FreshInstall => write!(f, "fresh install"),
            Self::Update => write!(f, "update"),
        }
    }
}

impl ToolchainState {
    /// Look for `rustup` on the search path, then in `$CARGO_HOME/bin`.
    pub fn detect(env: &SetupEnv) -> Self {
        let found = env
            .find_executable(TOOLCHAIN_MANAGER)
            .or_else(|| find_executable(TOOLCHAIN_MANAGER, &[env.cargo_bin()]));

        match found {
            Some(path) => {
                tracing::info!(path = %path.display(), "toolchain manager found");
                Self::Installed { path }
            }
            None => {
                tracing::info!("toolchain manager not found");
                Self::NotInstalled
            }
        }
    }

    pub fn is_installed(&self) -> bool {
        matches!(self, Self::Installed { .. })
    }

    /// The action to take from this state.
    pub fn action(&self) -> ToolchainAction {
        match self {
            Self::NotInstalled => ToolchainAction::FreshInstall,
            Self::Installed { .. } => ToolchainAction::Update,
        }
    }

    /// The checked steps that perform [`ToolchainState::action`].
    ///
    /// A fresh install downloads the bootstrap script to `script` and runs it
    /// as a separate step, so a failed download stops the run instead of
    /// feeding an empty script to the shell. An update is a single
    /// `rustup update` and ignores `script`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::path::Path;
    /// use toolchain_bootstrap::{SetupOptions, ToolchainState};
    ///
    /// let steps = ToolchainState::NotInstalled.steps(&SetupOptions::default(), Path::new("/tmp/init.sh"));
    /// assert_eq!(steps.len(), 2);
    /// assert_eq!(steps[0].command.program, "curl");
    /// assert_eq!(steps[1].command.to_string(), "sh /tmp/init.sh -y --no-modify-path");
    /// ```
    pub fn steps(&self, options: &SetupOptions, script: &Path) -> Vec<StrategyStep> {
        match self {
            Self::NotInstalled => fresh_install_steps(options, script),
            Self::Installed { path } => {
                let mut args = vec!["update".to_string()];
                if let Some(toolchain) = &options.default_toolchain {
                    args.push(toolchain.clone());
                }
                vec![StrategyStep::new(
                    ToolchainAction::Update.description(),
                    CommandSpec::new(path.to_string_lossy(), args),
                )]
            }
        }
    }
}

fn fresh_install_steps(options: &SetupOptions, script: &Path) -> Vec<StrategyStep> {
    let script = script.to_string_lossy().into_owned();

    let download = CommandSpec::new(
        "curl",
        [
            "--proto".to_string(),
            "=https".to_string(),
            "--tlsv1.2".to_string(),
            "-sSf".to_string(),
            "-o".to_string(),
            script.clone(),
            options.installer_url.clone(),
        ],
    );

    let mut init_args = vec![script, "-y".to_string(), "--no-modify-path".to_string()];
    if let Some(toolchain) = &options.default_toolchain {
        init_args.push("--default-toolchain".to_string());
        init_args.push(toolchain.clone());
    }
    if let Some(profile) = &options.rustup_profile {
        init_args.push("--profile".to_string());
        init_args.push(profile.clone());
    }

    vec![
        StrategyStep::new("Downloading the toolchain installer", download),
        StrategyStep::new(
            ToolchainAction::FreshInstall.description(),
            CommandSpec::new("sh", init_args),
        ),
    ]
}
