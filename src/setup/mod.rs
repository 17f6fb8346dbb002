//! Setup planning and execution.
//!
//! A run is planned once (package-manager probe, toolchain probe, profile
//! target) and then executed step by step. The plan can also be rendered
//! without executing anything.
//!
//! # Example
//!
//! ```rust,no_run
//! use toolchain_bootstrap::{SetupEnv, SetupOptions, SetupPlan};
//!
//! let env = SetupEnv::from_process().expect("HOME is set");
//! match SetupPlan::build(&env, &SetupOptions::default()) {
//!     Ok(plan) => {
//!         println!("Using {}", plan.strategy);
//!         for step in &plan.dependency_steps {
//!             println!("  {}", step.command);
//!         }
//!         for step in &plan.toolchain_steps {
//!             println!("  {}", step.command);
//!         }
//!     }
//!     Err(e) => eprintln!("{}: {}", e, e.fix_suggestion()),
//! }
//! ```

mod errors;
mod executor;
mod progress;

pub use errors::SetupError;
pub use executor::{execute_plan, run_setup};
pub use progress::SetupProgress;

use crate::profile::guard_line;
use crate::{
    InstallerStrategy, ProfileEdit, ProfileTarget, SetupEnv, SetupOptions, StrategyStep,
    ToolVersion, ToolchainAction, ToolchainState,
};
use serde::Serialize;
use std::path::PathBuf;

/// Everything a run will do, decided up front.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupPlan {
    /// The selected package-manager strategy. Never `Unsupported`.
    pub strategy: InstallerStrategy,

    /// Whether privileged steps are wrapped in `sudo`.
    pub use_sudo: bool,

    /// The strategy's install chain.
    pub dependency_steps: Vec<StrategyStep>,

    /// Toolchain manager state at planning time.
    pub toolchain: ToolchainState,

    /// Fresh install or update.
    pub toolchain_action: ToolchainAction,

    /// The steps for `toolchain_action`.
    ///
    /// A fresh install is shown downloading to `$TMPDIR/rustup-init.sh`; the
    /// executed steps download to a new temporary file instead.
    pub toolchain_steps: Vec<StrategyStep>,

    /// Profile file to edit, or `None` when profile edits are disabled.
    pub profile: Option<ProfileTarget>,

    /// The line that must appear in the profile.
    pub guard_line: String,
}

impl SetupPlan {
    /// Probe `env` and decide every step of the run.
    ///
    /// Fails with [`SetupError::UnsupportedPackageManager`] before anything
    /// is executed when no known package manager is present.
    pub fn build(env: &SetupEnv, options: &SetupOptions) -> Result<Self, SetupError> {
        let strategy = InstallerStrategy::select(env);
        if !strategy.is_supported() {
            return Err(SetupError::UnsupportedPackageManager {
                fix: "Install a C toolchain, pkg-config, OpenSSL headers and curl with your \
                      system's package manager, then run again"
                    .to_string(),
            });
        }

        let toolchain = ToolchainState::detect(env);
        let toolchain_action = toolchain.action();
        let toolchain_steps = toolchain.steps(options, &preview_script_path());

        Ok(Self {
            strategy,
            use_sudo: options.use_sudo,
            dependency_steps: strategy.steps(options.use_sudo),
            toolchain,
            toolchain_action,
            toolchain_steps,
            profile: options.modify_profile.then(|| ProfileTarget::for_env(env)),
            guard_line: guard_line(env),
        })
    }
}

fn preview_script_path() -> PathBuf {
    std::env::temp_dir().join("rustup-init.sh")
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct SetupReport {
    /// The strategy that installed the prerequisites.
    pub strategy: InstallerStrategy,

    /// Whether the toolchain was freshly installed or updated.
    pub toolchain_action: ToolchainAction,

    /// The profile edit, when profile edits were enabled.
    pub profile: Option<(ProfileTarget, ProfileEdit)>,

    /// Verified `rustc` and `cargo`, in that order.
    pub versions: Vec<ToolVersion>,

    /// The environment after the run; apply it with
    /// [`SetupEnv::exports_script`].
    pub env: SetupEnv,
}
