//! # toolchain-bootstrap
//!
//! Prepares a Linux host for Rust development.
//!
//! A run installs the native build prerequisites with whichever system
//! package manager is present (APT, YUM, DNF or Pacman), installs or updates
//! the Rust toolchain through `rustup`, makes `$CARGO_HOME/bin` visible to the
//! rest of the run and to future shells, and finally checks that `rustc` and
//! `cargo` answer.
//!
//! ## Features
//!
//! - `InstallerStrategy` selects the package manager from a fixed priority order
//! - `CommandRunner` runs each command in the background behind a spinner
//! - `SetupEnv` carries the run's environment explicitly instead of mutating
//!   the process environment
//! - `run_setup()` performs the whole run and reports progress via callback
//!
//! ## Example
//!
//! ```rust,no_run
//! use toolchain_bootstrap::{run_setup, CommandRunner, SetupEnv, SetupOptions, TerminalIndicator};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let env = SetupEnv::from_process().expect("HOME is set");
//!     let runner = CommandRunner::new(TerminalIndicator::new());
//!
//!     match run_setup(env, &SetupOptions::default(), &runner, |p| eprintln!("{}", p.description())).await {
//!         Ok(report) => print!("{}", report.env.exports_script()),
//!         Err(e) => eprintln!("{}\n{}", e, e.fix_suggestion()),
//!     }
//! }
//! ```

mod command;
mod detection;
mod env;
mod options;
mod profile;
mod runner;
mod setup;
mod strategy;
mod toolchain;
mod verify;

pub use command::CommandSpec;
pub use env::SetupEnv;
pub use options::{SetupOptions, DEFAULT_INSTALLER_URL};
pub use profile::{ensure_guard, guard_line, ProfileEdit, ProfileTarget, ShellKind, GUARD_COMMENT};
pub use runner::{
    CommandRunner, ExecutionResult, Indicator, SilentIndicator, TerminalIndicator,
    DEFAULT_TICK_INTERVAL, SPINNER_GLYPHS,
};
pub use setup::{execute_plan, run_setup, SetupError, SetupPlan, SetupProgress, SetupReport};
pub use strategy::{InstallerStrategy, StrategyStep};
pub use toolchain::{ToolchainAction, ToolchainState, TOOLCHAIN_MANAGER};
pub use verify::{verify_toolchain, ToolVersion, EXPECTED_BINARIES};
