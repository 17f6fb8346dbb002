//! Setup options configuration.
//!
//! This module provides the [`SetupOptions`] struct that configures a setup
//! run: where the bootstrap script comes from, which toolchain to install,
//! whether package-manager steps use `sudo`, and timing knobs.

use crate::runner::DEFAULT_TICK_INTERVAL;
use std::time::Duration;

/// Default location of the toolchain bootstrap script.
pub const DEFAULT_INSTALLER_URL: &str = "https://sh.rustup.rs";

/// Configuration options for a setup run.
///
/// # Default Behavior
///
/// Defaults match a first-time interactive install: the official bootstrap
/// script, rustup's own default toolchain and profile, `sudo` for package
/// manager steps, and the shell profile edited.
///
/// # Example
///
/// ```rust
/// use toolchain_bootstrap::SetupOptions;
/// use std::time::Duration;
///
/// let opts = SetupOptions::default();
/// assert!(opts.use_sudo);
/// assert_eq!(opts.tick_interval, Duration::from_millis(100));
///
/// // Container image build: already root, minimal profile
/// let opts = SetupOptions {
///     use_sudo: false,
///     rustup_profile: Some("minimal".to_string()),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupOptions {
    /// URL of the bootstrap script piped into `sh` on a fresh install.
    ///
    /// Default: `https://sh.rustup.rs`
    pub installer_url: String,

    /// Toolchain to install or update (`stable`, `nightly`, `1.83.0`, ...).
    ///
    /// Default: `None`, letting rustup pick.
    pub default_toolchain: Option<String>,

    /// rustup installation profile (`minimal`, `default`, `complete`).
    ///
    /// Default: `None`
    pub rustup_profile: Option<String>,

    /// Wrap package-manager steps in `sudo`.
    ///
    /// Default: `true`
    pub use_sudo: bool,

    /// Append the environment guard to the shell profile.
    ///
    /// Default: `true`
    pub modify_profile: bool,

    /// Interval between spinner frames.
    ///
    /// Default: 100 milliseconds
    pub tick_interval: Duration,

    /// Timeout for each `--version` query during verification.
    ///
    /// Default: 2 seconds
    pub version_timeout: Duration,
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            installer_url: DEFAULT_INSTALLER_URL.to_string(),
            default_toolchain: None,
            rustup_profile: None,
            use_sudo: true,
            modify_profile: true,
            tick_interval: DEFAULT_TICK_INTERVAL,
            version_timeout: Duration::from_secs(2),
        }
    }
}
