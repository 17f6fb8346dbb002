//! Package-manager strategies for installing build prerequisites.

use crate::{CommandSpec, SetupEnv};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// How build prerequisites are installed on this host.
///
/// Supported strategies are probed in declaration order; the first whose
/// package-manager binary is on the search path wins. `Unsupported` is the
/// result when none is found.
///
/// # Example
///
/// ```rust
/// use toolchain_bootstrap::InstallerStrategy;
///
/// let order: Vec<_> = InstallerStrategy::probe_order().map(|s| s.executable_name()).collect();
/// assert_eq!(order, ["apt-get", "yum", "dnf", "pacman"]);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter,
)]
pub enum InstallerStrategy {
    /// Debian, Ubuntu and derivatives (`apt-get`)
    Apt,
    /// RHEL, CentOS and older Fedora (`yum`)
    Yum,
    /// Fedora and newer RHEL (`dnf`)
    Dnf,
    /// Arch Linux and derivatives (`pacman`)
    Pacman,
    /// No known package manager was found.
    Unsupported,
}

/// One checked step of an install chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyStep {
    /// Human-readable label shown next to the spinner.
    pub label: String,

    /// The command to run.
    pub command: CommandSpec,
}

impl StrategyStep {
    pub(crate) fn new(label: &str, command: CommandSpec) -> Self {
        Self {
            label: label.to_string(),
            command,
        }
    }
}

impl InstallerStrategy {
    /// Supported strategies in probe priority order.
    pub fn probe_order() -> impl Iterator<Item = Self> {
        <Self as IntoEnumIterator>::iter().filter(|s| *s != Self::Unsupported)
    }

    /// Probe `env`'s search path once and pick a strategy.
    ///
    /// Always returns exactly one value; [`InstallerStrategy::Unsupported`]
    /// when no known package manager is present.
    pub fn select(env: &SetupEnv) -> Self {
        for strategy in Self::probe_order() {
            if let Some(path) = env.find_executable(strategy.executable_name()) {
                tracing::info!(strategy = %strategy, path = %path.display(), "package manager detected");
                return strategy;
            }
        }
        tracing::warn!("no supported package manager found");
        Self::Unsupported
    }

    /// The package-manager executable probed for this strategy.
    pub fn executable_name(&self) -> &'static str {
        match self {
            Self::Apt => "apt-get",
            Self::Yum => "yum",
            Self::Dnf => "dnf",
            Self::Pacman => "pacman",
            Self::Unsupported => "",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Apt => "APT",
            Self::Yum => "YUM",
            Self::Dnf => "DNF",
            Self::Pacman => "Pacman",
            Self::Unsupported => "unsupported",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    /// The ordered install chain for this strategy.
    ///
    /// The first step refreshes metadata or installs the development tools
    /// group, the second installs the libraries the toolchain links against.
    /// Every step is wrapped in `sudo` when `sudo` is true. `Unsupported` has
    /// no steps.
    pub fn steps(&self, sudo: bool) -> Vec<StrategyStep> {
        let steps = match self {
            Self::Apt => vec![
                StrategyStep::new(
                    "Refreshing package metadata",
                    CommandSpec::new("apt-get", ["update"]),
                ),
                StrategyStep::new(
                    "Installing build tools and libraries",
                    CommandSpec::new(
                        "apt-get",
                        ["install", "-y", "build-essential", "pkg-config", "libssl-dev", "curl"],
                    )
                    .with_env("DEBIAN_FRONTEND", "noninteractive"),
                ),
            ],
            Self::Yum => vec![
                StrategyStep::new(
                    "Installing development tools",
                    CommandSpec::new("yum", ["groupinstall", "-y", "Development Tools"]),
                ),
                StrategyStep::new(
                    "Installing libraries",
                    CommandSpec::new("yum", ["install", "-y", "openssl-devel", "pkgconfig", "curl"]),
                ),
            ],
            Self::Dnf => vec![
                StrategyStep::new(
                    "Installing development tools",
                    CommandSpec::new("dnf", ["groupinstall", "-y", "Development Tools"]),
                ),
                StrategyStep::new(
                    "Installing libraries",
                    CommandSpec::new(
                        "dnf",
                        ["install", "-y", "openssl-devel", "pkgconf-pkg-config", "curl"],
                    ),
                ),
            ],
            Self::Pacman => vec![
                StrategyStep::new(
                    "Updating system and installing base-devel",
                    CommandSpec::new("pacman", ["-Syu", "--noconfirm", "--needed", "base-devel"]),
                ),
                StrategyStep::new(
                    "Installing libraries",
                    CommandSpec::new(
                        "pacman",
                        ["-S", "--noconfirm", "--needed", "openssl", "pkgconf", "curl"],
                    ),
                ),
            ],
            Self::Unsupported => vec![],
        };

        steps
            .into_iter()
            .map(|step| StrategyStep {
                command: step.command.with_sudo(sudo),
                ..step
            })
            .collect()
    }
}

impl std::fmt::Display for InstallerStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
