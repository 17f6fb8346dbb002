//! The explicit environment a setup run works against.
//!
//! Nothing in this crate reads or writes the ambient process environment after
//! startup. [`SetupEnv`] is captured once, handed to every step, and extended
//! by returning new values. Applying it to the invoking shell happens only at
//! the very end, through [`SetupEnv::exports_script`].

use crate::command::shell_quote;
use crate::detection::find_executable;
use crate::SetupError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Process environment relevant to installing the toolchain.
///
/// # Example
///
/// ```rust
/// use toolchain_bootstrap::SetupEnv;
/// use std::path::PathBuf;
///
/// let env = SetupEnv::new("/home/dev", vec![PathBuf::from("/usr/bin")]);
/// assert_eq!(env.cargo_home(), PathBuf::from("/home/dev/.cargo"));
/// assert_eq!(env.rustup_home(), PathBuf::from("/home/dev/.rustup"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupEnv {
    home: PathBuf,
    search_path: Vec<PathBuf>,
    rustup_home: PathBuf,
    cargo_home: PathBuf,
    shell: Option<String>,
}

impl SetupEnv {
    /// Build an environment with default toolchain homes under `home`.
    pub fn new(home: impl Into<PathBuf>, search_path: Vec<PathBuf>) -> Self {
        let home = home.into();
        Self {
            rustup_home: home.join(".rustup"),
            cargo_home: home.join(".cargo"),
            home,
            search_path,
            shell: None,
        }
    }

    /// Capture the current process environment.
    pub fn from_process() -> Result<Self, SetupError> {
        Self::from_vars(std::env::vars_os())
    }

    /// Build an environment from `(name, value)` pairs.
    ///
    /// `HOME` is required. `RUSTUP_HOME` and `CARGO_HOME` fall back to
    /// `$HOME/.rustup` and `$HOME/.cargo` when unset or empty.
    pub fn from_vars<I>(vars: I) -> Result<Self, SetupError>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut home = None;
        let mut path = None;
        let mut rustup_home = None;
        let mut cargo_home = None;
        let mut shell = None;

        for (key, value) in vars {
            if value.is_empty() {
                continue;
            }
            match key.to_str() {
                Some("HOME") => home = Some(PathBuf::from(value)),
                Some("PATH") => path = Some(value),
                Some("RUSTUP_HOME") => rustup_home = Some(PathBuf::from(value)),
                Some("CARGO_HOME") => cargo_home = Some(PathBuf::from(value)),
                Some("SHELL") => shell = Some(value.to_string_lossy().into_owned()),
                _ => {}
            }
        }

        let home = home.ok_or_else(|| SetupError::MissingHome {
            fix: "Set HOME to your home directory and run again".to_string(),
        })?;

        let search_path = path
            .map(|p| {
                std::env::split_paths(&p)
                    .filter(|entry| !entry.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let mut env = Self::new(home, search_path);
        if let Some(dir) = rustup_home {
            env.rustup_home = dir;
        }
        if let Some(dir) = cargo_home {
            env.cargo_home = dir;
        }
        env.shell = shell;
        Ok(env)
    }

    /// Set the shell identity (the value `$SHELL` would carry).
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = Some(shell.into());
        self
    }

    /// Override `CARGO_HOME`.
    pub fn with_cargo_home(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cargo_home = dir.into();
        self
    }

    /// Override `RUSTUP_HOME`.
    pub fn with_rustup_home(mut self, dir: impl Into<PathBuf>) -> Self {
        self.rustup_home = dir.into();
        self
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    pub fn rustup_home(&self) -> &Path {
        &self.rustup_home
    }

    pub fn cargo_home(&self) -> &Path {
        &self.cargo_home
    }

    pub fn shell(&self) -> Option<&str> {
        self.shell.as_deref()
    }

    /// Directory the toolchain installs its binaries to.
    pub fn cargo_bin(&self) -> PathBuf {
        self.cargo_home.join("bin")
    }

    /// The environment file the toolchain installer writes.
    pub fn cargo_env_file(&self) -> PathBuf {
        self.cargo_home.join("env")
    }

    /// Whether `CARGO_HOME` is the conventional `$HOME/.cargo`.
    pub fn uses_default_cargo_home(&self) -> bool {
        self.cargo_home == self.home.join(".cargo")
    }

    /// Look up an executable on this environment's search path.
    pub fn find_executable(&self, name: &str) -> Option<PathBuf> {
        find_executable(name, &self.search_path)
    }

    /// Join the search path into a `PATH` value.
    pub fn joined_search_path(&self) -> Result<OsString, std::env::JoinPathsError> {
        std::env::join_paths(&self.search_path)
    }

    /// Variables every child process receives on top of the inherited ones.
    pub fn child_vars(&self) -> Result<Vec<(&'static str, OsString)>, std::env::JoinPathsError> {
        Ok(vec![
            ("PATH", self.joined_search_path()?),
            ("RUSTUP_HOME", self.rustup_home.clone().into_os_string()),
            ("CARGO_HOME", self.cargo_home.clone().into_os_string()),
        ])
    }

    /// Return an environment whose search path starts with `$CARGO_HOME/bin`.
    ///
    /// The path is extended, never replaced. Already-present entries are left
    /// where they are.
    pub fn with_cargo_bin(mut self) -> Result<Self, SetupError> {
        let bin = self.cargo_bin();
        if !self.search_path.iter().any(|entry| entry == &bin) {
            self.search_path.insert(0, bin);
        }

        if let Err(e) = self.joined_search_path() {
            return Err(SetupError::PathUpdateFailed {
                message: e.to_string(),
                fix: format!(
                    "Remove the ':' from {} or choose a different CARGO_HOME",
                    self.cargo_bin().display()
                ),
            });
        }

        tracing::debug!(path = ?self.search_path, "search path updated");
        Ok(self)
    }

    /// Shell code that applies this environment to the invoking shell.
    ///
    /// Intended for `eval "$(toolchain-bootstrap --shell-exports)"`.
    pub fn exports_script(&self) -> String {
        let path = self
            .search_path
            .iter()
            .map(|p| p.to_string_lossy())
            .collect::<Vec<_>>()
            .join(":");
        format!(
            "export RUSTUP_HOME={}\nexport CARGO_HOME={}\nexport PATH={}\n",
            quote_path(&self.rustup_home),
            quote_path(&self.cargo_home),
            shell_quote(&path),
        )
    }
}

fn quote_path(path: &Path) -> String {
    shell_quote(&path.to_string_lossy())
}
