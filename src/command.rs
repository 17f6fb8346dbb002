//! Command specifications for programmatic execution.
//!
//! A [`CommandSpec`] describes one external command: the program, its
//! arguments, and any extra environment variables. It is built once and never
//! mutated; helpers such as [`CommandSpec::with_sudo`] return a new value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A structured command for programmatic execution.
///
/// # Example
///
/// ```rust
/// use toolchain_bootstrap::CommandSpec;
///
/// let cmd = CommandSpec::new("apt-get", ["install", "-y", "build-essential"]);
/// assert_eq!(cmd.program, "apt-get");
/// assert_eq!(cmd.to_string(), "apt-get install -y build-essential");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// The program to execute (e.g., "sh", "rustup", "pacman").
    pub program: String,

    /// Arguments to pass to the program.
    pub args: Vec<String>,

    /// Environment variables to set before execution (key, value pairs).
    pub env_vars: Vec<(String, String)>,
}

impl CommandSpec {
    /// Build a command from a program name and its arguments.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            env_vars: vec![],
        }
    }

    /// Return a copy of this command with an extra environment variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Wrap the command in `sudo` when `enabled` is true.
    ///
    /// `sudo` resets the environment, so extra variables are passed through
    /// `env` on the privileged side.
    ///
    /// ```rust
    /// use toolchain_bootstrap::CommandSpec;
    ///
    /// let cmd = CommandSpec::new("dnf", ["install", "-y", "curl"]).with_sudo(true);
    /// assert_eq!(cmd.to_string(), "sudo dnf install -y curl");
    ///
    /// let cmd = CommandSpec::new("dnf", ["install"]).with_sudo(false);
    /// assert_eq!(cmd.program, "dnf");
    /// ```
    pub fn with_sudo(self, enabled: bool) -> Self {
        if !enabled {
            return self;
        }
        let mut args = Vec::with_capacity(self.args.len() + self.env_vars.len() + 2);
        if !self.env_vars.is_empty() {
            args.push("env".to_string());
            args.extend(self.env_vars.into_iter().map(|(k, v)| format!("{}={}", k, v)));
        }
        args.push(self.program);
        args.extend(self.args);
        Self {
            program: "sudo".to_string(),
            args,
            env_vars: vec![],
        }
    }
}

impl fmt::Display for CommandSpec {
    /// Renders the command as a copy-pasteable shell string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env_vars {
            write!(f, "{}={} ", key, shell_quote(value))?;
        }
        write!(f, "{}", shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

/// Quote a string for a POSIX shell, only when it needs quoting.
pub(crate) fn shell_quote(s: &str) -> String {
    if s.is_empty() {
        return "''".to_string();
    }

    if s.chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '=' | '/' | '.' | ':' | ',' | '+'))
    {
        return s.to_string();
    }

    format!("'{}'", s.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("curl"), "curl");
        assert_eq!(shell_quote("Development Tools"), "'Development Tools'");
        assert_eq!(shell_quote("it's"), "'it'\\''s'");
        assert_eq!(shell_quote("/home/user/.cargo/bin"), "/home/user/.cargo/bin");
    }

    #[test]
    fn test_display_quotes_arguments() {
        let cmd = CommandSpec::new("yum", ["groupinstall", "-y", "Development Tools"]);
        assert_eq!(cmd.to_string(), "yum groupinstall -y 'Development Tools'");
    }

    #[test]
    fn test_display_includes_env_vars() {
        let cmd = CommandSpec::new("apt-get", ["update"]).with_env("DEBIAN_FRONTEND", "noninteractive");
        assert_eq!(cmd.to_string(), "DEBIAN_FRONTEND=noninteractive apt-get update");
    }

    #[test]
    fn test_with_sudo_moves_env_behind_sudo() {
        let cmd = CommandSpec::new("apt-get", ["update"])
            .with_env("DEBIAN_FRONTEND", "noninteractive")
            .with_sudo(true);
        assert_eq!(cmd.program, "sudo");
        assert_eq!(
            cmd.args,
            vec!["env", "DEBIAN_FRONTEND=noninteractive", "apt-get", "update"]
        );
        assert!(cmd.env_vars.is_empty());
    }

    #[test]
    fn test_with_sudo_without_env() {
        let cmd = CommandSpec::new("pacman", ["-Syu"]).with_sudo(true);
        assert_eq!(cmd.args, vec!["pacman", "-Syu"]);
    }

    #[test]
    fn test_serialize() {
        let cmd = CommandSpec::new("rustup", ["update"]);
        let json = serde_json::to_string(&cmd).unwrap();
        let back: CommandSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }
}
