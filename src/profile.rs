//! Idempotent shell-profile edits.
//!
//! Future shells pick up the toolchain by sourcing `$CARGO_HOME/env` from
//! their startup file. The edit appends a guarded block once; the guard line
//! itself is the duplicate check.

use crate::SetupEnv;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Comment written above the guard line.
pub const GUARD_COMMENT: &str = "# Rust toolchain environment";

const MAX_LINK_DEPTH: usize = 40;

/// Shells with a dedicated startup file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShellKind {
    Bash,
    Zsh,
    /// Any other shell, or none; uses the generic `~/.profile`.
    Other,
}

impl ShellKind {
    /// Classify a `$SHELL` value by its basename.
    ///
    /// ```rust
    /// use toolchain_bootstrap::ShellKind;
    ///
    /// assert_eq!(ShellKind::from_shell(Some("/usr/bin/zsh")), ShellKind::Zsh);
    /// assert_eq!(ShellKind::from_shell(Some("/bin/fish")), ShellKind::Other);
    /// assert_eq!(ShellKind::from_shell(None), ShellKind::Other);
    /// ```
    pub fn from_shell(shell: Option<&str>) -> Self {
        let name = shell
            .and_then(|s| Path::new(s).file_name())
            .and_then(|n| n.to_str())
            .map(|n| n.trim_start_matches('-'));

        match name {
            Some("bash") => Self::Bash,
            Some("zsh") => Self::Zsh,
            _ => Self::Other,
        }
    }

    /// Startup file name, relative to `$HOME`.
    pub fn profile_file_name(&self) -> &'static str {
        match self {
            Self::Bash => ".bashrc",
            Self::Zsh => ".zshrc",
            Self::Other => ".profile",
        }
    }
}

/// The startup file that will source the toolchain environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileTarget {
    pub shell: ShellKind,
    pub path: PathBuf,
}

impl ProfileTarget {
    /// Choose the profile file from the env's shell identity.
    pub fn for_env(env: &SetupEnv) -> Self {
        let shell = ShellKind::from_shell(env.shell());
        Self {
            shell,
            path: env.home().join(shell.profile_file_name()),
        }
    }
}

/// Result of [`ensure_guard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileEdit {
    /// The guarded block was appended.
    Appended,
    /// The guard line was already there; the file was not touched.
    AlreadyPresent,
}

/// The line that activates the toolchain environment.
///
/// Uses a literal `$HOME` when `CARGO_HOME` is the default location so the
/// line stays valid in dotfiles shared across machines.
///
/// ```rust
/// use toolchain_bootstrap::{guard_line, SetupEnv};
///
/// let env = SetupEnv::new("/home/dev", vec![]);
/// assert_eq!(guard_line(&env), ". \"$HOME/.cargo/env\"");
///
/// let env = env.with_cargo_home("/opt/cargo");
/// assert_eq!(guard_line(&env), ". \"/opt/cargo/env\"");
/// ```
pub fn guard_line(env: &SetupEnv) -> String {
    if env.uses_default_cargo_home() {
        ". \"$HOME/.cargo/env\"".to_string()
    } else {
        format!(". \"{}\"", env.cargo_env_file().display())
    }
}

/// Append the guarded block to `path` unless `guard` is already in it.
///
/// Symlinks are followed, dangling ones included, so the link itself
/// survives. An existing file is rewritten through a temporary file next to
/// it and renamed over it, keeping its permissions. A missing file is created
/// with the process umask applied.
pub fn ensure_guard(path: &Path, guard: &str) -> io::Result<ProfileEdit> {
    let target = resolve_target(path)?;

    let existing = match fs::read_to_string(&target) {
        Ok(contents) => Some(contents),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(e),
    };

    if existing.as_deref().is_some_and(|c| c.contains(guard)) {
        tracing::debug!(path = %target.display(), "guard already present");
        return Ok(ProfileEdit::AlreadyPresent);
    }

    let contents = with_guard_block(existing.as_deref().unwrap_or(""), guard);
    match existing {
        Some(_) => replace_file(&target, &contents)?,
        None => create_file(&target, &contents)?,
    }
    tracing::info!(path = %target.display(), "guard appended to profile");
    Ok(ProfileEdit::Appended)
}

fn resolve_target(path: &Path) -> io::Result<PathBuf> {
    let mut current = path.to_path_buf();
    for _ in 0..MAX_LINK_DEPTH {
        match fs::canonicalize(&current) {
            Ok(resolved) => return Ok(resolved),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        // Dangling link: continue with its destination
        match fs::symlink_metadata(&current) {
            Ok(meta) if meta.file_type().is_symlink() => {
                let link = fs::read_link(&current)?;
                current = match current.parent() {
                    Some(parent) => parent.join(link),
                    None => link,
                };
            }
            _ => return Ok(current),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("too many levels of symbolic links: {}", path.display()),
    ))
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn replace_file(target: &Path, contents: &str) -> io::Result<()> {
    let permissions = fs::metadata(target)?.permissions();

    let mut tmp = NamedTempFile::new_in(parent_dir(target))?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    fs::set_permissions(tmp.path(), permissions)?;

    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

fn create_file(target: &Path, contents: &str) -> io::Result<()> {
    fs::create_dir_all(parent_dir(target))?;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

fn with_guard_block(existing: &str, guard: &str) -> String {
    let mut out = String::with_capacity(existing.len() + GUARD_COMMENT.len() + guard.len() + 4);
    out.push_str(existing);
    if !out.is_empty() {
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push('\n');
    }
    out.push_str(GUARD_COMMENT);
    out.push('\n');
    out.push_str(guard);
    out.push('\n');
    out
}
