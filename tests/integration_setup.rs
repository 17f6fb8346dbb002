//! End-to-end setup runs against fake package managers and a fake bootstrap
//! download.
//!
//! Each test builds a throwaway home directory and a bin directory that is
//! the only entry on the search path, so nothing on the host is touched.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use toolchain_bootstrap::{
    run_setup, CommandRunner, InstallerStrategy, ProfileEdit, SetupEnv, SetupError, SetupOptions,
    SilentIndicator, ToolchainAction, GUARD_COMMENT,
};

struct Host {
    _root: tempfile::TempDir,
    home: PathBuf,
    bin: PathBuf,
    staged: PathBuf,
    log: PathBuf,
}

impl Host {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let home = root.path().join("home");
        let bin = root.path().join("bin");
        let staged = root.path().join("staged");
        for dir in [&home, &bin, &staged] {
            fs::create_dir_all(dir).unwrap();
        }
        let log = root.path().join("calls.log");
        Self {
            _root: root,
            home,
            bin,
            staged,
            log,
        }
    }

    /// A host with `pacman` and `sh` on the search path.
    fn pacman() -> Self {
        let host = Self::new();
        host.script(&host.bin, "pacman", "exit 0");
        std::os::unix::fs::symlink("/bin/sh", host.bin.join("sh")).unwrap();
        host
    }

    fn vars(&self) -> Vec<(OsString, OsString)> {
        vec![
            ("HOME".into(), self.home.clone().into_os_string()),
            ("PATH".into(), self.bin.clone().into_os_string()),
            ("SHELL".into(), "/bin/bash".into()),
        ]
    }

    fn env(&self) -> SetupEnv {
        SetupEnv::from_vars(self.vars()).unwrap()
    }

    fn script(&self, dir: &Path, name: &str, body: &str) {
        let path = dir.join(name);
        let contents = format!(
            "#!/bin/sh\necho \"{} $*\" >> '{}'\n{}\n",
            name,
            self.log.display(),
            body
        );
        fs::write(&path, contents).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// Fake `curl` that saves `installer` to its `-o` argument.
    fn serve_installer(&self, installer: &str) {
        let source = self.staged.join("installer.sh");
        fs::write(&source, installer).unwrap();
        self.script(
            &self.bin,
            "curl",
            &format!("/bin/cp '{}' \"$6\"", source.display()),
        );
    }

    /// Fake `curl` that fails the way a DNS or HTTP error does.
    fn fail_download(&self, status: i32) {
        self.script(&self.bin, "curl", &format!("exit {}", status));
    }

    /// An installer that drops a working toolchain into `$CARGO_HOME/bin`.
    fn toolchain_installer(&self) -> String {
        self.script(&self.staged, "rustup", "exit 0");
        self.script(&self.staged, "rustc", "echo 'rustc 1.83.0 (90b35a623 2024-11-26)'");
        self.script(&self.staged, "cargo", "echo 'cargo 1.83.0 (5ffbef321 2024-10-29)'");

        format!(
            "echo \"rustup-init $*\" >> '{log}'\n\
             /bin/mkdir -p \"$CARGO_HOME/bin\"\n\
             /bin/cp -p '{staged}/rustup' '{staged}/rustc' '{staged}/cargo' \"$CARGO_HOME/bin/\"\n\
             echo 'export PATH=\"$CARGO_HOME/bin:$PATH\"' > \"$CARGO_HOME/env\"\n",
            log = self.log.display(),
            staged = self.staged.display()
        )
    }

    fn calls(&self, program: &str) -> Vec<String> {
        let prefix = format!("{} ", program);
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .filter(|l| l.starts_with(&prefix))
            .map(str::to_string)
            .collect()
    }
}

fn options() -> SetupOptions {
    SetupOptions {
        use_sudo: false,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_fresh_install_then_rerun() {
    let host = Host::pacman();
    host.serve_installer(&host.toolchain_installer());
    let runner = CommandRunner::new(SilentIndicator);

    let report = run_setup(host.env(), &options(), &runner, |_| {})
        .await
        .unwrap();

    assert_eq!(report.strategy, InstallerStrategy::Pacman);
    assert_eq!(report.toolchain_action, ToolchainAction::FreshInstall);
    assert_eq!(
        host.calls("pacman"),
        vec![
            "pacman -Syu --noconfirm --needed base-devel",
            "pacman -S --noconfirm --needed openssl pkgconf curl",
        ]
    );
    assert_eq!(host.calls("curl").len(), 1);
    assert_eq!(host.calls("rustup-init"), vec!["rustup-init -y --no-modify-path"]);
    assert_eq!(report.versions.len(), 2);
    assert!(report.versions.iter().all(|v| !v.raw.is_empty()));

    let bashrc = host.home.join(".bashrc");
    let contents = fs::read_to_string(&bashrc).unwrap();
    assert_eq!(contents.matches(GUARD_COMMENT).count(), 1);
    assert!(contents.contains(". \"$HOME/.cargo/env\""));

    let exports = report.env.exports_script();
    assert!(exports.contains(&host.home.join(".cargo/bin").display().to_string()));

    // Second run updates in place and leaves the profile alone
    let report = run_setup(host.env(), &options(), &runner, |_| {})
        .await
        .unwrap();

    assert_eq!(report.toolchain_action, ToolchainAction::Update);
    assert_eq!(report.profile.map(|p| p.1), Some(ProfileEdit::AlreadyPresent));
    assert_eq!(host.calls("rustup"), vec!["rustup update"]);
    assert_eq!(host.calls("curl").len(), 1);
    assert_eq!(host.calls("pacman").len(), 4);

    let contents = fs::read_to_string(&bashrc).unwrap();
    assert_eq!(contents.matches(GUARD_COMMENT).count(), 1);
}

#[tokio::test]
async fn test_failed_download_stops_before_profile() {
    let host = Host::pacman();
    host.fail_download(6);

    let runner = CommandRunner::new(SilentIndicator);
    let err = run_setup(host.env(), &options(), &runner, |_| {})
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            SetupError::ToolchainInstallFailed {
                action: ToolchainAction::FreshInstall,
                exit_code: Some(6),
                ..
            }
        ),
        "unexpected error: {:?}",
        err
    );
    assert!(host.calls("rustup-init").is_empty());
    assert!(!host.home.join(".bashrc").exists());
}

#[tokio::test]
async fn test_installer_without_binaries_fails_verification() {
    let host = Host::pacman();
    host.serve_installer("exit 0\n");

    let runner = CommandRunner::new(SilentIndicator);
    let err = run_setup(host.env(), &options(), &runner, |_| {})
        .await
        .unwrap_err();

    match &err {
        SetupError::VerificationFailed { missing, .. } => {
            assert_eq!(missing, &["rustc", "cargo"]);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.exit_code(), 1);
}

fn binary(host: &Host) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_toolchain-bootstrap"));
    cmd.env_clear().envs(host.vars());
    cmd
}

#[test]
fn test_cli_dry_run_json() {
    let host = Host::new();
    host.script(&host.bin, "dnf", "exit 0");

    let output = binary(&host)
        .args(["--dry-run", "--json", "--no-sudo", "--profile", "minimal"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["strategy"], "Dnf");
    assert_eq!(plan["use_sudo"], false);
    assert_eq!(plan["toolchain_action"], "FreshInstall");
    assert_eq!(plan["toolchain_steps"][0]["command"]["program"], "curl");
    let init_args = plan["toolchain_steps"][1]["command"]["args"].as_array().unwrap();
    assert_eq!(init_args[init_args.len() - 2], "--profile");
    assert_eq!(init_args[init_args.len() - 1], "minimal");
    assert!(host.calls("dnf").is_empty(), "dry run must not execute");
}

#[test]
fn test_cli_dry_run_json_unrenderable_plan_exits_one() {
    let host = Host::new();
    host.script(&host.bin, "dnf", "exit 0");

    let output = binary(&host)
        .env("HOME", OsStr::from_bytes(b"/nonexistent/\xff"))
        .args(["--dry-run", "--json", "--no-sudo"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}

#[test]
fn test_cli_unsupported_host_exits_one() {
    let host = Host::new();

    let output = binary(&host).arg("--no-sudo").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("fix:"));
}

#[test]
fn test_cli_verification_failure_exits_one_without_versions() {
    let host = Host::pacman();
    host.serve_installer("exit 0\n");

    let output = binary(&host).arg("--no-sudo").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Verification failed"));
    assert!(!stderr
        .lines()
        .any(|l| l.starts_with("✓ rustc") || l.starts_with("✓ cargo")));
    assert!(output.stdout.is_empty());
}
