//! Background execution of external commands with a progress indicator.
//!
//! [`CommandRunner::run`] spawns one child with its output discarded and
//! drives two futures on the calling task: the child's wait, and a ticker that
//! advances the spinner until the wait signals completion. Both are joined
//! before the exit status is returned.

mod indicator;

pub use indicator::{Indicator, SilentIndicator, TerminalIndicator};

use crate::{CommandSpec, SetupEnv};
use futures::future::join;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;

/// Glyphs the spinner cycles through, in order.
pub const SPINNER_GLYPHS: [char; 4] = ['|', '/', '-', '\\'];

/// Default interval between spinner frames.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Exit status of a finished command.
///
/// A child terminated by signal `n` reports `128 + n`, as a POSIX shell does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    code: i32,
}

impl ExecutionResult {
    pub fn new(code: i32) -> Self {
        Self { code }
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn success(&self) -> bool {
        self.code == 0
    }

    fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self { code };
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self { code: 128 + signal };
            }
        }

        Self { code: -1 }
    }
}

/// Runs commands one at a time against a [`SetupEnv`].
///
/// # Example
///
/// ```rust,no_run
/// use toolchain_bootstrap::{CommandRunner, CommandSpec, SetupEnv, TerminalIndicator};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> std::io::Result<()> {
///     let env = SetupEnv::from_process().expect("HOME is set");
///     let runner = CommandRunner::new(TerminalIndicator::new());
///     let result = runner
///         .run("Refreshing package metadata", &CommandSpec::new("apt-get", ["update"]), &env)
///         .await?;
///     println!("exit status {}", result.code());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct CommandRunner<I> {
    indicator: I,
    tick_interval: Duration,
}

impl<I: Indicator> CommandRunner<I> {
    pub fn new(indicator: I) -> Self {
        Self {
            indicator,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }

    /// Change the spinner frame interval. Zero is clamped to one millisecond.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    /// Run `spec` in the background while rendering the spinner.
    ///
    /// The child's stdin, stdout and stderr are null. Its environment is the
    /// inherited one plus `PATH`, `RUSTUP_HOME` and `CARGO_HOME` from `env`
    /// and the spec's own variables. No timeout is applied.
    ///
    /// Returns the exit status unchanged. An `Err` means the command could not
    /// be started at all (for example, it is not on the search path).
    pub async fn run(
        &self,
        label: &str,
        spec: &CommandSpec,
        env: &SetupEnv,
    ) -> io::Result<ExecutionResult> {
        let mut command = build_command(spec, env)?;
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        tracing::debug!(label, command = %spec, "spawning");
        let mut child = command.spawn()?;
        self.indicator.start(label);

        let (done_tx, done_rx) = oneshot::channel::<()>();
        let wait = async move {
            let status = child.wait().await;
            let _ = done_tx.send(());
            status
        };

        let (status, frames) = join(wait, self.tick_until(done_rx)).await;
        self.indicator.finish();

        let result = ExecutionResult::from_status(status?);
        tracing::debug!(label, code = result.code(), frames, "command finished");
        Ok(result)
    }

    /// Run `spec` with the terminal attached and no spinner.
    ///
    /// Used for commands that may need to talk to the user, such as a `sudo`
    /// password prompt.
    pub async fn run_foreground(
        &self,
        spec: &CommandSpec,
        env: &SetupEnv,
    ) -> io::Result<ExecutionResult> {
        let mut command = build_command(spec, env)?;
        tracing::debug!(command = %spec, "running in foreground");
        let status = command.status().await?;
        Ok(ExecutionResult::from_status(status))
    }

    async fn tick_until(&self, mut done: oneshot::Receiver<()>) -> usize {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut frame = 0;
        loop {
            tokio::select! {
                _ = &mut done => return frame,
                _ = interval.tick() => {
                    self.indicator.tick(SPINNER_GLYPHS[frame % SPINNER_GLYPHS.len()]);
                    frame += 1;
                }
            }
        }
    }
}

fn build_command(spec: &CommandSpec, env: &SetupEnv) -> io::Result<Command> {
    let program = resolve_program(&spec.program, env)?;
    let vars = env
        .child_vars()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let mut command = Command::new(program);
    command
        .args(&spec.args)
        .envs(vars.iter().map(|(k, v)| (*k, v)))
        .envs(spec.env_vars.iter().map(|(k, v)| (k, v)))
        .kill_on_drop(true);
    Ok(command)
}

fn resolve_program(program: &str, env: &SetupEnv) -> io::Result<PathBuf> {
    if program.contains('/') {
        return Ok(PathBuf::from(program));
    }
    env.find_executable(program).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} not found on the search path", program),
        )
    })
}
