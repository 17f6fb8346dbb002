//! Setup execution.
//!
//! This module provides [`run_setup`], which plans and executes a run with
//! progress reporting, and [`execute_plan`] for callers that built the plan
//! themselves.

use super::{SetupError, SetupPlan, SetupProgress, SetupReport};
use crate::profile::ensure_guard;
use crate::verify::verify_toolchain;
use crate::{CommandRunner, CommandSpec, Indicator, SetupEnv, SetupOptions};

/// Install and configure the toolchain.
///
/// This function:
/// 1. Plans the run (package-manager and toolchain probes)
/// 2. Installs build prerequisites, stopping at the first failed step
/// 3. Downloads and runs the toolchain installer, or updates the toolchain
/// 4. Extends the run's search path with `$CARGO_HOME/bin`
/// 5. Adds the environment guard to the shell profile
/// 6. Verifies `rustc` and `cargo`
///
/// Every failure is fatal and returned as a [`SetupError`]; nothing is
/// rolled back.
///
/// # Example
///
/// ```rust,no_run
/// use toolchain_bootstrap::{run_setup, CommandRunner, SetupEnv, SetupOptions, TerminalIndicator};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let env = SetupEnv::from_process().expect("HOME is set");
///     let runner = CommandRunner::new(TerminalIndicator::new());
///
///     match run_setup(env, &SetupOptions::default(), &runner, |p| eprintln!("{}", p.description())).await {
///         Ok(report) => {
///             for tool in &report.versions {
///                 println!("{}: {}", tool.name, tool.raw);
///             }
///         }
///         Err(e) => eprintln!("Failed: {}. Fix: {}", e, e.fix_suggestion()),
///     }
/// }
/// ```
pub async fn run_setup<I, F>(
    env: SetupEnv,
    options: &SetupOptions,
    runner: &CommandRunner<I>,
    on_progress: F,
) -> Result<SetupReport, SetupError>
where
    I: Indicator,
    F: Fn(SetupProgress),
{
    on_progress(SetupProgress::Started);
    let plan = SetupPlan::build(&env, options)?;
    execute_plan(plan, env, options, runner, on_progress).await
}

/// Execute an already-built plan. See [`run_setup`].
pub async fn execute_plan<I, F>(
    plan: SetupPlan,
    env: SetupEnv,
    options: &SetupOptions,
    runner: &CommandRunner<I>,
    on_progress: F,
) -> Result<SetupReport, SetupError>
where
    I: Indicator,
    F: Fn(SetupProgress),
{
    tracing::info!(strategy = %plan.strategy, toolchain = %plan.toolchain_action, "executing setup plan");

    // Step 1: Prime sudo with the terminal attached so a prompt is visible
    if plan.use_sudo {
        prime_sudo(runner, &env).await?;
    }

    // Step 2: Dependency chain, first failure stops it
    on_progress(SetupProgress::InstallingDependencies {
        strategy: plan.strategy,
    });
    for step in &plan.dependency_steps {
        let exit_code = match runner.run(&step.label, &step.command, &env).await {
            Ok(result) if result.success() => {
                on_progress(SetupProgress::StepCompleted {
                    label: step.label.clone(),
                });
                continue;
            }
            Ok(result) => Some(result.code()),
            Err(e) => {
                tracing::error!(step = %step.label, error = %e, "could not start step");
                None
            }
        };

        return Err(SetupError::DependencyInstallFailed {
            strategy: plan.strategy,
            step: step.label.clone(),
            exit_code,
            fix: format!(
                "Run `{}` yourself to see its output, fix the cause, then run again",
                step.command
            ),
        });
    }

    // Step 3: Toolchain install or update, each step checked
    let action = plan.toolchain_action;
    on_progress(SetupProgress::InstallingToolchain { action });
    let download = tempfile::Builder::new()
        .prefix("rustup-init-")
        .suffix(".sh")
        .tempfile()
        .map_err(|e| SetupError::ToolchainInstallFailed {
            action,
            exit_code: None,
            fix: format!("Make sure the temporary directory is writable ({})", e),
        })?;

    for step in plan.toolchain.steps(options, download.path()) {
        let exit_code = match runner.run(&step.label, &step.command, &env).await {
            Ok(result) if result.success() => {
                on_progress(SetupProgress::StepCompleted { label: step.label });
                continue;
            }
            Ok(result) => Some(result.code()),
            Err(e) => {
                tracing::error!(step = %step.label, error = %e, "could not start toolchain step");
                None
            }
        };

        return Err(SetupError::ToolchainInstallFailed {
            action,
            exit_code,
            fix: format!(
                "Check your network connection and run `{}` yourself to see its output",
                step.command
            ),
        });
    }
    drop(download);

    // Step 4: Load the toolchain environment and extend the search path
    on_progress(SetupProgress::UpdatingEnvironment);
    let env_file = env.cargo_env_file();
    if !env_file.exists() {
        tracing::warn!(path = %env_file.display(), "toolchain environment file not found");
    }
    let env = env.with_cargo_bin()?;

    // Step 5: Shell profile
    let profile = match plan.profile {
        Some(target) => {
            on_progress(SetupProgress::UpdatingProfile {
                path: target.path.clone(),
            });
            let edit = ensure_guard(&target.path, &plan.guard_line).map_err(|e| {
                SetupError::ProfileUpdateFailed {
                    path: target.path.clone(),
                    message: e.to_string(),
                    fix: format!(
                        "Add the line `{}` to {} yourself",
                        plan.guard_line,
                        target.path.display()
                    ),
                }
            })?;
            Some((target, edit))
        }
        None => None,
    };

    // Step 6: Verify
    on_progress(SetupProgress::Verifying);
    let versions = verify_toolchain(&env, options.version_timeout).await?;

    on_progress(SetupProgress::Completed);
    Ok(SetupReport {
        strategy: plan.strategy,
        toolchain_action: plan.toolchain_action,
        profile,
        versions,
        env,
    })
}

async fn prime_sudo<I: Indicator>(
    runner: &CommandRunner<I>,
    env: &SetupEnv,
) -> Result<(), SetupError> {
    let spec = CommandSpec::new("sudo", ["-v"]);
    let exit_code = match runner.run_foreground(&spec, env).await {
        Ok(result) if result.success() => return Ok(()),
        Ok(result) => Some(result.code()),
        Err(e) => {
            tracing::error!(error = %e, "could not start sudo");
            None
        }
    };

    Err(SetupError::SudoUnavailable {
        exit_code,
        fix: "Make sure sudo is installed and your user may use it, or pass --no-sudo when \
              running as root"
            .to_string(),
    })
}
