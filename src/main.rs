use clap::Parser;
use colored::Colorize;
use std::io::IsTerminal;
use std::process::ExitCode;
use thiserror::Error;
use toolchain_bootstrap::{
    run_setup, CommandRunner, ProfileEdit, SetupEnv, SetupError, SetupOptions, SetupPlan,
    SetupProgress, TerminalIndicator, DEFAULT_INSTALLER_URL,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install build prerequisites and the Rust toolchain on this machine.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// URL of the toolchain bootstrap script
    #[arg(long, env = "TOOLCHAIN_BOOTSTRAP_INSTALLER_URL", default_value = DEFAULT_INSTALLER_URL)]
    installer_url: String,

    /// Toolchain to install or update (stable, nightly, 1.83.0, ...)
    #[arg(long, env = "TOOLCHAIN_BOOTSTRAP_DEFAULT_TOOLCHAIN")]
    default_toolchain: Option<String>,

    /// rustup profile for a fresh install (minimal, default, complete)
    #[arg(long)]
    profile: Option<String>,

    /// Run package-manager steps without sudo (for example as root)
    #[arg(long)]
    no_sudo: bool,

    /// Do not edit the shell startup file
    #[arg(long)]
    no_modify_profile: bool,

    /// Print shell exports on stdout for `eval "$(toolchain-bootstrap --shell-exports)"`
    #[arg(long)]
    shell_exports: bool,

    /// Show what would run without running anything
    #[arg(long)]
    dry_run: bool,

    /// With --dry-run, print the plan as JSON
    #[arg(long, requires = "dry_run")]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Failures of the binary: a setup failure or a plan that cannot be rendered.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("Could not render the plan as JSON: {0}")]
    RenderPlan(#[from] serde_json::Error),
}

impl CliError {
    fn fix_suggestion(&self) -> &str {
        match self {
            Self::Setup(e) => e.fix_suggestion(),
            Self::RenderPlan(_) => {
                "Drop --json to see the text plan, or make sure HOME and PATH are valid UTF-8"
            }
        }
    }

    fn exit_code(&self) -> u8 {
        match self {
            Self::Setup(e) => e.exit_code(),
            Self::RenderPlan(_) => 1,
        }
    }
}

impl Cli {
    fn options(&self) -> SetupOptions {
        SetupOptions {
            installer_url: self.installer_url.clone(),
            default_toolchain: self.default_toolchain.clone(),
            rustup_profile: self.profile.clone(),
            use_sudo: !self.no_sudo,
            modify_profile: !self.no_modify_profile,
            ..Default::default()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Exports on a terminal would be printed instead of applied.
    if cli.shell_exports && std::io::stdout().is_terminal() {
        eprintln!(
            "{} --shell-exports must be captured by the calling shell",
            "error:".red().bold()
        );
        eprintln!(
            "{} run it as: eval \"$(toolchain-bootstrap --shell-exports)\"",
            "fix:".yellow().bold()
        );
        return ExitCode::from(1);
    }

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            eprintln!("{} {}", "fix:".yellow().bold(), e.fix_suggestion());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let env = SetupEnv::from_process()?;
    let options = cli.options();

    if cli.dry_run {
        let plan = SetupPlan::build(&env, &options)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            print_plan(&plan);
        }
        return Ok(());
    }

    let runner =
        CommandRunner::new(TerminalIndicator::new()).with_tick_interval(options.tick_interval);
    let report = run_setup(env, &options, &runner, print_progress).await?;

    for tool in &report.versions {
        let raw = if tool.raw.is_empty() {
            "(version unavailable)"
        } else {
            tool.raw.as_str()
        };
        eprintln!("{} {}", "✓".green(), raw);
    }

    if let Some((target, edit)) = &report.profile {
        match edit {
            ProfileEdit::Appended => {
                eprintln!("{} added toolchain setup to {}", "✓".green(), target.path.display())
            }
            ProfileEdit::AlreadyPresent => {
                eprintln!("{} already set up", target.path.display().to_string().dimmed())
            }
        }
    }

    if cli.shell_exports {
        print!("{}", report.env.exports_script());
    } else {
        eprintln!(
            "\nTo use the toolchain in this shell, run: . \"{}\"",
            report.env.cargo_env_file().display()
        );
    }

    Ok(())
}

fn print_progress(progress: SetupProgress) {
    match &progress {
        SetupProgress::Started => {}
        SetupProgress::InstallingDependencies { strategy } => {
            eprintln!("{} ({})", progress.description().bold(), strategy);
        }
        SetupProgress::StepCompleted { label } => {
            eprintln!("  {} {}", "✓".green(), label);
        }
        SetupProgress::Completed => {
            eprintln!("{}", progress.description().green().bold());
        }
        other => eprintln!("{}", other.description().bold()),
    }
}

fn print_plan(plan: &SetupPlan) {
    let sudo = if plan.use_sudo { "with sudo" } else { "without sudo" };
    println!("{} {} ({})", "Package manager:".bold(), plan.strategy, sudo);
    for step in &plan.dependency_steps {
        println!("  {}: {}", step.label, step.command);
    }
    println!("{} {}", "Toolchain:".bold(), plan.toolchain_action);
    for step in &plan.toolchain_steps {
        println!("  {}: {}", step.label, step.command);
    }
    match &plan.profile {
        Some(target) => {
            println!("{} {}", "Profile:".bold(), target.path.display());
            println!("  {}", plan.guard_line);
        }
        None => println!("{} unchanged", "Profile:".bold()),
    }
}
