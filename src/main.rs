// Allow panic/unwrap/expect in tests (denied globally via Cargo.toml lints)
#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result
    )
)]

mod commands;

use clap::builder::FalseyValueParser;
use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use commands::add::AddArgs;
use commands::clone::CloneArgs;
use commands::current::CurrentArgs;
use commands::set::SetArgs;
use commands::Context;
use gitidentity::git::GIT_EXECUTABLE_ENV;
use gitidentity::logging::{init_logging, parse_level, LogConfig};
use gitidentity::CommandRunner;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::debug;

/// Exit code used when interrupted by Ctrl-C.
const INTERRUPTED: u8 = 130;

/// Easily set local git identity
#[derive(Parser, Debug)]
#[command(
    name = "gitidentity",
    author,
    version,
    about,
    long_about = "Gitidentity allows to easily set local git identity."
)]
struct Args {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

/// Options accepted before the sub-command and after every sub-command but
/// `clone`, whose arguments all belong to git.
#[derive(clap::Args, Debug, Default, Clone)]
struct GlobalArgs {
    /// Path to user configuration file (default: ~/.config/gitidentity/config.{json,yaml,yml})
    #[arg(long, env = "GITIDENTITY_CONFIG")]
    config: Option<PathBuf>,

    /// Run as if gitidentity was started in the provided path
    #[arg(short = 'C', long = "change-directory", value_name = "PATH")]
    change_directory: Option<PathBuf>,

    /// Dump debug logs to stderr
    #[arg(long, env = "GITIDENTITY_DEBUG", value_parser = FalseyValueParser::new())]
    debug: bool,

    /// Log level used with --debug; RUST_LOG takes precedence [default: debug]
    #[arg(long, env = "GITIDENTITY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit debug logs as JSON lines
    #[arg(long, env = "GITIDENTITY_LOG_JSON", value_parser = FalseyValueParser::new())]
    log_json: bool,

    /// Also write debug logs to this file
    #[arg(long, env = "GITIDENTITY_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Git executable [default: git]
    #[arg(long, env = GIT_EXECUTABLE_ENV, hide = true)]
    git: Option<String>,

    /// Kill match probes running longer than this many seconds
    #[arg(long, env = "GITIDENTITY_TIMEOUT", value_name = "SECONDS")]
    timeout: Option<u64>,
}

impl GlobalArgs {
    /// Combine with options given after the sub-command, which win.
    #[must_use]
    fn merge(self, later: Self) -> Self {
        Self {
            config: later.config.or(self.config),
            change_directory: later.change_directory.or(self.change_directory),
            debug: self.debug || later.debug,
            log_level: later.log_level.or(self.log_level),
            log_json: self.log_json || later.log_json,
            log_file: later.log_file.or(self.log_file),
            git: later.git.or(self.git),
            timeout: later.timeout.or(self.timeout),
        }
    }

    fn log_config(&self) -> LogConfig {
        LogConfig {
            level: parse_level(self.log_level.as_deref().unwrap_or("debug")),
            json_format: self.log_json,
            log_file: self.log_file.clone(),
        }
    }

    fn context(&self) -> Context {
        let mut runner = CommandRunner::new();
        if let Some(dir) = &self.change_directory {
            runner = runner.with_workdir(dir);
        }
        if let Some(secs) = self.timeout {
            runner = runner.with_timeout(Duration::from_secs(secs));
        }
        // A relative config path is relative to -C, like every git call
        let config_path = match (&self.config, &self.change_directory) {
            (Some(path), Some(dir)) => Some(dir.join(path)),
            (path, _) => path.clone(),
        };
        Context {
            config_path,
            runner,
            git: self.git.clone().unwrap_or_else(|| "git".to_string()),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add new identity to configuration
    Add {
        #[command(flatten)]
        args: AddArgs,
        #[command(flatten)]
        global: GlobalArgs,
    },
    /// Show current identity
    Current {
        #[command(flatten)]
        args: CurrentArgs,
        #[command(flatten)]
        global: GlobalArgs,
    },
    /// Set local repository identity
    Set {
        #[command(flatten)]
        args: SetArgs,
        #[command(flatten)]
        global: GlobalArgs,
    },
    /// Unset local repository identity
    Unset {
        #[command(flatten)]
        global: GlobalArgs,
    },
    /// Perform git clone in an identity aware manner
    #[command(disable_help_flag = true)]
    Clone(CloneArgs),
    /// Show version information
    Version {
        #[command(flatten)]
        global: GlobalArgs,
    },
}

impl Command {
    fn global(&self) -> Option<&GlobalArgs> {
        match self {
            Self::Add { global, .. }
            | Self::Current { global, .. }
            | Self::Set { global, .. }
            | Self::Unset { global }
            | Self::Version { global } => Some(global),
            Self::Clone(_) => None,
        }
    }
}

impl Args {
    /// Root options with the sub-command's own copies applied on top.
    fn options(&self) -> GlobalArgs {
        match self.command.global() {
            Some(later) => self.global.clone().merge(later.clone()),
            None => self.global.clone(),
        }
    }
}

async fn run(command: &Command, ctx: &Context) -> Result<ExitCode> {
    match command {
        Command::Add { args, .. } => commands::add::run(ctx, args).await?,
        Command::Current { args, .. } => commands::current::run(ctx, args).await?,
        Command::Set { args, .. } => commands::set::run(ctx, args).await?,
        Command::Unset { .. } => commands::unset::run(ctx).await?,
        Command::Clone(args) => return commands::clone::run(ctx, args).await,
        Command::Version { .. } => commands::version::run(),
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = color_eyre::install() {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let args = Args::parse();
    let options = args.options();

    if options.debug {
        if let Err(e) = init_logging(&options.log_config()) {
            eprintln!("Error: failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    }
    debug!("{args:?}");

    let ctx = options.context();
    // Dropping the command future kills any child process still running
    let result = tokio::select! {
        result = run(&args.command, &ctx) => result,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("Error: interrupted");
            return ExitCode::from(INTERRUPTED);
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
