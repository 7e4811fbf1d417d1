//! Tally session tool - drives sign-in, sign-out and session checks from a terminal.

mod app;
mod ports;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tally_config_and_utils::{init_logging, Config, Paths};

/// Tally session command-line interface.
#[derive(Parser)]
#[command(name = "tally-session")]
#[command(about = "Sign in to Tally and manage the local session")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error). Defaults to the config value
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Base directory for runtime files (store, logs, config). Defaults to ~/.tally
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    /// URL the app was opened with, used for anonymous deep links
    #[arg(long, global = true)]
    initial_url: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Look up an account and stage its login
    BeginSignIn {
        #[arg(long)]
        email: String,
    },
    /// Complete sign-in for the staged login
    SignIn {
        /// Magic code from the sign-in email
        #[arg(long, default_value = "")]
        code: String,
        /// Two-factor code, when the account requires one
        #[arg(long)]
        tfa: Option<String>,
    },
    /// Sign in with a magic link's account id and code
    MagicLink {
        #[arg(long)]
        account_id: u64,
        #[arg(long)]
        code: String,
        #[arg(long)]
        tfa: Option<String>,
    },
    /// Sign out and clear the local session
    SignOut,
    /// Show the current session
    Status,
    /// Start (or, with no token, end) a support session
    SupportToken {
        #[arg(long, default_value = "")]
        token: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value_t = 0)]
        account_id: u64,
    },
    /// Manage two-factor authentication
    TwoFactor {
        #[command(subcommand)]
        action: TwoFactorAction,
    },
    /// Check whether an anonymous user may open a route
    RouteCheck { route: String },
}

#[derive(Subcommand)]
pub(crate) enum TwoFactorAction {
    Enable,
    Disable,
    Validate {
        #[arg(long)]
        code: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    paths.ensure_dirs()?;
    let config = Config::load(&paths)?;

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging("tally-session", level, Some(paths.log_file()));

    let result = app::run(cli.command, config, &paths, cli.initial_url).await;
    if let Err(err) = observability::flush() {
        eprintln!("failed to flush logs: {err}");
    }
    result
}
