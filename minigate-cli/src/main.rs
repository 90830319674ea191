// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Minigate CLI - talk to the storefront backend from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Sign in with the init data the chat platform hands the mini-app
//! minigate login --init-data 'query_id=...&user=...&hash=...'
//!
//! # List wallets
//! minigate wallet list
//!
//! # Raw request through the pipeline
//! minigate request GET /private/user/wallet/list --param chain=solana
//!
//! # JSON output
//! minigate --format json --pretty wallet detail <ADDRESS>
//!
//! # Point at another backend
//! minigate config set-host https://api.example.com
//! ```

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use minigate_fetch::RequestError;
use minigate_store::LogLevel;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{config, device, login, logout, request, wallet};

// ============================================================================
// CLI Definition
// ============================================================================

/// Minigate CLI - storefront backend client.
#[derive(Parser)]
#[command(name = "minigate")]
#[command(about = "Storefront backend client CLI")]
#[command(long_about = r#"
Minigate sends requests to the storefront backend through the same pipeline
the mini-app uses: identity headers, auth token, 10 second timeout and
short-window deduplication of identical GET requests.

Examples:
  minigate login --init-data RAW        # Sign in
  minigate wallet list                  # List wallets
  minigate request GET /some/path       # Raw request
  minigate --format json wallet list    # JSON output
  minigate config show                  # Current configuration
"#)]
#[command(version)]
#[command(author = "Minigate Contributors")]
pub struct Cli {
    /// Subcommand to run. If none, prints help.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Send a raw request through the pipeline.
    #[command(visible_alias = "r")]
    Request(request::RequestArgs),

    /// Exchange platform init data for a session token.
    Login(login::LoginArgs),

    /// Forget the stored session token.
    Logout,

    /// Custodial wallet operations.
    #[command(visible_alias = "w")]
    Wallet(wallet::WalletArgs),

    /// Show the identity headers sent with every request.
    Device(device::DeviceArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// The server rejected the session.
    NoPermission = 2,
    /// Transport failure or timeout.
    Network = 4,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    pub fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<RequestError>() {
            Some(RequestError::NoPermission { .. }) => ExitCode::NoPermission,
            Some(RequestError::Network { .. }) => ExitCode::Network,
            _ => ExitCode::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

/// Filter directive: `--verbose` wins over the configured level.
fn log_directive(verbose: bool, level: LogLevel) -> String {
    if verbose {
        "minigate=debug,info".to_string()
    } else {
        format!("minigate={level}")
    }
}

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return;
    }

    let filter = EnvFilter::new(log_directive(verbose, level));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = context::load_settings()
        .await
        .map_or_else(|_| LogLevel::default(), |settings| settings.log_level);
    setup_logging(cli.verbose, cli.quiet, log_level);

    let result = match &cli.command {
        Some(Commands::Request(args)) => request::run(args, &cli).await,
        Some(Commands::Login(args)) => login::run(args, &cli).await,
        Some(Commands::Logout) => logout::run(&cli).await,
        Some(Commands::Wallet(args)) => wallet::run(args, &cli).await,
        Some(Commands::Device(args)) => device::run(args, &cli).await,
        Some(Commands::Config(args)) => config::run(args, &cli).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_request_command() {
        let cli = Cli::try_parse_from([
            "minigate",
            "--format",
            "json",
            "request",
            "GET",
            "/private/user/wallet/list",
            "--param",
            "chain=solana",
            "--no-dedup",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        let Some(Commands::Request(args)) = cli.command else {
            panic!("expected request command");
        };
        assert_eq!(args.method, "GET");
        assert_eq!(args.path, "/private/user/wallet/list");
        assert_eq!(args.params, vec!["chain=solana".to_string()]);
        assert!(args.no_dedup);
        assert!(!args.no_toast);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["minigate", "logout", "-q", "--pretty"]).unwrap();
        assert!(cli.quiet);
        assert!(cli.pretty);
        assert!(matches!(cli.command, Some(Commands::Logout)));
    }

    #[test]
    fn test_log_directive() {
        assert_eq!(log_directive(false, LogLevel::default()), "minigate=warn");
        assert_eq!(log_directive(false, LogLevel::Trace), "minigate=trace");
        assert_eq!(log_directive(true, LogLevel::Error), "minigate=debug,info");
    }

    #[test]
    fn test_exit_codes() {
        let no_permission = anyhow::Error::new(RequestError::NoPermission { status: 401 });
        assert_eq!(ExitCode::for_error(&no_permission), ExitCode::NoPermission);

        let network = anyhow::Error::new(RequestError::timeout());
        assert_eq!(ExitCode::for_error(&network), ExitCode::Network);

        let business = anyhow::Error::new(RequestError::Business {
            code: Some(7),
            message: "nope".to_string(),
            params: None,
        });
        assert_eq!(ExitCode::for_error(&business), ExitCode::Error);

        let other = anyhow::anyhow!("boom");
        assert_eq!(ExitCode::for_error(&other), ExitCode::Error);
        assert_eq!(ExitCode::Success as i32, 0);
    }
}
