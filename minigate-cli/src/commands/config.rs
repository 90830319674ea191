//! Config command - manage configuration.

use anyhow::{Result, anyhow};
use clap::{Args, Subcommand};
use minigate_store::{
    LogLevel, SettingsStore, TokenBackend, default_config_dir, default_data_dir,
    default_settings_path,
};
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Set the API host, e.g. https://api.example.com.
    SetHost {
        /// Scheme and host.
        host: String,
    },

    /// Set the API path prefix, e.g. /api.
    SetPrefix {
        /// Path prefix.
        prefix: String,
    },

    /// Choose where the session token is kept.
    SetTokenBackend {
        /// Backend: file or keychain.
        backend: String,
    },

    /// Set the log level used without --verbose or --quiet.
    SetLogLevel {
        /// Level: error, warn, info, debug or trace.
        level: String,
    },
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await,
        ConfigAction::Path => show_paths(cli),
        ConfigAction::SetHost { host } => set_host(host).await,
        ConfigAction::SetPrefix { prefix } => set_prefix(prefix).await,
        ConfigAction::SetTokenBackend { backend } => set_token_backend(backend).await,
        ConfigAction::SetLogLevel { level } => set_log_level(level).await,
    }
}

async fn show_config(cli: &Cli) -> Result<()> {
    let store = SettingsStore::load_default().await?;
    let mut settings = store.get().await;
    settings.apply_env_overrides();

    match cli.format {
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(!cli.no_color).format_settings(&settings));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&settings)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let settings_path = default_settings_path();
    let data_dir = default_data_dir();

    match cli.format {
        OutputFormat::Text => {
            println!("Config dir:    {}", config_dir.display());
            println!("Settings file: {}", settings_path.display());
            println!("Data dir:      {}", data_dir.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "settings_file": settings_path.display().to_string(),
                "data_dir": data_dir.display().to_string(),
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&paths)?);
        }
    }

    Ok(())
}

async fn set_host(host: &str) -> Result<()> {
    let host = normalize_host(host)?;

    let store = SettingsStore::load_default().await?;
    store.set_api_host(host.clone()).await;
    store.save().await?;

    info!(host = %host, "API host updated");
    println!("API host set to: {host}");
    Ok(())
}

async fn set_prefix(prefix: &str) -> Result<()> {
    let prefix = normalize_prefix(prefix);

    let store = SettingsStore::load_default().await?;
    store.set_api_prefix(prefix.clone()).await;
    store.save().await?;

    info!(prefix = %prefix, "API prefix updated");
    println!("API prefix set to: {prefix}");
    Ok(())
}

async fn set_token_backend(backend: &str) -> Result<()> {
    let backend = match backend.to_lowercase().as_str() {
        "file" => TokenBackend::File,
        "keychain" => TokenBackend::Keychain,
        _ => anyhow::bail!("Unknown token backend: {backend}. Use: file, keychain"),
    };

    let store = SettingsStore::load_default().await?;
    store.set_token_backend(backend).await;
    store.save().await?;

    info!(backend = %backend, "Token backend updated");
    println!("Token backend set to: {backend}");
    Ok(())
}

async fn set_log_level(level: &str) -> Result<()> {
    let level = parse_log_level(level)?;

    let store = SettingsStore::load_default().await?;
    store.set_log_level(level).await;
    store.save().await?;

    info!(level = %level, "Log level updated");
    println!("Log level set to: {level}");
    Ok(())
}

fn parse_log_level(level: &str) -> Result<LogLevel> {
    match level.trim().to_lowercase().as_str() {
        "error" => Ok(LogLevel::Error),
        "warn" | "warning" => Ok(LogLevel::Warn),
        "info" => Ok(LogLevel::Info),
        "debug" => Ok(LogLevel::Debug),
        "trace" => Ok(LogLevel::Trace),
        _ => Err(anyhow!(
            "Unknown log level: {level}. Use: error, warn, info, debug, trace"
        )),
    }
}

/// Requires an http(s) scheme and drops trailing slashes.
fn normalize_host(host: &str) -> Result<String> {
    let host = host.trim().trim_end_matches('/');
    if !(host.starts_with("http://") || host.starts_with("https://")) {
        return Err(anyhow!("API host must start with http:// or https://: {host}"));
    }
    Ok(host.to_string())
}

/// Ensures a single leading slash and no trailing one. Empty stays empty.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_host() {
        assert_eq!(
            normalize_host("https://api.example.com/").unwrap(),
            "https://api.example.com"
        );
        assert!(normalize_host("api.example.com").is_err());
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(parse_log_level("warning").unwrap(), LogLevel::Warn);
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("api"), "/api");
        assert_eq!(normalize_prefix("/api/v2/"), "/api/v2");
        assert_eq!(normalize_prefix("/"), "");
    }
}
