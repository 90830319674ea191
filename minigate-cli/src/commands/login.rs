//! Login command - exchange platform init data for a session token.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::Args;
use minigate_api::UserApi;
use minigate_api::user::TelegramLoginRequest;
use minigate_fetch::RequestOptions;
use minigate_fetch::constants::USER_STORE_KEY;
use tracing::info;

use crate::context::Context;
use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the login command.
#[derive(Args, Debug, Default)]
pub struct LoginArgs {
    /// Raw signed init data. Defaults to the one in the mock launch
    /// parameters.
    #[arg(long)]
    pub init_data: Option<String>,
}

/// Runs the login command.
pub async fn run(args: &LoginArgs, cli: &Cli) -> Result<()> {
    let mut ctx = Context::load(cli).await?;
    let init_data_raw = resolve_init_data(args, ctx.launch.init_data_raw.as_deref())?;

    let api = UserApi::new(Arc::clone(&ctx.dispatcher));
    let result = api
        .auth_telegram_login(&TelegramLoginRequest { init_data_raw }, RequestOptions::default())
        .await;
    ctx.notify_session(cli.quiet);

    let token = result?
        .and_then(|response| response.token)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| anyhow!("Login response carried no token"))?;

    ctx.tokens.set(USER_STORE_KEY, &token).await?;
    info!(backend = %ctx.settings.token_backend, "Signed in");

    match cli.format {
        OutputFormat::Text => println!("Signed in (token stored in {})", ctx.settings.token_backend),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "signedIn": true,
                "tokenBackend": ctx.settings.token_backend.to_string(),
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }
    Ok(())
}

/// Picks the explicit init data, falling back to the launch parameters.
fn resolve_init_data(args: &LoginArgs, launch: Option<&str>) -> Result<String> {
    args.init_data
        .as_deref()
        .or(launch)
        .filter(|raw| !raw.trim().is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| anyhow!("No init data: pass --init-data or set mock_launch_params"))
}
