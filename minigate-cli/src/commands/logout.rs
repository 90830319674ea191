//! Logout command - forget the stored session token.

use anyhow::Result;
use minigate_fetch::constants::USER_STORE_KEY;
use tracing::info;

use crate::context::{load_settings, token_store};
use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Runs the logout command.
pub async fn run(cli: &Cli) -> Result<()> {
    let settings = load_settings().await?;
    token_store(settings.token_backend)
        .remove(USER_STORE_KEY)
        .await?;
    info!(backend = %settings.token_backend, "Signed out");

    match cli.format {
        OutputFormat::Text => println!("Signed out"),
        OutputFormat::Json => {
            let output = serde_json::json!({ "signedIn": false });
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }
    Ok(())
}
