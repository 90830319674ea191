//! Device command - show the identity attached to every request.

use anyhow::Result;
use clap::Args;
use minigate_fetch::{IdentityContext, parse_user_agent};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::context::{launch_params, load_settings};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the device command.
#[derive(Args, Debug, Default)]
pub struct DeviceArgs {
    /// User agent to derive the device from, instead of the configured one.
    #[arg(long)]
    pub user_agent: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeviceOutput<'a> {
    user_agent: &'a str,
    sys_version: Option<String>,
    brand_model: Option<String>,
    headers: BTreeMap<String, String>,
}

/// Runs the device command.
pub async fn run(args: &DeviceArgs, cli: &Cli) -> Result<()> {
    let settings = load_settings().await?;
    let launch = launch_params(&settings)?;

    let mut env = settings.device.environment();
    if let Some(ua) = &args.user_agent {
        env.user_agent.clone_from(ua);
    }

    let identity = IdentityContext::new(&launch, &env);
    let ua = parse_user_agent(&env.user_agent);
    // The token is never printed.
    let headers = identity.headers(None);

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("Platform:     {}", or_dash(&launch.platform));
            println!("App version:  {}", or_dash(&launch.app_version));
            println!("OS version:   {}", ua.sys_version.as_deref().unwrap_or("-"));
            println!("Model:        {}", ua.brand_model.as_deref().unwrap_or("-"));
            println!();
            println!("{}", formatter.format_headers(&headers));
        }
        OutputFormat::Json => {
            let output = DeviceOutput {
                user_agent: &env.user_agent,
                sys_version: ua.sys_version,
                brand_model: ua.brand_model,
                headers,
            };
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }
    Ok(())
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
