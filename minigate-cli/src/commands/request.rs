//! Request command - send a raw request through the pipeline.

use anyhow::{Context as _, Result, anyhow};
use clap::Args;
use minigate_fetch::{Method, ParamValue, Params, RequestOptions};
use tracing::info;

use crate::Cli;
use crate::commands::print_response;
use crate::context::Context;

/// Arguments for the request command.
#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, ...).
    pub method: String,

    /// Path relative to the base URL, or an absolute URL.
    pub path: String,

    /// Query parameter as KEY=VALUE (GET only). Repeatable.
    #[arg(long = "param", short = 'p', value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Extra header as NAME:VALUE. Repeatable.
    #[arg(long = "header", short = 'H', value_name = "NAME:VALUE")]
    pub headers: Vec<String>,

    /// JSON request body.
    #[arg(long)]
    pub body: Option<String>,

    /// Always send, even if an identical GET is in flight.
    #[arg(long)]
    pub no_dedup: bool,

    /// Do not report non-network failures.
    #[arg(long)]
    pub no_toast: bool,
}

/// Runs the request command.
pub async fn run(args: &RequestArgs, cli: &Cli) -> Result<()> {
    let options = build_options(args)?;
    let mut ctx = Context::load(cli).await?;

    info!(method = %options.method, path = %args.path, "Sending request");
    let result = ctx.dispatcher.request_value(&args.path, options).await;
    ctx.notify_session(cli.quiet);

    let data = result?;
    let data = (!data.is_null()).then_some(data);
    print_response(cli, &args.path, data, |f, value| f.format_value(value))
}

/// Turns the command line into request options.
fn build_options(args: &RequestArgs) -> Result<RequestOptions> {
    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .map_err(|_| anyhow!("Invalid HTTP method: {}", args.method))?;

    let mut options = RequestOptions::default()
        .method(method)
        .dedup(!args.no_dedup)
        .error_toast(!args.no_toast);

    if !args.params.is_empty() {
        let mut params = Params::new();
        for raw in &args.params {
            let (key, value) = parse_param(raw)?;
            params.insert(key, value);
        }
        options = options.params(params);
    }

    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        options = options.header(name, value);
    }

    if let Some(body) = &args.body {
        let body = serde_json::from_str(body).context("--body is not valid JSON")?;
        options = options.body(body);
    }

    Ok(options)
}

/// Parses `KEY=VALUE`. Integers, booleans and `null` keep their type.
fn parse_param(raw: &str) -> Result<(String, ParamValue)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected KEY=VALUE, got: {raw}"))?;
    if key.is_empty() {
        return Err(anyhow!("Empty parameter name in: {raw}"));
    }

    let value = match value {
        "null" => ParamValue::Null,
        "true" => ParamValue::Bool(true),
        "false" => ParamValue::Bool(false),
        _ => value
            .parse::<i64>()
            .map_or_else(|_| ParamValue::Str(value.to_string()), ParamValue::Int),
    };
    Ok((key.to_string(), value))
}

/// Parses `NAME:VALUE`, trimming whitespace around both.
fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("Expected NAME:VALUE, got: {raw}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("Empty header name in: {raw}"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
