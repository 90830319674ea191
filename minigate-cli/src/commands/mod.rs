//! CLI command implementations.

pub mod config;
pub mod device;
pub mod login;
pub mod logout;
pub mod request;
pub mod wallet;

use anyhow::Result;
use serde::Serialize;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Prints a response payload in the selected format.
///
/// `text` renders the payload when the format is text; JSON output wraps the
/// payload with its path and receive time.
pub(crate) fn print_response<T, F>(cli: &Cli, path: &str, data: Option<T>, text: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce(&TextFormatter, &T) -> String,
{
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            match &data {
                Some(data) => println!("{}", text(&formatter, data)),
                None => println!("{}", formatter.format_value(&serde_json::Value::Null)),
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_response(path, data)?);
        }
    }
    Ok(())
}
