//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for one response payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseOutput<T: Serialize> {
    /// Endpoint that produced the payload.
    pub path: String,
    /// Payload, `null` when the server sent none.
    pub data: Option<T>,
    /// When the response was received.
    #[serde(serialize_with = "serialize_datetime")]
    pub fetched_at: DateTime<Utc>,
}

impl<T: Serialize> ResponseOutput<T> {
    /// Wraps a payload received just now.
    pub fn new(path: impl Into<String>, data: Option<T>) -> Self {
        Self {
            path: path.into(),
            data,
            fetched_at: Utc::now(),
        }
    }
}

fn serialize_datetime<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339())
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
#[derive(Debug, Clone, Copy)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats a response payload with its path and receive time.
    pub fn format_response<T: Serialize>(&self, path: &str, data: Option<T>) -> Result<String> {
        self.format(&ResponseOutput::new(path, data))
    }
}
