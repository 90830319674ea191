//! Response envelope and pagination types.
//!
//! Every backend endpoint answers with the same wrapper:
//!
//! ```json
//! { "code": 0, "data": { ... }, "error": "wallet.not_found", "errorParams": { ... } }
//! ```
//!
//! `code == 0` is success. Any other value is a business failure and
//! `error` carries an i18n message key.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Business code signalling success.
pub const SUCCESS_CODE: i64 = 0;

// ============================================================================
// Response Envelope
// ============================================================================

/// Wire-level wrapper around every response payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Business status code. Missing codes are treated as failures.
    #[serde(default)]
    pub code: Option<i64>,

    /// Payload. The server may omit it or send it partially filled.
    #[serde(default)]
    pub data: Value,

    /// Error message key for failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Interpolation parameters for the error message key.
    #[serde(default, rename = "errorParams", skip_serializing_if = "Option::is_none")]
    pub error_params: Option<Value>,
}

impl ResponseEnvelope {
    /// Creates a successful envelope carrying `data`.
    pub fn success(data: Value) -> Self {
        Self {
            code: Some(SUCCESS_CODE),
            data,
            error: None,
            error_params: None,
        }
    }

    /// Creates a failed envelope with the given code and message key.
    pub fn failure(code: i64, error: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            data: Value::Null,
            error: Some(error.into()),
            error_params: None,
        }
    }

    /// Parses an envelope from a raw response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not a JSON object in envelope shape.
    pub fn from_slice(body: &[u8]) -> Result<Self, CoreError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Returns true if the business code signals success.
    pub fn is_success(&self) -> bool {
        self.code == Some(SUCCESS_CODE)
    }

    /// Returns the error message key, if the server sent a non-empty one.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// Paging parameters accepted by list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationRequest {
    /// Page index, starting at 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
    /// Rows per page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// A page of rows returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationResponse<T> {
    /// Total number of rows across all pages.
    pub total: Option<u64>,
    /// Rows on this page.
    pub rows: Option<Vec<T>>,
}

impl<T> Default for PaginationResponse<T> {
    fn default() -> Self {
        Self {
            total: None,
            rows: None,
        }
    }
}

impl<T> PaginationResponse<T> {
    /// Returns the rows on this page, empty if the server omitted them.
    pub fn rows(&self) -> &[T] {
        self.rows.as_deref().unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope() {
        let env = ResponseEnvelope::from_slice(br#"{"code":0,"data":{"x":1}}"#).unwrap();
        assert!(env.is_success());
        assert_eq!(env.data, json!({"x": 1}));
        assert!(env.error.is_none());
    }

    #[test]
    fn test_failure_envelope_carries_message_and_params() {
        let env = ResponseEnvelope::from_slice(
            br#"{"code":7,"error":"bad","errorParams":{"min":3}}"#,
        )
        .unwrap();
        assert!(!env.is_success());
        assert_eq!(env.code, Some(7));
        assert_eq!(env.error_message(), Some("bad"));
        assert_eq!(env.error_params, Some(json!({"min": 3})));
        assert_eq!(env.data, Value::Null);
    }

    #[test]
    fn test_missing_code_is_not_success() {
        let env = ResponseEnvelope::from_slice(br#"{"data":{}}"#).unwrap();
        assert!(!env.is_success());
        assert_eq!(env.code, None);
    }

    #[test]
    fn test_empty_error_message_is_ignored() {
        let env = ResponseEnvelope::failure(3, "");
        assert_eq!(env.error_message(), None);
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        assert!(ResponseEnvelope::from_slice(b"[1,2,3]").is_err());
        assert!(ResponseEnvelope::from_slice(b"<html>").is_err());
    }

    #[test]
    fn test_pagination_request_skips_unset_fields() {
        let req = PaginationRequest {
            page_index: Some(2),
            page_size: None,
        };
        assert_eq!(serde_json::to_value(&req).unwrap(), json!({"pageIndex": 2}));
    }

    #[test]
    fn test_pagination_response_tolerates_missing_rows() {
        let page: PaginationResponse<String> = serde_json::from_value(json!({"total": 4})).unwrap();
        assert_eq!(page.total, Some(4));
        assert!(page.rows().is_empty());
    }
}
