//! Per-call request options.
//!
//! [`RequestOptions`] is what a caller hands to
//! [`Dispatcher::request`](crate::dispatcher::Dispatcher::request): method,
//! headers, body, query params and the two per-call switches (`dedup` and
//! `error_toast`).

use std::collections::BTreeMap;
use std::fmt;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::error::RequestError;

// ============================================================================
// Param Value
// ============================================================================

/// A query parameter value. `Null` values are dropped from the URL.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// String value.
    Str(String),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// Absent value; never serialized.
    Null,
}

impl ParamValue {
    /// Returns true for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Converts a JSON scalar. Arrays and objects are rejected.
    fn from_json(key: &str, value: Value) -> Result<Self, RequestError> {
        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::String(s) => Ok(Self::Str(s)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Self::Float(f))
                } else {
                    Err(RequestError::InvalidInput(format!(
                        "param `{key}` is out of range"
                    )))
                }
            }
            Value::Array(_) | Value::Object(_) => Err(RequestError::InvalidInput(format!(
                "param `{key}` is not a scalar"
            ))),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => Ok(()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

// ============================================================================
// Params
// ============================================================================

/// Ordered query parameters.
///
/// Insertion order is kept. Inserting an existing key replaces its value in
/// place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    /// Creates an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter, replacing any existing value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Builds params from a value serializing to a flat JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidInput`] if the value does not encode to
    /// an object, or if any field is an array or object.
    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Self, RequestError> {
        let json =
            serde_json::to_value(value).map_err(|e| RequestError::InvalidInput(e.to_string()))?;
        let Value::Object(map) = json else {
            return Err(RequestError::InvalidInput(
                "params must encode to an object".to_string(),
            ));
        };

        let mut params = Self::new();
        for (key, value) in map {
            let value = ParamValue::from_json(&key, value)?;
            params.insert(key, value);
        }
        Ok(params)
    }

    /// Returns true if no parameters are set (nulls included).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of parameters (nulls included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates over non-null parameters as `(key, rendered value)`.
    pub fn present(&self) -> impl Iterator<Item = (&str, String)> + '_ {
        self.entries
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.as_str(), v.to_string()))
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

// ============================================================================
// Request Options
// ============================================================================

/// Options for a single request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// HTTP method.
    pub method: Method,
    /// Caller headers; these override the identity headers.
    pub headers: BTreeMap<String, String>,
    /// JSON body.
    pub body: Option<Value>,
    /// Query parameters, applied to GET requests.
    pub params: Option<Params>,
    /// Share identical in-flight GET requests.
    pub dedup: bool,
    /// Report non-network failures to the user.
    pub error_toast: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: BTreeMap::new(),
            body: None,
            params: None,
            dedup: true,
            error_toast: true,
        }
    }
}

impl RequestOptions {
    /// Options for a GET request.
    pub fn get() -> Self {
        Self::default()
    }

    /// Options for a POST request.
    pub fn post() -> Self {
        Self::default().method(Method::POST)
    }

    /// Sets the method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the query parameters.
    #[must_use]
    pub fn params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    /// Sets a raw JSON body.
    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serializes `body` as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidInput`] if `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, RequestError> {
        let value =
            serde_json::to_value(body).map_err(|e| RequestError::InvalidInput(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Enables or disables GET deduplication.
    #[must_use]
    pub fn dedup(mut self, enabled: bool) -> Self {
        self.dedup = enabled;
        self
    }

    /// Enables or disables user-facing error reports. Network errors are
    /// reported regardless.
    #[must_use]
    pub fn error_toast(mut self, enabled: bool) -> Self {
        self.error_toast = enabled;
        self
    }

    /// Returns true for GET, compared case-insensitively.
    pub fn is_get(&self) -> bool {
        self.method.as_str().eq_ignore_ascii_case(Method::GET.as_str())
    }

    /// Resolves the per-call switches.
    pub fn config(&self) -> RequestConfig {
        RequestConfig {
            dedup_enabled: self.is_get() && self.dedup,
            toast_enabled: self.error_toast,
        }
    }
}

/// Switches resolved from [`RequestOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestConfig {
    /// The call goes through the deduplication cache.
    pub dedup_enabled: bool,
    /// Non-network failures are reported.
    pub toast_enabled: bool,
}

// ============================================================================
// Tests
// ============================================================================
