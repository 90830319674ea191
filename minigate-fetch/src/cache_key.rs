//! Deduplication cache keys.

use std::collections::BTreeMap;

use reqwest::Method;
use serde_json::Value;

use crate::error::RequestError;

/// Derives the deduplication key for a request.
///
/// Format: `METHOD:url:{headers json}:{body json or empty}`. The method is
/// upper-cased; headers are a sorted map, so their order never splits keys.
///
/// # Errors
///
/// Returns [`RequestError::InvalidInput`] if headers or body fail to serialize.
pub fn generate_cache_key(
    method: &Method,
    url: &str,
    headers: &BTreeMap<String, String>,
    body: Option<&Value>,
) -> Result<String, RequestError> {
    let method = method.as_str().to_uppercase();
    let headers =
        serde_json::to_string(headers).map_err(|e| RequestError::InvalidInput(e.to_string()))?;
    let body = match body {
        Some(body) => {
            serde_json::to_string(body).map_err(|e| RequestError::InvalidInput(e.to_string()))?
        }
        None => String::new(),
    };
    Ok(format!("{method}:{url}:{headers}:{body}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_format() {
        let key = generate_cache_key(
            &Method::GET,
            "https://api.example.com/list?a=1",
            &BTreeMap::new(),
            None,
        )
        .unwrap();
        assert_eq!(key, "GET:https://api.example.com/list?a=1:{}:");
    }

    #[test]
    fn test_method_is_case_insensitive() {
        let lower = Method::from_bytes(b"get").unwrap();
        let a = generate_cache_key(&lower, "https://x.io/", &BTreeMap::new(), None).unwrap();
        let b = generate_cache_key(&Method::GET, "https://x.io/", &BTreeMap::new(), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_headers_and_body_distinguish_keys() {
        let mut headers = BTreeMap::new();
        headers.insert("lang".to_string(), "en".to_string());

        let plain = generate_cache_key(&Method::GET, "https://x.io/", &BTreeMap::new(), None)
            .unwrap();
        let with_header = generate_cache_key(&Method::GET, "https://x.io/", &headers, None).unwrap();
        let with_body = generate_cache_key(
            &Method::GET,
            "https://x.io/",
            &BTreeMap::new(),
            Some(&json!({"chain": "sol"})),
        )
        .unwrap();

        assert_ne!(plain, with_header);
        assert_ne!(plain, with_body);
        assert!(with_header.contains(r#"{"lang":"en"}"#));
        assert!(with_body.ends_with(r#":{"chain":"sol"}"#));
    }

    #[test]
    fn test_header_insertion_order_does_not_matter() {
        let mut a = BTreeMap::new();
        a.insert("x-a".to_string(), "1".to_string());
        a.insert("x-b".to_string(), "2".to_string());
        let mut b = BTreeMap::new();
        b.insert("x-b".to_string(), "2".to_string());
        b.insert("x-a".to_string(), "1".to_string());

        assert_eq!(
            generate_cache_key(&Method::GET, "https://x.io/", &a, None).unwrap(),
            generate_cache_key(&Method::GET, "https://x.io/", &b, None).unwrap()
        );
    }
}
