//! URL composition.

use url::Url;

use crate::error::RequestError;
use crate::options::Params;

/// Returns true if `path` is already an absolute HTTP(S) URL.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Resolves `path` against `base`.
///
/// Absolute paths are used as-is; anything else is appended to `base`.
///
/// # Errors
///
/// Returns [`RequestError::InvalidUrl`] if the result does not parse as a URL.
pub fn resolve_url(base: &str, path: &str) -> Result<String, RequestError> {
    let full = if is_absolute(path) {
        path.to_string()
    } else {
        format!("{base}{path}")
    };

    Url::parse(&full).map_err(|e| RequestError::InvalidUrl(format!("{full}: {e}")))?;
    Ok(full)
}

/// Merges query parameters into `url`.
///
/// Null values are omitted. A param whose key already appears in the query
/// replaces it. Returns `url` untouched when no param has a value.
///
/// # Errors
///
/// Returns [`RequestError::InvalidUrl`] if `url` does not parse.
pub fn build_url_with_params(url: &str, params: &Params) -> Result<String, RequestError> {
    let mut parsed = Url::parse(url).map_err(|e| RequestError::InvalidUrl(format!("{url}: {e}")))?;
    let present: Vec<(&str, String)> = params.present().collect();
    if present.is_empty() {
        return Ok(url.to_string());
    }

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| !present.iter().any(|(key, _)| *key == &**k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    {
        let mut query = parsed.query_pairs_mut();
        query.clear();
        for (k, v) in &kept {
            query.append_pair(k, v);
        }
        for (k, v) in &present {
            query.append_pair(k, v);
        }
    }

    Ok(parsed.to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ParamValue;

    const BASE: &str = "https://api.example.com/api";

    #[test]
    fn test_relative_path_gets_base() {
        let url = resolve_url(BASE, "/private/user/wallet/list").unwrap();
        assert_eq!(url, "https://api.example.com/api/private/user/wallet/list");
    }

    #[test]
    fn test_absolute_path_bypasses_base() {
        let url = resolve_url(BASE, "https://cdn.example.com/x.json").unwrap();
        assert_eq!(url, "https://cdn.example.com/x.json");
    }

    #[test]
    fn test_invalid_url() {
        let err = resolve_url("", "/relative/only").unwrap_err();
        assert!(matches!(err, RequestError::InvalidUrl(_)));
    }

    #[test]
    fn test_params_filtering() {
        let params = Params::new()
            .with("a", 1)
            .with("b", ParamValue::Null)
            .with("c", None::<i64>)
            .with("d", "x");
        let url = build_url_with_params("https://api.example.com/list", &params).unwrap();
        assert_eq!(url, "https://api.example.com/list?a=1&d=x");
    }

    #[test]
    fn test_params_replace_existing_query_keys() {
        let params = Params::new().with("page", 2);
        let url = build_url_with_params("https://api.example.com/list?page=1&chain=sol", &params)
            .unwrap();
        assert_eq!(url, "https://api.example.com/list?chain=sol&page=2");
    }

    #[test]
    fn test_empty_params_leave_url_untouched() {
        let url = build_url_with_params("https://api.example.com/list", &Params::new()).unwrap();
        assert_eq!(url, "https://api.example.com/list");
    }

    #[test]
    fn test_all_null_params_add_no_query() {
        let params = Params::new().with("a", ParamValue::Null);
        let url = build_url_with_params("https://api.example.com/list", &params).unwrap();
        assert_eq!(url, "https://api.example.com/list");
    }

    #[test]
    fn test_all_null_params_keep_existing_query() {
        let params = Params::new().with("z", ParamValue::Null);
        let url = build_url_with_params("https://api.example.com/y?q=a%20b", &params).unwrap();
        assert_eq!(url, "https://api.example.com/y?q=a%20b");
    }

    #[test]
    fn test_values_are_encoded() {
        let params = Params::new().with("name", "my wallet&co").with("ok", true);
        let url = build_url_with_params("https://api.example.com/list", &params).unwrap();
        assert_eq!(url, "https://api.example.com/list?name=my+wallet%26co&ok=true");
    }
}
