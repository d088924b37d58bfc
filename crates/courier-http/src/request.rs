//! Request header and body helpers.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Serialize;

use crate::error::HttpError;

/// Content types forced by the POST helpers.
pub mod content_types {
    pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
    pub const JSON: &str = "application/json";
}

/// Append every value in `src` to `dst`.
///
/// Existing values in `dst` are kept, and a name repeated in `src` is sent
/// once per value.
pub fn append_headers(dst: &mut HeaderMap, src: &HeaderMap) {
    for (name, value) in src {
        dst.append(name.clone(), value.clone());
    }
}

/// Copy of `headers` (empty if absent) with `Content-Type` replaced by
/// `content_type`.
pub fn with_content_type(
    headers: Option<&HeaderMap>,
    content_type: &str,
) -> Result<HeaderMap, HttpError> {
    let value = HeaderValue::from_str(content_type)
        .map_err(|_| HttpError::InvalidHeader(format!("content-type {:?}", content_type)))?;

    let mut merged = headers.cloned().unwrap_or_default();
    merged.insert(CONTENT_TYPE, value);
    Ok(merged)
}

/// URL-encode `form`; absent form values encode to an empty body.
pub fn encode_form<F: Serialize + ?Sized>(form: Option<&F>) -> Result<String, HttpError> {
    match form {
        Some(form) => serde_urlencoded::to_string(form).map_err(HttpError::FormEncode),
        None => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_append_headers_keeps_repeated_values() {
        let mut src = HeaderMap::new();
        src.append("x-trace", HeaderValue::from_static("a"));
        src.append("x-trace", HeaderValue::from_static("b"));

        let mut dst = HeaderMap::new();
        dst.insert("x-trace", HeaderValue::from_static("existing"));
        append_headers(&mut dst, &src);

        let values: Vec<_> = dst.get_all("x-trace").iter().collect();
        assert_eq!(values, vec!["existing", "a", "b"]);
    }

    #[test]
    fn test_content_type_overrides_caller_value() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        headers.insert("h", HeaderValue::from_static("kept"));

        let merged = with_content_type(Some(&headers), content_types::JSON).unwrap();

        assert_eq!(merged.get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(merged[CONTENT_TYPE], content_types::JSON);
        assert_eq!(merged["h"], "kept");
        // caller's map is untouched
        assert_eq!(headers[CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn test_content_type_without_headers() {
        let merged = with_content_type(None, content_types::FORM_URLENCODED).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[CONTENT_TYPE], content_types::FORM_URLENCODED);
    }

    #[test]
    fn test_invalid_content_type() {
        let result = with_content_type(None, "text/plain\nx-injected: 1");
        assert!(matches!(result, Err(HttpError::InvalidHeader(_))));
    }

    #[test]
    fn test_encode_form() {
        let mut form = BTreeMap::new();
        form.insert("v", "a b&c");
        form.insert("v1", "v1-value");

        assert_eq!(encode_form(Some(&form)).unwrap(), "v=a+b%26c&v1=v1-value");
        assert_eq!(encode_form::<BTreeMap<&str, &str>>(None).unwrap(), "");
    }

    #[test]
    fn test_encode_form_pairs_preserve_order_and_repeats() {
        let pairs = [("tag", "x"), ("tag", "y"), ("a", "1")];
        assert_eq!(encode_form(Some(&pairs[..])).unwrap(), "tag=x&tag=y&a=1");
    }

    #[test]
    fn test_encode_form_rejects_nested_values() {
        let mut form = BTreeMap::new();
        form.insert("nested", vec![1, 2]);
        assert!(matches!(
            encode_form(Some(&form)),
            Err(HttpError::FormEncode(_))
        ));
    }
}
