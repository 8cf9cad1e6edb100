//! Safe-to-log representations of connection URLs and handshake headers.

use tokio_tungstenite::tungstenite::http::HeaderMap;
use url::Url;

/// Placeholder substituted for every secret value.
pub const REDACTED: &str = "[redacted]";

/// Header names whose values are never logged or stored. Matched
/// case-insensitively; `HeaderName` is already lowercase.
const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "set-cookie",
    "api-key",
    "x-api-key",
    "openai-api-key",
    "x-goog-api-key",
];

/// Replaces every query-parameter value with [`REDACTED`] while keeping the
/// parameter keys, scheme, host and path verbatim.
///
/// A string that does not parse as a URL is truncated at the first `?` so
/// that whatever follows it cannot leak.
pub fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) => {
            if url.query().is_none() {
                return url.to_string();
            }
            let keys: Vec<String> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
            let query = keys
                .iter()
                .map(|k| format!("{}={}", k, REDACTED))
                .collect::<Vec<_>>()
                .join("&");
            let mut redacted = url;
            redacted.set_query(Some(&query));
            redacted.to_string()
        }
        Err(_) => raw.split('?').next().unwrap_or_default().to_string(),
    }
}

/// Copies a header bag, replacing the values of sensitive names with
/// [`REDACTED`]. Multi-valued headers keep one entry per value; every value
/// of a sensitive name is redacted.
pub fn redact_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name = name.as_str().to_string();
            if SENSITIVE_HEADERS.contains(&name.as_str()) {
                (name, REDACTED.to_string())
            } else {
                let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
                (name, value)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_tungstenite::tungstenite::http::HeaderValue;

    fn lookup<'a>(headers: &'a [(String, String)], name: &str) -> Vec<&'a str> {
        headers
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn url_query_values_are_replaced_keys_kept() {
        let redacted = redact_url("wss://api.example.com/v1/realtime?key=SECRET&model=M");
        assert_eq!(
            redacted,
            "wss://api.example.com/v1/realtime?key=[redacted]&model=[redacted]"
        );
    }

    #[test]
    fn url_without_query_is_unchanged() {
        let redacted = redact_url("https://api.example.com/v1/realtime");
        assert_eq!(redacted, "https://api.example.com/v1/realtime");
    }

    #[test]
    fn unparseable_url_is_truncated_at_query() {
        assert_eq!(redact_url("not a url?token=abc"), "not a url");
    }

    #[test]
    fn sensitive_headers_are_redacted_others_pass_through() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer x"));
        headers.insert("cookie", HeaderValue::from_static("y"));
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let redacted = redact_headers(&headers);
        assert_eq!(lookup(&redacted, "authorization"), vec![REDACTED]);
        assert_eq!(lookup(&redacted, "cookie"), vec![REDACTED]);
        assert_eq!(lookup(&redacted, "content-type"), vec!["application/json"]);
    }

    #[test]
    fn every_value_of_a_multi_valued_sensitive_header_is_redacted() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));
        headers.append("x-request-id", HeaderValue::from_static("req-1"));

        let redacted = redact_headers(&headers);
        assert_eq!(lookup(&redacted, "set-cookie"), vec![REDACTED, REDACTED]);
        assert_eq!(lookup(&redacted, "x-request-id"), vec!["req-1"]);
    }

    #[test]
    fn vendor_api_key_headers_are_redacted() {
        let mut headers = HeaderMap::new();
        headers.insert("api-key", HeaderValue::from_static("azure-secret"));
        headers.insert("x-goog-api-key", HeaderValue::from_static("goog-secret"));

        let redacted = redact_headers(&headers);
        assert_eq!(lookup(&redacted, "api-key"), vec![REDACTED]);
        assert_eq!(lookup(&redacted, "x-goog-api-key"), vec![REDACTED]);
    }
}
