//! Normalizes a failed handshake into one structured, redacted record.

use crate::redact;
use tokio_tungstenite::tungstenite;

/// Character budget for the response-body preview.
pub const BODY_PREVIEW_LIMIT: usize = 256;

/// Which stage of the connection attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureSource {
    /// The server rejected the upgrade with a plain HTTP response.
    HttpResponse,
    /// The connection failed below the HTTP layer.
    Network,
}

impl std::fmt::Display for FailureSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureSource::HttpResponse => write!(f, "unexpected HTTP response"),
            FailureSource::Network => write!(f, "network failure"),
        }
    }
}

/// Diagnostics captured from a connection attempt that failed before the
/// open state. Everything in here is safe to log: the URL query values and
/// sensitive headers are already redacted, and the body is truncated.
#[derive(Debug, Clone)]
pub struct ConnectDiagnostics {
    pub source: FailureSource,
    pub url: String,
    pub status: Option<u16>,
    pub status_text: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body_preview: Option<String>,
}

/// Extracts diagnostics from a handshake error. Returns `None` when the
/// error carries no usable metadata.
pub fn from_handshake_error(
    err: &tungstenite::Error,
    target: &str,
) -> Option<ConnectDiagnostics> {
    match err {
        tungstenite::Error::Http(response) => Some(ConnectDiagnostics {
            source: FailureSource::HttpResponse,
            url: redact::redact_url(target),
            status: Some(response.status().as_u16()),
            status_text: response
                .status()
                .canonical_reason()
                .map(str::to_string),
            headers: redact::redact_headers(response.headers()),
            body_preview: response.body().as_deref().map(body_preview),
        }),
        tungstenite::Error::Io(io) => Some(ConnectDiagnostics {
            source: FailureSource::Network,
            url: redact::redact_url(target),
            status: None,
            status_text: Some(io.to_string()),
            headers: Vec::new(),
            body_preview: None,
        }),
        _ => None,
    }
}

fn body_preview(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .chars()
        .take(BODY_PREVIEW_LIMIT)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redact::REDACTED;
    use tokio_tungstenite::tungstenite::http::Response;

    fn http_rejection(body: &str) -> tungstenite::Error {
        let response = Response::builder()
            .status(403)
            .header("set-cookie", "session=abc")
            .header("content-type", "text/plain")
            .body(Some(body.as_bytes().to_vec()))
            .unwrap();
        tungstenite::Error::Http(response)
    }

    #[test]
    fn http_rejection_yields_redacted_record() {
        let err = http_rejection("forbidden");
        let diag = from_handshake_error(&err, "wss://host/realtime?model=m&key=s").unwrap();

        assert_eq!(diag.source, FailureSource::HttpResponse);
        assert_eq!(diag.status, Some(403));
        assert_eq!(diag.status_text.as_deref(), Some("Forbidden"));
        assert_eq!(diag.url, "wss://host/realtime?model=[redacted]&key=[redacted]");
        assert_eq!(diag.body_preview.as_deref(), Some("forbidden"));

        let cookie = diag.headers.iter().find(|(n, _)| n == "set-cookie").unwrap();
        assert_eq!(cookie.1, REDACTED);
        let content = diag
            .headers
            .iter()
            .find(|(n, _)| n == "content-type")
            .unwrap();
        assert_eq!(content.1, "text/plain");
    }

    #[test]
    fn body_preview_is_truncated_to_budget() {
        let long_body = "x".repeat(BODY_PREVIEW_LIMIT * 2);
        let err = http_rejection(&long_body);
        let diag = from_handshake_error(&err, "wss://host/realtime").unwrap();
        assert_eq!(diag.body_preview.unwrap().chars().count(), BODY_PREVIEW_LIMIT);
    }

    #[test]
    fn io_failure_yields_network_record_without_http_fields() {
        let err = tungstenite::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        let diag = from_handshake_error(&err, "wss://host/realtime?key=s").unwrap();
        assert_eq!(diag.source, FailureSource::Network);
        assert_eq!(diag.status, None);
        assert!(diag.headers.is_empty());
        assert_eq!(diag.url, "wss://host/realtime?key=[redacted]");
    }

    #[test]
    fn errors_without_metadata_yield_nothing() {
        let err = tungstenite::Error::ConnectionClosed;
        assert!(from_handshake_error(&err, "wss://host/realtime").is_none());
    }
}
