use crate::client::config::{AuthStyle, Config};
use crate::client::consts;
use crate::error::{RealtimeError, Result};
use secrecy::ExposeSecret;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::header::HeaderName;
use url::Url;

/// Derives the realtime endpoint from the HTTP(S) base URL: the scheme flips
/// to its protocol-upgrade equivalent, a `realtime` segment is appended and
/// the model selector rides as a query parameter.
pub(crate) fn realtime_endpoint(base_url: &str, model: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| RealtimeError::configuration(format!("invalid base URL: {}", e)))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(RealtimeError::configuration(format!(
                "unsupported base URL scheme: {}",
                other
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| RealtimeError::configuration("base URL does not accept a socket scheme"))?;
    url.path_segments_mut()
        .map_err(|_| RealtimeError::configuration("base URL cannot be a base"))?
        .pop_if_empty()
        .push("realtime");
    url.query_pairs_mut().append_pair("model", model);
    Ok(url)
}

pub(crate) fn build_request(config: &Config) -> Result<Request> {
    let url = realtime_endpoint(config.base_url(), config.model())?;
    let mut request = url
        .as_str()
        .into_client_request()
        .map_err(|e| RealtimeError::configuration(e.to_string()))?;
    let headers = request.headers_mut();
    headers.insert(
        consts::CONTENT_TYPE_HEADER,
        "application/json"
            .parse()
            .map_err(|_| RealtimeError::configuration("invalid content type"))?,
    );
    match config.auth() {
        AuthStyle::Bearer => {
            let value = format!("Bearer {}", config.api_key().expose_secret());
            headers.insert(
                consts::AUTHORIZATION_HEADER,
                value.parse().map_err(|_| {
                    RealtimeError::configuration("API key contains invalid header characters")
                })?,
            );
        }
        AuthStyle::ApiKeyHeader(name) => {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| RealtimeError::configuration("invalid API key header name"))?;
            headers.insert(
                name,
                config.api_key().expose_secret().parse().map_err(|_| {
                    RealtimeError::configuration("API key contains invalid header characters")
                })?,
            );
        }
    }
    Ok(request)
}
