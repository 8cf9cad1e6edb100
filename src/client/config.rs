use crate::client::consts;
use crate::error::{RealtimeError, Result};
use secrecy::{ExposeSecret, SecretString};

/// How the credential is presented during the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStyle {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// A vendor API-key header, e.g. `api-key: <key>`.
    ApiKeyHeader(String),
}

pub struct Config {
    base_url: String,
    api_key: SecretString,
    model: String,
    auth: AuthStyle,
}

pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.config.api_key = SecretString::from(api_key.to_string());
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.config.model = model.to_string();
        self
    }

    /// Switch from bearer auth to a vendor API-key header.
    pub fn with_api_key_header(mut self, header_name: &str) -> Self {
        self.config.auth = AuthStyle::ApiKeyHeader(header_name.to_string());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            base_url: consts::BASE_URL.to_string(),
            api_key: std::env::var(consts::OPENAI_API_KEY)
                .unwrap_or_default()
                .into(),
            model: consts::DEFAULT_MODEL.to_string(),
            auth: AuthStyle::Bearer,
        }
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn auth(&self) -> &AuthStyle {
        &self.auth
    }

    /// Fails before any socket attempt when no credential is configured.
    pub fn require_api_key(&self) -> Result<()> {
        if self.api_key.expose_secret().is_empty() {
            return Err(RealtimeError::configuration(format!(
                "API key is not set; provide one or set {}",
                consts::OPENAI_API_KEY
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_is_a_configuration_error() {
        let config = Config::builder().with_api_key("").build();
        let err = config.require_api_key().unwrap_err();
        assert!(matches!(err, RealtimeError::Configuration(_)));
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = Config::builder()
            .with_base_url("https://example.com")
            .with_api_key("k")
            .with_model("m")
            .build();
        assert_eq!(config.base_url(), "https://example.com");
        assert_eq!(config.model(), "m");
        assert!(config.require_api_key().is_ok());
        assert_eq!(*config.auth(), AuthStyle::Bearer);
    }
}
