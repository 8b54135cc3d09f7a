//! ETAPI connection configuration.
//!
//! Built once at startup and handed to [`crate::etapi::TriliumClient`]. Both
//! values are mandatory; there is no partial startup mode.

use std::fmt;

use miette::Diagnostic;
use reqwest::Url;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("TRILIUM_ETAPI_URL must be set")]
    #[diagnostic(
        code(trilium_mcp::config::missing_url),
        help("Pass --etapi-url, export TRILIUM_ETAPI_URL or add it to a .env file, e.g. http://localhost:8080/etapi")
    )]
    MissingEtapiUrl,

    #[error("TRILIUM_ETAPI_TOKEN must be set")]
    #[diagnostic(
        code(trilium_mcp::config::missing_token),
        help("Create a token in Trilium under Options > ETAPI, then pass --etapi-token or export TRILIUM_ETAPI_TOKEN")
    )]
    MissingEtapiToken,

    #[error("Invalid ETAPI URL '{url}': {reason}")]
    #[diagnostic(code(trilium_mcp::config::invalid_url))]
    InvalidEtapiUrl { url: String, reason: String },
}

/// Base URL and token for the remote Trilium instance.
#[derive(Clone, PartialEq, Eq)]
pub struct EtapiConfig {
    base_url: String,
    token: String,
}

impl EtapiConfig {
    /// Validate raw values coming from flags or the environment.
    ///
    /// Empty strings count as missing. Trailing slashes are stripped from the
    /// base URL; endpoint paths are appended segment by segment.
    pub fn new(base_url: Option<String>, token: Option<String>) -> Result<Self, ConfigError> {
        let base_url = base_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingEtapiUrl)?;
        let token = token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingEtapiToken)?;

        match Url::parse(&base_url) {
            Err(e) => {
                return Err(ConfigError::InvalidEtapiUrl {
                    url: base_url,
                    reason: e.to_string(),
                });
            }
            Ok(url) if url.cannot_be_a_base() => {
                return Err(ConfigError::InvalidEtapiUrl {
                    url: base_url,
                    reason: "URL cannot carry endpoint paths".to_string(),
                });
            }
            Ok(_) => {}
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for EtapiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EtapiConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}
