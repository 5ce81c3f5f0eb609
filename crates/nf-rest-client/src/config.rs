//! Client configuration

use std::time::Duration;
use tracing::warn;
use url::Url;

use crate::auth::Credentials;
use crate::error::{RestClientError, RestClientResult};
use crate::tls::TlsMode;

pub const DEFAULT_BASE_URL: &str = "https://localhost:8443";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(5);

/// Path prefix of every management API endpoint
pub const API_ROOT: &str = "/nifi-api";
/// Token endpoint, relative to [`API_ROOT`]
pub const TOKEN_ENDPOINT: &str = "/access/token";
/// Page probed by the readiness check
pub const READY_PATH: &str = "/nifi/";
/// Web UI entry point
pub const UI_PATH: &str = "/nifi";

/// Settings used to build a [`crate::NifiClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub credentials: Credentials,
    pub tls: TlsMode,
    pub request_timeout: Duration,
    pub ready_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            tls: TlsMode::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            ready_timeout: DEFAULT_READY_TIMEOUT,
        }
    }

    pub fn with_tls(mut self, tls: TlsMode) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    /// Validated base URL without trailing slashes
    pub(crate) fn normalized_base_url(&self) -> RestClientResult<String> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        let url = Url::parse(trimmed)?;

        match url.scheme() {
            "https" => {}
            "http" => warn!(
                base_url = %trimmed,
                "using plain HTTP, credentials are sent unencrypted"
            ),
            other => {
                return Err(RestClientError::Config(format!(
                    "unsupported URL scheme '{}', expected http or https",
                    other
                )))
            }
        }

        if url.host_str().is_none() {
            return Err(RestClientError::Config(format!(
                "base URL '{}' has no host",
                trimmed
            )));
        }

        Ok(trimmed.to_string())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, Credentials::default())
    }
}
