//! Main REST API client implementation

use nf_rest_api_contract::{AboutEntity, ProcessGroupFlowEntity};
use reqwest::header::HeaderMap;
use reqwest::{Client as HttpClient, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::auth::{BearerToken, Credentials};
use crate::config::{ClientConfig, API_ROOT, READY_PATH, TOKEN_ENDPOINT, UI_PATH};
use crate::error::{RestClientError, RestClientResult};

/// REST API client for a NiFi instance
///
/// The bearer token and the root process group ID are fetched on first use
/// and reused for the lifetime of the client. There is no re-authentication
/// when a cached token expires; call [`NifiClient::authenticate`] to refresh it.
#[derive(Debug)]
pub struct NifiClient {
    http_client: HttpClient,
    base_url: String,
    credentials: Credentials,
    request_timeout: Duration,
    ready_timeout: Duration,
    token: RwLock<Option<BearerToken>>,
    root_group_id: RwLock<Option<String>>,
}

impl NifiClient {
    /// Create a new client from a configuration
    pub fn new(config: ClientConfig) -> RestClientResult<Self> {
        let base_url = config.normalized_base_url()?;
        let builder =
            HttpClient::builder().user_agent(concat!("nifi-cli/", env!("CARGO_PKG_VERSION")));
        let http_client = config.tls.configure(builder)?.build()?;

        Ok(Self {
            http_client,
            base_url,
            credentials: config.credentials,
            request_timeout: config.request_timeout,
            ready_timeout: config.ready_timeout,
            token: RwLock::new(None),
            root_group_id: RwLock::new(None),
        })
    }

    /// Create a client from a base URL string with default TLS and timeouts
    pub fn from_url(base_url: &str, credentials: Credentials) -> RestClientResult<Self> {
        Self::new(ClientConfig::new(base_url, credentials))
    }

    /// Get the base URL, without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Link to the NiFi web UI
    pub fn ui_url(&self) -> String {
        format!("{}{}", self.base_url, UI_PATH)
    }

    /// Absolute URL of an endpoint under the API root
    pub fn api_url(&self, endpoint: &str) -> RestClientResult<Url> {
        let separator = if endpoint.starts_with('/') { "" } else { "/" };
        Ok(Url::parse(&format!(
            "{}{}{}{}",
            self.base_url, API_ROOT, separator, endpoint
        ))?)
    }

    /// Exchange the configured credentials for a bearer token
    ///
    /// The token replaces any previously cached one.
    pub async fn authenticate(&self) -> RestClientResult<BearerToken> {
        let url = self.api_url(TOKEN_ENDPOINT)?;
        info!(username = %self.credentials.username(), "authenticating");

        let response = self
            .http_client
            .post(url)
            .form(&self.credentials.form_fields())
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RestClientError::Authentication { status, body });
        }

        let token = BearerToken::new(body)?;
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        debug!("bearer token cached");
        Ok(token)
    }

    /// Currently cached bearer token, if any
    pub fn cached_token(&self) -> Option<BearerToken> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn bearer_token(&self) -> RestClientResult<BearerToken> {
        match self.cached_token() {
            Some(token) => Ok(token),
            None => self.authenticate().await,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> RestClientResult<T> {
        self.request(Method::GET, endpoint, None::<&()>, self.request_timeout)
            .await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> RestClientResult<T> {
        self.request(Method::POST, endpoint, Some(body), self.request_timeout)
            .await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> RestClientResult<T> {
        self.request(Method::PUT, endpoint, Some(body), self.request_timeout)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> RestClientResult<T> {
        self.request(Method::DELETE, endpoint, None::<&()>, self.request_timeout)
            .await
    }

    /// Send one authenticated request under the API root
    ///
    /// Authenticates first when no token is cached. A single attempt is
    /// made; transport failures and non-2xx answers are returned as errors.
    pub async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        timeout: Duration,
    ) -> RestClientResult<T> {
        let token = self.bearer_token().await?;
        let url = self.api_url(endpoint)?;

        let mut headers = HeaderMap::new();
        token.apply_to_headers(&mut headers)?;

        let mut request = self
            .http_client
            .request(method.clone(), url.clone())
            .headers(headers)
            .timeout(timeout);

        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, %url, "sending request");
        let response = request.send().await?;
        debug!(%method, %url, status = %response.status(), "received response");

        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> RestClientResult<T> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(RestClientError::from)
        } else {
            Err(RestClientError::ServerError { status, body: text })
        }
    }

    /// ID of the root process group, looked up once and cached
    pub async fn root_process_group_id(&self) -> RestClientResult<String> {
        if let Some(id) = self.cached_root_process_group_id() {
            return Ok(id);
        }

        let entity: ProcessGroupFlowEntity = self.get("/flow/process-groups/root").await?;
        let id = entity.process_group_flow.id;
        *self
            .root_group_id
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(id.clone());
        Ok(id)
    }

    pub fn cached_root_process_group_id(&self) -> Option<String> {
        self.root_group_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Version string reported by the server
    pub async fn nifi_version(&self) -> RestClientResult<String> {
        let about: AboutEntity = self.get("/flow/about").await?;
        Ok(about.about.version)
    }

    /// Whether the web front end answers with 200
    ///
    /// Never fails: unreachable servers and any other status yield `false`.
    pub async fn is_ready(&self) -> bool {
        let url = format!("{}{}", self.base_url, READY_PATH);
        match self
            .http_client
            .get(&url)
            .timeout(self.ready_timeout)
            .send()
            .await
        {
            Ok(response) => {
                debug!(%url, status = %response.status(), "readiness probe answered");
                response.status() == reqwest::StatusCode::OK
            }
            Err(e) => {
                debug!(%url, error = %e, "readiness probe failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client =
            NifiClient::from_url("https://localhost:8443/", Credentials::default()).unwrap();

        assert_eq!(client.base_url(), "https://localhost:8443");
        assert_eq!(client.ui_url(), "https://localhost:8443/nifi");
        assert!(client.cached_token().is_none());
        assert!(client.cached_root_process_group_id().is_none());
    }

    #[test]
    fn test_api_url_building() {
        let client =
            NifiClient::from_url("https://localhost:8443", Credentials::default()).unwrap();

        assert_eq!(
            client.api_url("/flow/about").unwrap().as_str(),
            "https://localhost:8443/nifi-api/flow/about"
        );
        assert_eq!(
            client.api_url("processors/abc?version=2").unwrap().as_str(),
            "https://localhost:8443/nifi-api/processors/abc?version=2"
        );
    }

    #[test]
    fn test_is_ready_false_when_unreachable() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = ClientConfig::new(format!("http://127.0.0.1:{}", port), Credentials::default())
            .with_ready_timeout(Duration::from_secs(1));
        let client = NifiClient::new(config).unwrap();

        assert!(!tokio_test::block_on(client.is_ready()));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = NifiClient::from_url("not a url", Credentials::default());
        assert!(result.is_err());
    }
}
