//! Mock NiFi server for client and CLI tests
//!
//! Serves the subset of the management API the client uses on an ephemeral
//! local port. Processors and connections live in memory, revisions are
//! checked on every update, and every received request is recorded so tests
//! can assert which calls were made.

mod error;
mod handlers;
mod state;

pub use error::{MockError, MockResult};
pub use state::{MockConfig, RecordedRequest};

use axum::http::{Method, StatusCode};
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use nf_rest_api_contract::{
    ConnectionEntity, ProcessorComponent, ProcessorEntity, ProcessorState, Revision,
};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use state::{lock, MockState, SharedState};

fn router(state: SharedState) -> Router {
    let api = Router::new()
        .route("/nifi-api/flow/process-groups/root", get(handlers::root_flow))
        .route("/nifi-api/flow/about", get(handlers::about))
        .route(
            "/nifi-api/process-groups/{group_id}/processors",
            get(handlers::list_processors).post(handlers::create_processor),
        )
        .route(
            "/nifi-api/process-groups/{group_id}/connections",
            post(handlers::create_connection),
        )
        .route(
            "/nifi-api/processors/{processor_id}",
            get(handlers::get_processor).delete(handlers::delete_processor),
        )
        .route(
            "/nifi-api/processors/{processor_id}/run-status",
            put(handlers::update_run_status),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::require_bearer,
        ));

    Router::new()
        .route("/nifi-api/access/token", post(handlers::issue_token))
        .route("/nifi/", get(handlers::ui_page))
        .merge(api)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::record_request,
        ))
        .with_state(state)
}

/// Running mock server; stops when dropped
pub struct MockNifiServer {
    addr: SocketAddr,
    state: SharedState,
    handle: JoinHandle<()>,
}

impl MockNifiServer {
    /// Start a server with default credentials (`admin` / `adminadminadmin`)
    pub async fn start() -> std::io::Result<Self> {
        Self::start_with(MockConfig::default()).await
    }

    pub async fn start_with(config: MockConfig) -> std::io::Result<Self> {
        let state = Arc::new(Mutex::new(MockState::new(config)));
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let app = router(state.clone());
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("mock server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn root_group_id(&self) -> String {
        lock(&self.state).config.root_group_id.clone()
    }

    pub fn token(&self) -> String {
        lock(&self.state).config.token.clone()
    }

    /// Seed a processor in the root group, bypassing the API
    pub fn add_processor(&self, name: &str, processor_type: &str, state: ProcessorState) -> String {
        let component = ProcessorComponent {
            id: None,
            parent_group_id: None,
            processor_type: processor_type.to_string(),
            name: name.to_string(),
            position: None,
            config: None,
            state: None,
        };
        lock(&self.state).insert_processor(component, state).id
    }

    pub fn processor(&self, processor_id: &str) -> Option<ProcessorEntity> {
        lock(&self.state)
            .processors
            .iter()
            .find(|p| p.id == processor_id)
            .cloned()
    }

    pub fn processors(&self) -> Vec<ProcessorEntity> {
        lock(&self.state).processors.clone()
    }

    pub fn connections(&self) -> Vec<ConnectionEntity> {
        lock(&self.state).connections.clone()
    }

    /// Change a processor's state as another client would, bumping its revision
    pub fn set_processor_state(&self, processor_id: &str, state: ProcessorState) {
        let mut guard = lock(&self.state);
        if let Some(processor) = guard.processors.iter_mut().find(|p| p.id == processor_id) {
            processor.component.state = Some(state);
            processor.revision = Revision::at(processor.revision.version + 1);
        }
    }

    /// Bump the processor's revision right after every read of it, as if
    /// another client updated it between this client's GET and its write
    pub fn modify_after_read(&self, processor_id: &str) {
        lock(&self.state)
            .modified_after_read
            .insert(processor_id.to_string());
    }

    /// Make the token endpoint answer with `status` regardless of credentials
    pub fn reject_credentials(&self, status: StatusCode) {
        lock(&self.state).token_rejection = Some(status);
    }

    /// Make every request for this processor fail with 500
    pub fn fail_processor(&self, processor_id: &str) {
        lock(&self.state).failing.insert(processor_id.to_string());
    }

    /// Control the status of the readiness page
    pub fn set_ready(&self, ready: bool) {
        lock(&self.state).ready = ready;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }

    /// Requests to API resources, excluding the token endpoint
    pub fn resource_requests(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.is_resource())
            .collect()
    }

    /// Non-GET requests to API resources
    pub fn mutating_requests(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.is_mutating())
            .collect()
    }

    pub fn token_requests(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == Method::POST && r.path == "/nifi-api/access/token")
            .count()
    }

    pub fn clear_requests(&self) {
        lock(&self.state).requests.clear();
    }
}

impl Drop for MockNifiServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_token_and_bearer_check() {
        let server = MockNifiServer::start().await.unwrap();
        let http = reqwest::Client::new();

        let response = http
            .post(format!("{}/nifi-api/access/token", server.base_url()))
            .form(&[("username", "admin"), ("password", "adminadminadmin")])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        assert_eq!(response.text().await.unwrap(), server.token());

        let response = http
            .get(format!("{}/nifi-api/flow/about", server.base_url()))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

        let response = http
            .get(format!("{}/nifi-api/flow/about", server.base_url()))
            .bearer_auth(server.token())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(server.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_stale_revision_is_rejected() {
        let server = MockNifiServer::start().await.unwrap();
        let id = server.add_processor("p", "org.example.P", ProcessorState::Stopped);

        let response = reqwest::Client::new()
            .put(format!(
                "{}/nifi-api/processors/{}/run-status",
                server.base_url(),
                id
            ))
            .bearer_auth(server.token())
            .json(&serde_json::json!({"revision": {"version": 0}, "state": "RUNNING"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::CONFLICT);
        let processor = server.processor(&id).unwrap();
        assert_eq!(processor.state(), ProcessorState::Stopped);
    }

    #[tokio::test]
    async fn test_readiness_page() {
        let server = MockNifiServer::start().await.unwrap();
        let url = format!("{}/nifi/", server.base_url());

        let response = reqwest::get(&url).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        server.set_ready(false);
        assert_eq!(
            reqwest::get(&url).await.unwrap().status(),
            reqwest::StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
