//! Endpoint handlers of the mock server

use axum::extract::{Form, Path, Query, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nf_rest_api_contract::{
    About, AboutEntity, ComponentRequest, ConnectionComponent, ConnectionEntity, ProcessGroupFlow,
    ProcessGroupFlowEntity, ProcessorComponent, ProcessorEntity, ProcessorState,
    ProcessorsEntity, Revision, RunStatusEntity,
};
use serde::Deserialize;
use tracing::debug;

use crate::error::{MockError, MockResult};
use crate::state::{lock, RecordedRequest, SharedState};

#[derive(Debug, Deserialize)]
pub(crate) struct TokenForm {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeleteParams {
    version: i64,
}

/// Record every request before routing
pub(crate) async fn record_request(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let recorded = RecordedRequest {
        method: request.method().clone(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
    };
    debug!(method = %recorded.method, path = %recorded.path, "mock request");
    lock(&state).requests.push(recorded);
    next.run(request).await
}

/// Reject API requests without the issued bearer token
pub(crate) async fn require_bearer(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let expected = format!("Bearer {}", lock(&state).config.token);
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected);

    if !authorized {
        return MockError::Unauthorized("Authentication credentials are required.".into())
            .into_response();
    }
    next.run(request).await
}

pub(crate) async fn issue_token(
    State(state): State<SharedState>,
    Form(form): Form<TokenForm>,
) -> Response {
    let state = lock(&state);

    if let Some(status) = state.token_rejection {
        return (status, "Unable to validate the supplied credentials.").into_response();
    }
    if form.username != state.config.username || form.password != state.config.password {
        return (
            StatusCode::FORBIDDEN,
            "The supplied username and password are not valid.",
        )
            .into_response();
    }

    (StatusCode::CREATED, state.config.token.clone()).into_response()
}

pub(crate) async fn ui_page(State(state): State<SharedState>) -> Response {
    if lock(&state).ready {
        (StatusCode::OK, "<html><title>NiFi</title></html>").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NiFi is starting").into_response()
    }
}

pub(crate) async fn root_flow(State(state): State<SharedState>) -> Json<ProcessGroupFlowEntity> {
    let state = lock(&state);
    Json(ProcessGroupFlowEntity {
        process_group_flow: ProcessGroupFlow {
            id: state.config.root_group_id.clone(),
            parent_group_id: None,
        },
    })
}

pub(crate) async fn about(State(state): State<SharedState>) -> Json<AboutEntity> {
    let state = lock(&state);
    Json(AboutEntity {
        about: About {
            version: state.config.version.clone(),
            title: Some("NiFi".into()),
        },
    })
}

pub(crate) async fn list_processors(
    State(state): State<SharedState>,
    Path(group_id): Path<String>,
) -> MockResult<Json<ProcessorsEntity>> {
    let state = lock(&state);
    state.resolve_group(&group_id)?;
    Ok(Json(ProcessorsEntity {
        processors: state.processors.clone(),
    }))
}

pub(crate) async fn create_processor(
    State(state): State<SharedState>,
    Path(group_id): Path<String>,
    Json(request): Json<ComponentRequest<ProcessorComponent>>,
) -> MockResult<(StatusCode, Json<ProcessorEntity>)> {
    let mut state = lock(&state);
    state.resolve_group(&group_id)?;

    if request.revision.version != 0 {
        return Err(MockError::BadRequest(
            "A revision of 0 must be specified when creating a new Processor.".into(),
        ));
    }
    if request.component.processor_type.is_empty() {
        return Err(MockError::BadRequest(
            "The type of Processor to create must be specified.".into(),
        ));
    }

    let entity = state.insert_processor(request.component, ProcessorState::Stopped);
    Ok((StatusCode::CREATED, Json(entity)))
}

pub(crate) async fn get_processor(
    State(state): State<SharedState>,
    Path(processor_id): Path<String>,
) -> MockResult<Json<ProcessorEntity>> {
    let mut state = lock(&state);
    let entity = state.processor(&processor_id)?.clone();

    if state.modified_after_read.contains(&processor_id) {
        let processor = state.processor_mut(&processor_id)?;
        processor.revision = Revision::at(processor.revision.version + 1);
    }
    Ok(Json(entity))
}

pub(crate) async fn update_run_status(
    State(state): State<SharedState>,
    Path(processor_id): Path<String>,
    Json(request): Json<RunStatusEntity>,
) -> MockResult<Json<ProcessorEntity>> {
    let mut state = lock(&state);
    let processor = state.processor_mut(&processor_id)?;

    if request.revision.version != processor.revision.version {
        return Err(MockError::Conflict(format!(
            "Revision {} is not the most up-to-date revision of this processor.",
            request.revision.version
        )));
    }
    if !matches!(request.state, ProcessorState::Running | ProcessorState::Stopped) {
        return Err(MockError::BadRequest(format!(
            "The run status must be RUNNING or STOPPED, got {}.",
            request.state
        )));
    }

    processor.component.state = Some(request.state);
    processor.revision = Revision::at(processor.revision.version + 1);
    Ok(Json(processor.clone()))
}

pub(crate) async fn delete_processor(
    State(state): State<SharedState>,
    Path(processor_id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> MockResult<Json<ProcessorEntity>> {
    let mut state = lock(&state);
    let processor = state.processor(&processor_id)?.clone();

    if params.version != processor.revision.version {
        return Err(MockError::Conflict(format!(
            "Revision {} is not the most up-to-date revision.",
            params.version
        )));
    }
    if processor.state() == ProcessorState::Running {
        return Err(MockError::Conflict(format!(
            "{} is running and cannot be removed.",
            processor.name()
        )));
    }
    if state.is_connected(&processor_id) {
        return Err(MockError::Conflict(format!(
            "{} has connections and cannot be removed.",
            processor.name()
        )));
    }

    state.processors.retain(|p| p.id != processor_id);
    Ok(Json(processor))
}

pub(crate) async fn create_connection(
    State(state): State<SharedState>,
    Path(group_id): Path<String>,
    Json(request): Json<ComponentRequest<ConnectionComponent>>,
) -> MockResult<(StatusCode, Json<ConnectionEntity>)> {
    let mut state = lock(&state);
    state.resolve_group(&group_id)?;

    let mut component = request.component;
    for end in [&component.source, &component.destination] {
        if !state.processors.iter().any(|p| p.id == end.id) {
            return Err(MockError::BadRequest(format!(
                "Unable to find the specified connectable '{}'.",
                end.id
            )));
        }
    }
    if component.selected_relationships.is_empty() {
        return Err(MockError::BadRequest(
            "Relationships must be specified for a connection from a processor.".into(),
        ));
    }

    let id = uuid::Uuid::new_v4().to_string();
    component.id = Some(id.clone());
    let entity = ConnectionEntity {
        id,
        revision: Revision::at(1),
        source_id: Some(component.source.id.clone()),
        destination_id: Some(component.destination.id.clone()),
        component: Some(component),
    };
    state.connections.push(entity.clone());
    Ok((StatusCode::CREATED, Json(entity)))
}
