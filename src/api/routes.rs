//! HTTP route handlers for the task REST surface.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, Method, StatusCode, header},
    middleware,
    routing::get,
};
use mockable::Clock;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::auth::{self, AuthenticatedUser, Authenticator};
use super::error::ApiError;
use super::types::{
    CreateTaskBody, DataEnvelope, ListTasksQuery, MessageEnvelope, TaskListEnvelope,
    UpdateTaskBody,
};
use crate::task::{
    domain::{Task, TaskChanges, TaskId},
    ports::TaskRepository,
    services::{StatusFilter, TaskAccessService},
};

/// Shared application state.
pub struct AppState<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Owner-scoped task operations.
    pub tasks: TaskAccessService<R, C>,
}

type SharedState<R, C> = State<Arc<AppState<R, C>>>;

/// Builds the application router.
///
/// Task routes sit behind [`auth::require_identity`]; `/` and
/// `/api/health` are public. CORS is opened to `client_origin` when set.
pub fn router<R, C>(
    tasks: TaskAccessService<R, C>,
    authenticator: Arc<dyn Authenticator>,
    client_origin: Option<HeaderValue>,
) -> Router
where
    R: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let state = Arc::new(AppState { tasks });

    let task_routes = Router::new()
        .route("/", get(list_tasks::<R, C>).post(create_task::<R, C>))
        .route(
            "/:id",
            get(get_task::<R, C>)
                .put(update_task::<R, C>)
                .delete(delete_task::<R, C>),
        )
        .route_layer(middleware::from_fn_with_state(
            authenticator,
            auth::require_identity,
        ))
        .with_state(state);

    let mut app = Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .nest("/api/tasks", task_routes)
        .layer(TraceLayer::new_for_http());

    if let Some(origin) = client_origin {
        let cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true);
        app = app.layer(cors);
    }
    app
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Task Management API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> &'static str {
    "ok"
}

fn parse_task_id(raw: &str) -> Result<TaskId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid task id '{raw}'")))
}

fn decode_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// POST /api/tasks - Create a task owned by the requester.
async fn create_task<R, C>(
    State(state): SharedState<R, C>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Result<Json<CreateTaskBody>, JsonRejection>,
) -> Result<(StatusCode, Json<DataEnvelope<Task>>), ApiError>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    let candidate = decode_body(body)?.into();
    let task = state
        .tasks
        .create(&user.owner, candidate)
        .await
        .map_err(|err| ApiError::from_access(err, "create"))?;
    Ok((StatusCode::CREATED, Json(DataEnvelope::ok(task))))
}

/// GET /api/tasks - List the requester's tasks, optionally by status.
async fn list_tasks<R, C>(
    State(state): SharedState<R, C>,
    Extension(user): Extension<AuthenticatedUser>,
    raw_query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> Result<Json<TaskListEnvelope>, ApiError>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    let Query(query) = raw_query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let filter = StatusFilter::from_query(query.status.as_deref());
    let tasks = state
        .tasks
        .list(&user.owner, &filter)
        .await
        .map_err(|err| ApiError::from_access(err, "list"))?;
    Ok(Json(tasks.into()))
}

/// GET /api/tasks/:id - Fetch one of the requester's tasks.
async fn get_task<R, C>(
    State(state): SharedState<R, C>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<DataEnvelope<Task>>, ApiError>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    let task_id = parse_task_id(&id)?;
    let task = state
        .tasks
        .get(&user.owner, task_id)
        .await
        .map_err(|err| ApiError::from_access(err, "access"))?;
    Ok(Json(DataEnvelope::ok(task)))
}

/// PUT /api/tasks/:id - Apply a partial update to one of the requester's
/// tasks.
async fn update_task<R, C>(
    State(state): SharedState<R, C>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    body: Result<Json<UpdateTaskBody>, JsonRejection>,
) -> Result<Json<DataEnvelope<Task>>, ApiError>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    let task_id = parse_task_id(&id)?;
    let changes = TaskChanges::from(decode_body(body)?);
    let task = state
        .tasks
        .update(&user.owner, task_id, changes)
        .await
        .map_err(|err| ApiError::from_access(err, "update"))?;
    Ok(Json(DataEnvelope::ok(task)))
}

/// DELETE /api/tasks/:id - Permanently remove one of the requester's tasks.
async fn delete_task<R, C>(
    State(state): SharedState<R, C>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageEnvelope>, ApiError>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    let task_id = parse_task_id(&id)?;
    state
        .tasks
        .delete(&user.owner, task_id)
        .await
        .map_err(|err| ApiError::from_access(err, "delete"))?;
    Ok(Json(MessageEnvelope {
        success: true,
        message: "Task deleted successfully".to_owned(),
    }))
}
