use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::principal::AuthPrincipal;
use crate::error::ApiError;
use crate::state::AppState;
use crate::todos::dto::{PageResponse, TodoListQuery, TodoResponse, TodoSaveRequest};
use crate::todos::services;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(get_todos))
        .route("/todos/:todo_id", get(get_todo))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/todos", post(save_todo))
}

#[instrument(skip(state, payload))]
pub async fn save_todo(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(payload): Json<TodoSaveRequest>,
) -> Result<Json<TodoResponse>, ApiError> {
    let todo = services::create_todo(&state.db, &principal, payload).await?;
    info!(todo_id = %todo.id, owner = %principal.id, "todo created");
    Ok(Json(todo))
}

#[instrument(skip(state))]
pub async fn get_todos(
    State(state): State<AppState>,
    Query(query): Query<TodoListQuery>,
) -> Result<Json<PageResponse<TodoResponse>>, ApiError> {
    let page = services::search_todos(&state.db, query).await?;
    Ok(Json(page))
}

#[instrument(skip(state))]
pub async fn get_todo(
    State(state): State<AppState>,
    Path(todo_id): Path<Uuid>,
) -> Result<Json<TodoResponse>, ApiError> {
    let todo = services::get_todo(&state.db, todo_id).await?;
    Ok(Json(todo))
}
