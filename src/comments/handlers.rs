use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::principal::AuthPrincipal;
use crate::comments::dto::{CommentResponse, CommentSaveRequest};
use crate::comments::repo;
use crate::error::ApiError;
use crate::state::AppState;
use crate::todos;
use crate::users::dto::UserResponse;

pub fn comment_routes() -> Router<AppState> {
    Router::new().route(
        "/todos/:todo_id/comments",
        post(save_comment).get(list_comments),
    )
}

#[instrument(skip(state, payload))]
pub async fn save_comment(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Path(todo_id): Path<Uuid>,
    Json(payload): Json<CommentSaveRequest>,
) -> Result<Json<CommentResponse>, ApiError> {
    if payload.contents.trim().is_empty() {
        return Err(ApiError::InvalidRequest(
            "Contents must not be empty".into(),
        ));
    }
    if !todos::repo::exists(&state.db, todo_id).await? {
        return Err(ApiError::NotFound("Todo not found".into()));
    }

    let comment = repo::insert(&state.db, todo_id, principal.id, &payload.contents).await?;

    info!(comment_id = %comment.id, todo_id = %comment.todo_id, author = %principal.id, "comment created");
    Ok(Json(CommentResponse {
        id: comment.id,
        contents: comment.contents,
        user: UserResponse {
            id: principal.id,
            email: principal.email.clone(),
        },
    }))
}

#[instrument(skip(state))]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(todo_id): Path<Uuid>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let comments = repo::list_by_todo_with_author(&state.db, todo_id).await?;
    Ok(Json(
        comments.into_iter().map(CommentResponse::from).collect(),
    ))
}
