use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::todos::repo::TodoWithOwner;
use crate::users::dto::UserResponse;

#[derive(Debug, Deserialize)]
pub struct TodoSaveRequest {
    pub title: String,
    pub contents: String,
    pub weather: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub id: Uuid,
    pub title: String,
    pub contents: String,
    pub weather: Option<String>,
    pub user: UserResponse,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub modified_at: OffsetDateTime,
}

impl From<TodoWithOwner> for TodoResponse {
    fn from(row: TodoWithOwner) -> Self {
        Self {
            id: row.id,
            title: row.title,
            contents: row.contents,
            weather: row.weather,
            user: UserResponse {
                id: row.owner_id,
                email: row.owner_email,
            },
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}

/// Query string for the todo list: 1-based page plus optional filters.
/// `start`/`end` are RFC 3339 timestamps and only apply as a pair.
#[derive(Debug, Deserialize)]
pub struct TodoListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
    pub weather: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end: Option<OffsetDateTime>,
}

fn default_page() -> i64 {
    1
}
fn default_size() -> i64 {
    10
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
}
