use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::comments::repo::CommentWithAuthor;
use crate::users::dto::UserResponse;

#[derive(Debug, Deserialize)]
pub struct CommentSaveRequest {
    pub contents: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub contents: String,
    pub user: UserResponse,
}

impl From<CommentWithAuthor> for CommentResponse {
    fn from(row: CommentWithAuthor) -> Self {
        Self {
            id: row.id,
            contents: row.contents,
            user: UserResponse {
                id: row.author_id,
                email: row.author_email,
            },
        }
    }
}
