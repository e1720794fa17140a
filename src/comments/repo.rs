use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Comment row as stored.
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub contents: String,
    pub todo_id: Uuid,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
    pub modified_at: OffsetDateTime,
}

/// Comment joined with its author's public fields.
#[derive(Debug, Clone, FromRow)]
pub struct CommentWithAuthor {
    pub id: Uuid,
    pub contents: String,
    pub author_id: Uuid,
    pub author_email: String,
}

pub async fn insert(
    db: &PgPool,
    todo_id: Uuid,
    user_id: Uuid,
    contents: &str,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (contents, todo_id, user_id)
        VALUES ($1, $2, $3)
        RETURNING id, contents, todo_id, user_id, created_at, modified_at
        "#,
    )
    .bind(contents)
    .bind(todo_id)
    .bind(user_id)
    .fetch_one(db)
    .await
}

/// All comments on a todo with their authors, in one statement. The join is
/// the point: n comments must cost one round trip, not 1 + n author lookups.
pub async fn list_by_todo_with_author(
    db: &PgPool,
    todo_id: Uuid,
) -> Result<Vec<CommentWithAuthor>, sqlx::Error> {
    sqlx::query_as::<_, CommentWithAuthor>(
        r#"
        SELECT c.id, c.contents, u.id AS author_id, u.email AS author_email
        FROM comments c
        JOIN users u ON u.id = c.user_id
        WHERE c.todo_id = $1
        ORDER BY c.created_at ASC
        "#,
    )
    .bind(todo_id)
    .fetch_all(db)
    .await
}
