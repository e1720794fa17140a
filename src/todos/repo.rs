use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Todo row as stored.
#[derive(Debug, Clone, FromRow)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub contents: String,
    pub weather: Option<String>,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
    pub modified_at: OffsetDateTime,
}

/// Todo row joined with its owner's public fields. Every list shape selects
/// the owner in the same statement, so a page of n rows costs one round trip
/// instead of 1 + n.
#[derive(Debug, Clone, FromRow)]
pub struct TodoWithOwner {
    pub id: Uuid,
    pub title: String,
    pub contents: String,
    pub weather: Option<String>,
    pub created_at: OffsetDateTime,
    pub modified_at: OffsetDateTime,
    pub owner_id: Uuid,
    pub owner_email: String,
}

pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    title: &str,
    contents: &str,
    weather: Option<&str>,
) -> Result<Todo, sqlx::Error> {
    sqlx::query_as::<_, Todo>(
        r#"
        INSERT INTO todos (title, contents, weather, user_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, title, contents, weather, user_id, created_at, modified_at
        "#,
    )
    .bind(title)
    .bind(contents)
    .bind(weather)
    .bind(user_id)
    .fetch_one(db)
    .await
}

// No filters.
pub async fn list_all(
    db: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<TodoWithOwner>, sqlx::Error> {
    sqlx::query_as::<_, TodoWithOwner>(
        r#"
        SELECT t.id, t.title, t.contents, t.weather, t.created_at, t.modified_at,
               u.id AS owner_id, u.email AS owner_email
        FROM todos t
        JOIN users u ON u.id = t.user_id
        ORDER BY t.modified_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

// Weather only.
pub async fn list_by_weather(
    db: &PgPool,
    weather: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<TodoWithOwner>, sqlx::Error> {
    sqlx::query_as::<_, TodoWithOwner>(
        r#"
        SELECT t.id, t.title, t.contents, t.weather, t.created_at, t.modified_at,
               u.id AS owner_id, u.email AS owner_email
        FROM todos t
        JOIN users u ON u.id = t.user_id
        WHERE t.weather = $1
        ORDER BY t.modified_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(weather)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

// Date range only; bounds are inclusive.
pub async fn list_by_modified_between(
    db: &PgPool,
    start: OffsetDateTime,
    end: OffsetDateTime,
    limit: i64,
    offset: i64,
) -> Result<Vec<TodoWithOwner>, sqlx::Error> {
    sqlx::query_as::<_, TodoWithOwner>(
        r#"
        SELECT t.id, t.title, t.contents, t.weather, t.created_at, t.modified_at,
               u.id AS owner_id, u.email AS owner_email
        FROM todos t
        JOIN users u ON u.id = t.user_id
        WHERE t.modified_at BETWEEN $1 AND $2
        ORDER BY t.modified_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(start)
    .bind(end)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

// Both filters.
pub async fn list_by_weather_and_modified_between(
    db: &PgPool,
    weather: &str,
    start: OffsetDateTime,
    end: OffsetDateTime,
    limit: i64,
    offset: i64,
) -> Result<Vec<TodoWithOwner>, sqlx::Error> {
    sqlx::query_as::<_, TodoWithOwner>(
        r#"
        SELECT t.id, t.title, t.contents, t.weather, t.created_at, t.modified_at,
               u.id AS owner_id, u.email AS owner_email
        FROM todos t
        JOIN users u ON u.id = t.user_id
        WHERE t.weather = $1 AND t.modified_at BETWEEN $2 AND $3
        ORDER BY t.modified_at DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(weather)
    .bind(start)
    .bind(end)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

pub async fn count_all(db: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM todos")
        .fetch_one(db)
        .await
}

pub async fn count_by_weather(db: &PgPool, weather: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM todos WHERE weather = $1")
        .bind(weather)
        .fetch_one(db)
        .await
}

pub async fn count_by_modified_between(
    db: &PgPool,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM todos WHERE modified_at BETWEEN $1 AND $2")
        .bind(start)
        .bind(end)
        .fetch_one(db)
        .await
}

pub async fn count_by_weather_and_modified_between(
    db: &PgPool,
    weather: &str,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM todos WHERE weather = $1 AND modified_at BETWEEN $2 AND $3",
    )
    .bind(weather)
    .bind(start)
    .bind(end)
    .fetch_one(db)
    .await
}

/// Single todo with its owner, one statement.
pub async fn find_by_id_with_owner(
    db: &PgPool,
    id: Uuid,
) -> Result<Option<TodoWithOwner>, sqlx::Error> {
    sqlx::query_as::<_, TodoWithOwner>(
        r#"
        SELECT t.id, t.title, t.contents, t.weather, t.created_at, t.modified_at,
               u.id AS owner_id, u.email AS owner_email
        FROM todos t
        JOIN users u ON u.id = t.user_id
        WHERE t.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn exists(db: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM todos WHERE id = $1)")
        .bind(id)
        .fetch_one(db)
        .await
}
