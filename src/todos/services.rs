use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::principal::AuthPrincipal;
use crate::error::ApiError;
use crate::todos::dto::{PageResponse, TodoListQuery, TodoResponse, TodoSaveRequest};
use crate::todos::repo;
use crate::users::dto::UserResponse;

/// Which of the four list shapes a request resolves to. Exactly one is
/// selected from the filters present; the store never reinterprets the
/// combination.
#[derive(Debug, Clone, PartialEq)]
pub enum TodoFilter {
    All,
    Weather(String),
    ModifiedBetween(OffsetDateTime, OffsetDateTime),
    WeatherAndModifiedBetween(String, OffsetDateTime, OffsetDateTime),
}

impl TodoFilter {
    /// A date range only applies as a pair; a half-open range is rejected.
    pub fn from_parts(
        weather: Option<String>,
        start: Option<OffsetDateTime>,
        end: Option<OffsetDateTime>,
    ) -> Result<Self, ApiError> {
        match (weather, start, end) {
            (None, None, None) => Ok(TodoFilter::All),
            (Some(w), None, None) => Ok(TodoFilter::Weather(w)),
            (None, Some(s), Some(e)) => Ok(TodoFilter::ModifiedBetween(s, e)),
            (Some(w), Some(s), Some(e)) => Ok(TodoFilter::WeatherAndModifiedBetween(w, s, e)),
            _ => Err(ApiError::InvalidRequest(
                "start and end must be provided together".into(),
            )),
        }
    }
}

/// 1-based page at the API boundary to (limit, 0-based offset).
pub fn page_offset(page: i64, size: i64) -> Result<(i64, i64), ApiError> {
    if page < 1 {
        return Err(ApiError::InvalidRequest("page must be >= 1".into()));
    }
    if size < 1 {
        return Err(ApiError::InvalidRequest("size must be >= 1".into()));
    }
    // page and size are caller-controlled; the row offset must not wrap.
    let offset = (page - 1)
        .checked_mul(size)
        .ok_or_else(|| ApiError::InvalidRequest("page is out of range".into()))?;
    Ok((size, offset))
}

pub async fn search_todos(
    db: &PgPool,
    query: TodoListQuery,
) -> Result<PageResponse<TodoResponse>, ApiError> {
    let (limit, offset) = page_offset(query.page, query.size)?;
    let filter = TodoFilter::from_parts(query.weather, query.start, query.end)?;

    let (rows, total) = match &filter {
        TodoFilter::All => (
            repo::list_all(db, limit, offset).await?,
            repo::count_all(db).await?,
        ),
        TodoFilter::Weather(w) => (
            repo::list_by_weather(db, w, limit, offset).await?,
            repo::count_by_weather(db, w).await?,
        ),
        TodoFilter::ModifiedBetween(s, e) => (
            repo::list_by_modified_between(db, *s, *e, limit, offset).await?,
            repo::count_by_modified_between(db, *s, *e).await?,
        ),
        TodoFilter::WeatherAndModifiedBetween(w, s, e) => (
            repo::list_by_weather_and_modified_between(db, w, *s, *e, limit, offset).await?,
            repo::count_by_weather_and_modified_between(db, w, *s, *e).await?,
        ),
    };

    Ok(PageResponse {
        content: rows.into_iter().map(TodoResponse::from).collect(),
        page: query.page,
        size: query.size,
        total_elements: total,
    })
}

/// Persists a new todo owned by the calling principal. The owner projection
/// in the response comes from the principal itself; no extra user lookup.
pub async fn create_todo(
    db: &PgPool,
    principal: &AuthPrincipal,
    request: TodoSaveRequest,
) -> Result<TodoResponse, ApiError> {
    if request.title.trim().is_empty() {
        return Err(ApiError::InvalidRequest("Title must not be empty".into()));
    }
    if request.contents.trim().is_empty() {
        return Err(ApiError::InvalidRequest(
            "Contents must not be empty".into(),
        ));
    }

    let todo = repo::insert(
        db,
        principal.id,
        &request.title,
        &request.contents,
        request.weather.as_deref(),
    )
    .await?;

    Ok(TodoResponse {
        id: todo.id,
        title: todo.title,
        contents: todo.contents,
        weather: todo.weather,
        user: UserResponse {
            id: todo.user_id,
            email: principal.email.clone(),
        },
        created_at: todo.created_at,
        modified_at: todo.modified_at,
    })
}

pub async fn get_todo(db: &PgPool, id: Uuid) -> Result<TodoResponse, ApiError> {
    repo::find_by_id_with_owner(db, id)
        .await?
        .map(TodoResponse::from)
        .ok_or_else(|| ApiError::NotFound("Todo not found".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const T0: OffsetDateTime = datetime!(2024-03-01 00:00 UTC);
    const T1: OffsetDateTime = datetime!(2024-03-31 00:00 UTC);

    #[test]
    fn no_filters_selects_list_all() {
        let filter = TodoFilter::from_parts(None, None, None).unwrap();
        assert_eq!(filter, TodoFilter::All);
    }

    #[test]
    fn weather_alone_selects_weather_shape() {
        let filter = TodoFilter::from_parts(Some("Sunny".into()), None, None).unwrap();
        assert_eq!(filter, TodoFilter::Weather("Sunny".into()));
    }

    #[test]
    fn full_range_selects_between_shape() {
        let filter = TodoFilter::from_parts(None, Some(T0), Some(T1)).unwrap();
        assert_eq!(filter, TodoFilter::ModifiedBetween(T0, T1));
    }

    #[test]
    fn weather_and_range_select_conjunction_shape() {
        let filter = TodoFilter::from_parts(Some("Rainy".into()), Some(T0), Some(T1)).unwrap();
        assert_eq!(
            filter,
            TodoFilter::WeatherAndModifiedBetween("Rainy".into(), T0, T1)
        );
    }

    #[test]
    fn half_open_range_is_rejected() {
        assert!(matches!(
            TodoFilter::from_parts(None, Some(T0), None),
            Err(ApiError::InvalidRequest(_))
        ));
        assert!(matches!(
            TodoFilter::from_parts(Some("Sunny".into()), None, Some(T1)),
            Err(ApiError::InvalidRequest(_))
        ));
    }

    #[test]
    fn first_page_starts_at_offset_zero() {
        assert_eq!(page_offset(1, 10).unwrap(), (10, 0));
    }

    #[test]
    fn later_pages_translate_to_row_offsets() {
        assert_eq!(page_offset(2, 10).unwrap(), (10, 10));
        assert_eq!(page_offset(4, 25).unwrap(), (25, 75));
    }

    #[test]
    fn zero_or_negative_page_and_size_are_rejected() {
        assert!(page_offset(0, 10).is_err());
        assert!(page_offset(-1, 10).is_err());
        assert!(page_offset(1, 0).is_err());
    }

    #[test]
    fn overflowing_offset_is_rejected_not_wrapped() {
        assert!(matches!(
            page_offset(i64::MAX, 2),
            Err(ApiError::InvalidRequest(_))
        ));
        assert!(matches!(
            page_offset(3, i64::MAX),
            Err(ApiError::InvalidRequest(_))
        ));
    }
}
