use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Crate-wide request error. Every variant renders as the structured
/// `{status, code, message}` body that clients match on.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or semantically invalid input.
    #[error("{0}")]
    InvalidRequest(String),
    /// Requested row does not exist. Surfaced as 400, not 404 — clients
    /// encode that mapping.
    #[error("{0}")]
    NotFound(String),
    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthorized(String),
    /// Principal lacks the required role.
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: String,
    pub code: u16,
    pub message: String,
}

impl ErrorBody {
    pub fn new(status: StatusCode, message: String) -> Self {
        Self {
            status: status_name(status),
            code: status.as_u16(),
            message,
        }
    }
}

/// "Bad Request" -> "BAD_REQUEST".
fn status_name(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("UNKNOWN")
        .to_uppercase()
        .replace(' ', "_")
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) | ApiError::NotFound(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::Database(_) => "Database error".to_string(),
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Database(e) = &self {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    let status = StatusCode::CONFLICT;
                    let body = ErrorBody::new(status, "Email already registered".into());
                    return (status, Json(body)).into_response();
                }
            }
        }

        match &self {
            ApiError::Database(e) => tracing::error!(error = %e, "database error"),
            ApiError::Internal(e) => tracing::error!(error = %e, "internal error"),
            _ => {}
        }

        let status = self.status_code();
        let body = ErrorBody::new(status, self.public_message());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_name_is_upper_snake() {
        assert_eq!(status_name(StatusCode::BAD_REQUEST), "BAD_REQUEST");
        assert_eq!(status_name(StatusCode::FORBIDDEN), "FORBIDDEN");
        assert_eq!(
            status_name(StatusCode::INTERNAL_SERVER_ERROR),
            "INTERNAL_SERVER_ERROR"
        );
    }

    #[test]
    fn not_found_maps_to_bad_request_body() {
        let err = ApiError::NotFound("Todo not found".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let body = ErrorBody::new(err.status_code(), err.public_message());
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "BAD_REQUEST");
        assert_eq!(json["code"], 400);
        assert_eq!(json["message"], "Todo not found");
    }

    #[test]
    fn forbidden_keeps_its_message() {
        let err = ApiError::Forbidden("Admin role required".into());
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.public_message(), "Admin role required");
    }

    #[test]
    fn database_errors_are_not_leaked() {
        let err = ApiError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Database error");
    }
}
