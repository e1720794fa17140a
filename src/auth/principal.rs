use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use uuid::Uuid;

use crate::auth::jwt::{JwtKeys, TokenKind};
use crate::error::ApiError;
use crate::users::repo::User;
use crate::users::role::UserRole;

/// Request-scoped identity: id, email, role. Decoded once from the access
/// token at the edge and passed explicitly to anything that needs it.
///
/// Read-side projection of a user row: it carries no credential and must
/// never be written back as a full user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthPrincipal {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl AuthPrincipal {
    /// Exact-match role gate. ADMIN does not satisfy a USER requirement.
    pub fn require_role(&self, required: UserRole) -> Result<(), ApiError> {
        if self.role != required {
            return Err(ApiError::Forbidden(format!("{} role required", required)));
        }
        Ok(())
    }
}

impl From<&User> for AuthPrincipal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthPrincipal
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header".into()))?;

        let claims = keys.verify(token).map_err(|_| {
            tracing::warn!("invalid or expired token");
            ApiError::Unauthorized("Invalid or expired token".into())
        })?;

        if claims.kind != TokenKind::Access {
            return Err(ApiError::Unauthorized("Access token required".into()));
        }

        Ok(AuthPrincipal {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    fn make_principal(role: UserRole) -> AuthPrincipal {
        AuthPrincipal {
            id: Uuid::new_v4(),
            email: "user@example.com".into(),
            role,
        }
    }

    #[test]
    fn require_role_passes_on_exact_match() {
        assert!(make_principal(UserRole::Admin)
            .require_role(UserRole::Admin)
            .is_ok());
        assert!(make_principal(UserRole::User)
            .require_role(UserRole::User)
            .is_ok());
    }

    #[test]
    fn require_role_is_not_a_hierarchy() {
        // ADMIN does not imply USER, and vice versa.
        let err = make_principal(UserRole::Admin)
            .require_role(UserRole::User)
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        let err = make_principal(UserRole::User)
            .require_role(UserRole::Admin)
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert_eq!(err.to_string(), "ADMIN role required");
    }

    fn parts_with_auth(value: Option<String>) -> Parts {
        let mut builder = axum::http::Request::builder().uri("/todos");
        if let Some(v) = value {
            builder = builder.header(axum::http::header::AUTHORIZATION, v);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn extracts_principal_from_access_token() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let principal = make_principal(UserRole::Admin);
        let token = keys.sign_access(&principal).expect("sign access");

        let mut parts = parts_with_auth(Some(format!("Bearer {token}")));
        let got = AuthPrincipal::from_request_parts(&mut parts, &state)
            .await
            .expect("extract principal");
        assert_eq!(got, principal);
    }

    #[tokio::test]
    async fn rejects_missing_header() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(None);
        let err = AuthPrincipal::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn rejects_refresh_token() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let token = keys
            .sign_refresh(&make_principal(UserRole::User))
            .expect("sign refresh");

        let mut parts = parts_with_auth(Some(format!("Bearer {token}")));
        let err = AuthPrincipal::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }
}
