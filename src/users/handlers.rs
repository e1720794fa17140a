use axum::{
    extract::{OriginalUri, Path, State},
    routing::{get, patch, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::principal::AuthPrincipal;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::audit;
use crate::users::dto::{ChangePasswordRequest, RoleChangeRequest, UserResponse, UserRoleResponse};
use crate::users::repo::User;
use crate::users::role::UserRole;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/:user_id", get(get_user))
        .route("/users/password", put(change_password))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/users/:user_id/role", patch(change_user_role))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    _principal: AuthPrincipal,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(UserResponse::from(&user)))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if payload.new_password.len() < 8 {
        return Err(ApiError::InvalidRequest("Password too short".into()));
    }

    let user = User::find_by_id(&state.db, principal.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    if !verify_password(&payload.old_password, &user.password_hash)? {
        warn!(user_id = %user.id, "password change with wrong old password");
        return Err(ApiError::InvalidRequest("Wrong password".into()));
    }
    if verify_password(&payload.new_password, &user.password_hash)? {
        return Err(ApiError::InvalidRequest(
            "New password must differ from the old one".into(),
        ));
    }

    let hash = hash_password(&payload.new_password)?;
    let updated = User::update_password(&state.db, user.id, &hash)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!(user_id = %updated.id, "password changed");
    Ok(Json(UserResponse::from(&updated)))
}

/// Admin-only role change. The audit line is emitted first, unconditionally:
/// it must record the attempt even when authentication, the role gate or the
/// update itself fails afterwards.
#[instrument(skip(state, principal, payload))]
pub async fn change_user_role(
    State(state): State<AppState>,
    principal: Option<AuthPrincipal>,
    OriginalUri(uri): OriginalUri,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<RoleChangeRequest>,
) -> Result<Json<UserRoleResponse>, ApiError> {
    audit::log_admin_access(
        principal.as_ref().map(|p| p.id),
        uri.path(),
        "change_user_role",
    );

    let principal = principal
        .ok_or_else(|| ApiError::Unauthorized("Missing or invalid credentials".into()))?;
    principal.require_role(UserRole::Admin)?;

    let user = User::update_role(&state.db, user_id, payload.role)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!(actor = %principal.id, target = %user.id, role = %user.role, "user role changed");
    Ok(Json(UserRoleResponse {
        id: user.id,
        email: user.email,
        role: user.role,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::audit::capture::CapturedEvents;
    use axum::http::Uri;
    use tracing_subscriber::prelude::*;

    #[test]
    fn role_change_request_parses_upper_case_role() {
        let req: RoleChangeRequest = serde_json::from_str(r#"{"role": "ADMIN"}"#).unwrap();
        assert_eq!(req.role, UserRole::Admin);
    }

    #[test]
    fn role_change_request_rejects_unknown_role() {
        assert!(serde_json::from_str::<RoleChangeRequest>(r#"{"role": "ROOT"}"#).is_err());
    }

    fn role_change_uri(target: Uuid) -> OriginalUri {
        OriginalUri(
            format!("/admin/users/{target}/role")
                .parse::<Uri>()
                .unwrap(),
        )
    }

    // The audit line must land before the role gate, so a rejected call
    // still leaves exactly one entry. The fake state's pool is lazy; these
    // paths fail before any query, so no database is needed.
    #[tokio::test]
    async fn rejected_role_change_still_leaves_one_audit_line() {
        let state = AppState::fake();
        let actor = AuthPrincipal {
            id: Uuid::new_v4(),
            email: "user@example.com".into(),
            role: UserRole::User,
        };
        let target = Uuid::new_v4();
        let path = format!("/admin/users/{target}/role");

        let events = CapturedEvents::default();
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::registry::Registry::default().with(events.clone()),
        );

        let result = change_user_role(
            State(state),
            Some(actor.clone()),
            role_change_uri(target),
            Path(target),
            Json(RoleChangeRequest {
                role: UserRole::Admin,
            }),
        )
        .await;

        assert!(matches!(result, Err(ApiError::Forbidden(_))));
        let lines = events.with_message("admin access");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["actor"], actor.id.to_string());
        assert_eq!(lines[0]["path"], path);
        assert!(!lines[0]["at"].is_empty());
    }

    #[tokio::test]
    async fn unauthenticated_role_change_audits_unknown_actor() {
        let state = AppState::fake();
        let target = Uuid::new_v4();

        let events = CapturedEvents::default();
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::registry::Registry::default().with(events.clone()),
        );

        let result = change_user_role(
            State(state),
            None,
            role_change_uri(target),
            Path(target),
            Json(RoleChangeRequest {
                role: UserRole::Admin,
            }),
        )
        .await;

        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
        let lines = events.with_message("admin access");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["actor"], "unknown");
    }
}
