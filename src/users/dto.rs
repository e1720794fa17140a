use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::repo::User;
use crate::users::role::UserRole;

/// Public projection of a user, embedded in todo and comment responses.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

/// Request body for password change.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Request body for the admin role-change operation.
#[derive(Debug, Deserialize)]
pub struct RoleChangeRequest {
    pub role: UserRole,
}

#[derive(Debug, Serialize)]
pub struct UserRoleResponse {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}
