use serde::{Deserialize, Serialize};

/// Access level attached to a user. Gate checks use exact equality;
/// ADMIN does not imply USER.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    User,
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::User => f.write_str("USER"),
            UserRole::Admin => f.write_str("ADMIN"),
        }
    }
}
