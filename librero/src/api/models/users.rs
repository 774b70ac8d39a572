use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db::models::users::UserDBResponse;
use crate::types::{PosId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Vendedor,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    /// Clear-text credential from the client; hashed before it reaches
    /// storage.
    pub password: String,
    pub role: UserRole,
    /// Home point of sale, if the user is attached to one.
    pub pos_id: Option<PosId>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub pos_id: Option<PosId>,
}

/// User as exposed over the API. The credential hash never leaves the
/// service.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub pos_id: Option<PosId>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub role: UserRole,
    pub pos_id: Option<PosId>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ListUsersQuery {
    /// Case-insensitive substring filter on name or email.
    pub q: Option<String>,
}

impl From<UserDBResponse> for UserResponse {
    fn from(u: UserDBResponse) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            pos_id: u.pos_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_literals_round_trip() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::to_string(&UserRole::Vendedor).unwrap(),
            "\"vendedor\""
        );
        let parsed: UserRole = serde_json::from_str("\"vendedor\"").unwrap();
        assert_eq!(parsed, UserRole::Vendedor);
    }

    #[test]
    fn unknown_role_literal_is_rejected() {
        assert!(serde_json::from_str::<UserRole>("\"gerente\"").is_err());
    }
}
