use crate::api::models::users::UserRole;
use crate::types::{PosId, UserId};

/// Request to create a user row. The password arrives already hashed; the
/// database layer never sees a clear-text credential.
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub pos_id: Option<PosId>,
}

#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<UserRole>,
    pub pos_id: Option<PosId>,
}

#[derive(Debug, Clone)]
pub struct UserDBResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub pos_id: Option<PosId>,
}
