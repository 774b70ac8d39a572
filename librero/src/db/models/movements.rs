use chrono::{DateTime, Utc};

use crate::api::models::movements::MovementKind;
use crate::types::{InventoryId, MovementId, UserId};

/// Request to append a ledger entry. `occurred_at` may be supplied by the
/// caller; the database defaults it to the insertion time otherwise.
#[derive(Debug, Clone)]
pub struct MovementCreateDBRequest {
    pub inventory_id: InventoryId,
    pub kind: MovementKind,
    pub quantity: i32,
    pub user_id: Option<UserId>,
    pub notes: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

/// A recorded ledger entry. Immutable once written.
#[derive(Debug, Clone)]
pub struct MovementDBResponse {
    pub id: MovementId,
    pub inventory_id: InventoryId,
    pub kind: MovementKind,
    pub quantity: i32,
    pub user_id: Option<UserId>,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}
