//! Identifier types shared across the API and database layers.

pub type BookId = i64;
pub type InventoryId = i64;
pub type MovementId = i64;
pub type UserId = i64;
pub type PosId = i64;
