use chrono::{DateTime, Utc};

use crate::types::{BookId, InventoryId};

/// Current stock of one book, as stored in the denormalized counter row.
#[derive(Debug, Clone)]
pub struct InventoryDBResponse {
    pub id: InventoryId,
    pub book_id: BookId,
    pub stock: i32,
    pub updated_at: DateTime<Utc>,
}

/// Inventory joined with its book, for listings.
#[derive(Debug, Clone)]
pub struct InventoryWithBookDBResponse {
    pub id: InventoryId,
    pub book_id: BookId,
    pub title: String,
    pub stock: i32,
    pub updated_at: DateTime<Utc>,
}

/// A book whose stock sits strictly below its configured minimum.
#[derive(Debug, Clone)]
pub struct LowStockDBResponse {
    pub book_id: BookId,
    pub title: String,
    pub stock: i32,
    pub stock_minimo: i32,
}
