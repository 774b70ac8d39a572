use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db::models::inventory::{
    InventoryDBResponse, InventoryWithBookDBResponse, LowStockDBResponse,
};
use crate::types::{BookId, InventoryId};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InventoryResponse {
    pub id: InventoryId,
    pub book_id: BookId,
    pub stock: i32,
    pub updated_at: DateTime<Utc>,
}

/// Inventory entry joined with its book title, for listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InventoryWithBookResponse {
    pub id: InventoryId,
    pub book_id: BookId,
    pub title: String,
    pub stock: i32,
    pub updated_at: DateTime<Utc>,
}

/// Request body for a signed stock adjustment.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StockAdjust {
    /// Units to add (negative to subtract).
    pub delta: i32,
}

/// Request body for overwriting the stock with an absolute value.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StockSet {
    /// Absolute stock to leave; must be non-negative.
    pub stock: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LowStockEntry {
    pub book_id: BookId,
    pub title: String,
    pub stock: i32,
    pub stock_minimo: i32,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ListInventoryQuery {
    /// Case-insensitive substring filter on the book title.
    pub q: Option<String>,
}

impl From<InventoryDBResponse> for InventoryResponse {
    fn from(inv: InventoryDBResponse) -> Self {
        Self {
            id: inv.id,
            book_id: inv.book_id,
            stock: inv.stock,
            updated_at: inv.updated_at,
        }
    }
}

impl From<InventoryWithBookDBResponse> for InventoryWithBookResponse {
    fn from(inv: InventoryWithBookDBResponse) -> Self {
        Self {
            id: inv.id,
            book_id: inv.book_id,
            title: inv.title,
            stock: inv.stock,
            updated_at: inv.updated_at,
        }
    }
}

impl From<LowStockDBResponse> for LowStockEntry {
    fn from(e: LowStockDBResponse) -> Self {
        Self {
            book_id: e.book_id,
            title: e.title,
            stock: e.stock,
            stock_minimo: e.stock_minimo,
        }
    }
}
