use chrono::{DateTime, Utc};

use crate::types::BookId;

/// Request to create a book row.
#[derive(Debug, Clone)]
pub struct BookCreateDBRequest {
    pub title: String,
    pub author: String,
    pub price: i32,
    pub stock_minimo: i32,
}

/// Partial update of a book. Only the legally-mutable descriptive fields
/// appear here; identity and creation timestamp are immutable.
#[derive(Debug, Clone, Default)]
pub struct BookUpdateDBRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub price: Option<i32>,
    pub stock_minimo: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct BookDBResponse {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub price: i32,
    pub stock_minimo: i32,
    pub created_at: DateTime<Utc>,
}
