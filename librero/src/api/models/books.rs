use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db::models::books::{BookCreateDBRequest, BookDBResponse, BookUpdateDBRequest};
use crate::types::BookId;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BookCreate {
    pub title: String,
    pub author: String,
    /// Unit price in the store's minor currency unit.
    pub price: i32,
    /// Restock threshold used by the low-stock listing.
    #[serde(default)]
    pub stock_minimo: i32,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub price: Option<i32>,
    pub stock_minimo: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookResponse {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub price: i32,
    pub stock_minimo: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ListBooksQuery {
    /// Case-insensitive substring filter on the title.
    pub q: Option<String>,
}

impl From<BookCreate> for BookCreateDBRequest {
    fn from(b: BookCreate) -> Self {
        Self {
            title: b.title,
            author: b.author,
            price: b.price,
            stock_minimo: b.stock_minimo,
        }
    }
}

impl From<BookUpdate> for BookUpdateDBRequest {
    fn from(b: BookUpdate) -> Self {
        Self {
            title: b.title,
            author: b.author,
            price: b.price,
            stock_minimo: b.stock_minimo,
        }
    }
}

impl From<BookDBResponse> for BookResponse {
    fn from(b: BookDBResponse) -> Self {
        Self {
            id: b.id,
            title: b.title,
            author: b.author,
            price: b.price,
            stock_minimo: b.stock_minimo,
            created_at: b.created_at,
        }
    }
}
