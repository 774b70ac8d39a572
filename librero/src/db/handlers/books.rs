//! Database repository for books.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::books::{BookCreateDBRequest, BookDBResponse, BookUpdateDBRequest},
};
use crate::types::BookId;

/// Filter for listing books
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Case-insensitive substring match on the title
    pub q: Option<String>,
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub price: i32,
    pub stock_minimo: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Book> for BookDBResponse {
    fn from(b: Book) -> Self {
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

pub struct Books<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Books<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl Repository for Books<'_> {
    type CreateRequest = BookCreateDBRequest;
    type UpdateRequest = BookUpdateDBRequest;
    type Response = BookDBResponse;
    type Id = BookId;
    type Filter = BookFilter;

    #[instrument(skip(self, request), fields(title = %request.title), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, price, stock_minimo)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, author, price, stock_minimo, created_at
            "#,
        )
        .bind(&request.title)
        .bind(&request.author)
        .bind(request.price)
        .bind(request.stock_minimo)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(book.into())
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, price, stock_minimo, created_at FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(book.map(Into::into))
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let books = match &filter.q {
            Some(q) => {
                sqlx::query_as::<_, Book>(
                    r#"
                    SELECT id, title, author, price, stock_minimo, created_at
                    FROM books
                    WHERE title ILIKE $1
                    ORDER BY id DESC
                    "#,
                )
                .bind(format!("%{q}%"))
                .fetch_all(&mut *self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, Book>(
                    r#"
                    SELECT id, title, author, price, stock_minimo, created_at
                    FROM books
                    ORDER BY id DESC
                    "#,
                )
                .fetch_all(&mut *self.db)
                .await?
            }
        };

        Ok(books.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // Conditional field update; identity and created_at stay untouched.
        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                price = COALESCE($4, price),
                stock_minimo = COALESCE($5, stock_minimo)
            WHERE id = $1
            RETURNING id, title, author, price, stock_minimo, created_at
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(&request.author)
        .bind(request.price)
        .bind(request.stock_minimo)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(book.into())
    }
}
