//! HTTP handlers for book endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    AppState,
    api::models::books::{BookCreate, BookResponse, BookUpdate, ListBooksQuery},
    db::handlers::{Books, Repository, books::BookFilter},
    errors::{Error, Result},
    types::BookId,
};

#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    summary = "Create a book",
    request_body = BookCreate,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 422, description = "Malformed request body"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_book(
    State(state): State<AppState>,
    Json(body): Json<BookCreate>,
) -> Result<(StatusCode, Json<BookResponse>)> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Books::new(&mut conn);

    let book = repo.create(&body.into()).await?;

    Ok((StatusCode::CREATED, Json(book.into())))
}

#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    summary = "List books",
    params(ListBooksQuery),
    responses(
        (status = 200, description = "Books, newest first", body = [BookResponse]),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<ListBooksQuery>,
) -> Result<Json<Vec<BookResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Books::new(&mut conn);

    let books = repo.list(&BookFilter { q: query.q }).await?;

    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    summary = "Get a book",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "The book", body = BookResponse),
        (status = 404, description = "Book not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<BookId>,
) -> Result<Json<BookResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Books::new(&mut conn);

    let book = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Book".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(book.into()))
}

#[utoipa::path(
    patch,
    path = "/books/{id}",
    tag = "books",
    summary = "Update a book",
    description = "Partially update a book's descriptive fields",
    params(("id" = i64, Path, description = "Book ID")),
    request_body = BookUpdate,
    responses(
        (status = 200, description = "Updated book", body = BookResponse),
        (status = 404, description = "Book not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<BookId>,
    Json(body): Json<BookUpdate>,
) -> Result<Json<BookResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Books::new(&mut conn);

    let book = repo.update(id, &body.into()).await.map_err(|e| match e {
        crate::db::errors::DbError::NotFound => Error::NotFound {
            resource: "Book".to_string(),
            id: id.to_string(),
        },
        other => Error::Database(other),
    })?;

    Ok(Json(book.into()))
}

#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    summary = "Delete a book",
    description = "Deletes a book. Books that still have inventory or ledger \
                   rows are protected by foreign keys and cannot be deleted.",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 400, description = "Book is still referenced"),
        (status = 404, description = "Book not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_book(State(state): State<AppState>, Path(id): Path<BookId>) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Books::new(&mut conn);

    if !repo.delete(id).await? {
        return Err(Error::NotFound {
            resource: "Book".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
