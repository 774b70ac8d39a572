//! HTTP handlers for inventory endpoints.
//!
//! These map one-to-one onto the ledger engine operations; concurrency
//! control happens inside the engine, never here.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    AppState,
    api::models::inventory::{
        InventoryResponse, InventoryWithBookResponse, ListInventoryQuery, LowStockEntry,
        StockAdjust, StockSet,
    },
    db::handlers::Inventory,
    errors::{Error, Result},
    types::BookId,
};

#[utoipa::path(
    post,
    path = "/inventory/{book_id}",
    tag = "inventory",
    summary = "Create the inventory record for a book",
    description = "Creates the stock counter for a book, starting at zero. \
                   Idempotent: if the record already exists it is returned unchanged.",
    params(("book_id" = i64, Path, description = "Book ID")),
    responses(
        (status = 201, description = "Inventory record", body = InventoryResponse),
        (status = 404, description = "Book not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_inventory(
    State(state): State<AppState>,
    Path(book_id): Path<BookId>,
) -> Result<(StatusCode, Json<InventoryResponse>)> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut engine = Inventory::new(&mut conn, state.config.ledger.lock_timeout);

    let inventory = engine.create_for_book(book_id).await.map_err(|e| match e {
        crate::db::errors::DbError::NotFound => Error::NotFound {
            resource: "Book".to_string(),
            id: book_id.to_string(),
        },
        other => Error::Database(other),
    })?;

    Ok((StatusCode::CREATED, Json(inventory.into())))
}

#[utoipa::path(
    get,
    path = "/inventory",
    tag = "inventory",
    summary = "List inventory",
    params(ListInventoryQuery),
    responses(
        (status = 200, description = "Inventory with book titles", body = [InventoryWithBookResponse]),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_inventory(
    State(state): State<AppState>,
    Query(query): Query<ListInventoryQuery>,
) -> Result<Json<Vec<InventoryWithBookResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut engine = Inventory::new(&mut conn, state.config.ledger.lock_timeout);

    let entries = engine.list(query.q.as_deref()).await?;

    Ok(Json(
        entries
            .into_iter()
            .map(InventoryWithBookResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/inventory/low-stock",
    tag = "inventory",
    summary = "List under-threshold inventory",
    description = "Books whose current stock is strictly below their configured minimum",
    responses(
        (status = 200, description = "Low-stock books", body = [LowStockEntry]),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn low_stock(State(state): State<AppState>) -> Result<Json<Vec<LowStockEntry>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut engine = Inventory::new(&mut conn, state.config.ledger.lock_timeout);

    let entries = engine.low_stock().await?;

    Ok(Json(entries.into_iter().map(LowStockEntry::from).collect()))
}

#[utoipa::path(
    get,
    path = "/inventory/{book_id}",
    tag = "inventory",
    summary = "Read the stock of a book",
    params(("book_id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Current stock", body = InventoryResponse),
        (status = 404, description = "No inventory record for that book"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_stock(
    State(state): State<AppState>,
    Path(book_id): Path<BookId>,
) -> Result<Json<InventoryResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut engine = Inventory::new(&mut conn, state.config.ledger.lock_timeout);

    let inventory = engine
        .get_by_book(book_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Inventory".to_string(),
            id: book_id.to_string(),
        })?;

    Ok(Json(inventory.into()))
}

#[utoipa::path(
    post,
    path = "/inventory/{book_id}/adjust",
    tag = "inventory",
    summary = "Adjust stock by a signed delta",
    description = "Serialized on the inventory row lock. Rejected without any \
                   change when the result would be negative. Writes no ledger entry.",
    params(("book_id" = i64, Path, description = "Book ID")),
    request_body = StockAdjust,
    responses(
        (status = 200, description = "Updated stock", body = InventoryResponse),
        (status = 400, description = "Adjustment would leave stock negative"),
        (status = 404, description = "No inventory record for that book"),
        (status = 503, description = "Row lock wait timed out; retry"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn adjust_stock(
    State(state): State<AppState>,
    Path(book_id): Path<BookId>,
    Json(body): Json<StockAdjust>,
) -> Result<Json<InventoryResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut engine = Inventory::new(&mut conn, state.config.ledger.lock_timeout);

    let inventory = engine.adjust_stock(book_id, body.delta).await.map_err(|e| match e {
        crate::db::errors::DbError::NotFound => Error::NotFound {
            resource: "Inventory".to_string(),
            id: book_id.to_string(),
        },
        other => Error::Database(other),
    })?;

    Ok(Json(inventory.into()))
}

#[utoipa::path(
    put,
    path = "/inventory/{book_id}/set",
    tag = "inventory",
    summary = "Set stock to an absolute value",
    description = "Unconditionally overwrites the stock counter. Writes no ledger entry.",
    params(("book_id" = i64, Path, description = "Book ID")),
    request_body = StockSet,
    responses(
        (status = 200, description = "Updated stock", body = InventoryResponse),
        (status = 400, description = "Negative target"),
        (status = 404, description = "No inventory record for that book"),
        (status = 503, description = "Row lock wait timed out; retry"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn set_stock(
    State(state): State<AppState>,
    Path(book_id): Path<BookId>,
    Json(body): Json<StockSet>,
) -> Result<Json<InventoryResponse>> {
    // Rejected at the validation boundary, never inside the transaction.
    if body.stock < 0 {
        return Err(Error::BadRequest {
            message: "stock must be non-negative".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut engine = Inventory::new(&mut conn, state.config.ledger.lock_timeout);

    let inventory = engine.set_stock(book_id, body.stock).await.map_err(|e| match e {
        crate::db::errors::DbError::NotFound => Error::NotFound {
            resource: "Inventory".to_string(),
            id: book_id.to_string(),
        },
        other => Error::Database(other),
    })?;

    Ok(Json(inventory.into()))
}
