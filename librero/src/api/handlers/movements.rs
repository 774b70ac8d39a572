//! HTTP handlers for the movement ledger.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    AppState,
    api::models::movements::{ListMovementsQuery, MovementCreate, MovementResponse},
    db::{handlers::Inventory, models::movements::MovementCreateDBRequest},
    errors::{Error, Result},
};

#[utoipa::path(
    post,
    path = "/movements",
    tag = "movements",
    summary = "Record a movement",
    description = "Applies the movement's stock delta and appends the ledger \
                   entry as one atomic unit. Outflows that exceed the current \
                   stock are rejected without touching anything.",
    request_body = MovementCreate,
    responses(
        (status = 201, description = "Recorded movement", body = MovementResponse),
        (status = 400, description = "Insufficient stock or unresolvable user reference"),
        (status = 404, description = "Inventory record not found"),
        (status = 422, description = "Malformed body or unknown movement kind"),
        (status = 503, description = "Row lock wait timed out; retry"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_movement(
    State(state): State<AppState>,
    Json(body): Json<MovementCreate>,
) -> Result<(StatusCode, Json<MovementResponse>)> {
    if body.quantity <= 0 {
        return Err(Error::BadRequest {
            message: "quantity must be a positive integer".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut engine = Inventory::new(&mut conn, state.config.ledger.lock_timeout);

    let request = MovementCreateDBRequest {
        inventory_id: body.inventory_id,
        kind: body.kind,
        quantity: body.quantity,
        user_id: body.user_id,
        notes: body.notes,
        occurred_at: body.occurred_at,
    };

    let movement = engine.record_movement(&request).await.map_err(|e| match e {
        crate::db::errors::DbError::NotFound => Error::NotFound {
            resource: "Inventory".to_string(),
            id: body.inventory_id.to_string(),
        },
        other => Error::Database(other),
    })?;

    Ok((StatusCode::CREATED, Json(movement.into())))
}

#[utoipa::path(
    get,
    path = "/movements",
    tag = "movements",
    summary = "List movements",
    description = "Ledger entries newest-first, optionally filtered by kind",
    params(ListMovementsQuery),
    responses(
        (status = 200, description = "Movements", body = [MovementResponse]),
        (status = 400, description = "Unknown movement kind"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<ListMovementsQuery>,
) -> Result<Json<Vec<MovementResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut engine = Inventory::new(&mut conn, state.config.ledger.lock_timeout);

    let movements = engine.list_movements(query.kind).await?;

    Ok(Json(
        movements.into_iter().map(MovementResponse::from).collect(),
    ))
}
