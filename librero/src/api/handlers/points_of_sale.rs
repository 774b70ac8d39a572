//! HTTP handlers for point-of-sale endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    AppState,
    api::models::points_of_sale::{PosCreate, PosResponse, PosUpdate},
    db::handlers::{PointsOfSale, Repository, points_of_sale::PosFilter},
    errors::{Error, Result},
    types::PosId,
};

#[utoipa::path(
    post,
    path = "/points-of-sale",
    tag = "points-of-sale",
    summary = "Create a point of sale",
    request_body = PosCreate,
    responses(
        (status = 201, description = "Point of sale created", body = PosResponse),
        (status = 422, description = "Malformed body or unknown kind"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_pos(
    State(state): State<AppState>,
    Json(body): Json<PosCreate>,
) -> Result<(StatusCode, Json<PosResponse>)> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = PointsOfSale::new(&mut conn);

    let pos = repo
        .create(&crate::db::models::points_of_sale::PosCreateDBRequest {
            name: body.name,
            location: body.location,
            kind: body.kind,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(pos.into())))
}

#[utoipa::path(
    get,
    path = "/points-of-sale",
    tag = "points-of-sale",
    summary = "List points of sale",
    responses(
        (status = 200, description = "Points of sale", body = [PosResponse]),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_pos(State(state): State<AppState>) -> Result<Json<Vec<PosResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = PointsOfSale::new(&mut conn);

    let locations = repo.list(&PosFilter).await?;

    Ok(Json(locations.into_iter().map(PosResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/points-of-sale/{id}",
    tag = "points-of-sale",
    summary = "Get a point of sale",
    params(("id" = i64, Path, description = "Point of sale ID")),
    responses(
        (status = 200, description = "The point of sale", body = PosResponse),
        (status = 404, description = "Point of sale not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_pos(State(state): State<AppState>, Path(id): Path<PosId>) -> Result<Json<PosResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = PointsOfSale::new(&mut conn);

    let pos = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Point of sale".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(pos.into()))
}

#[utoipa::path(
    patch,
    path = "/points-of-sale/{id}",
    tag = "points-of-sale",
    summary = "Update a point of sale",
    params(("id" = i64, Path, description = "Point of sale ID")),
    request_body = PosUpdate,
    responses(
        (status = 200, description = "Updated point of sale", body = PosResponse),
        (status = 404, description = "Point of sale not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_pos(
    State(state): State<AppState>,
    Path(id): Path<PosId>,
    Json(body): Json<PosUpdate>,
) -> Result<Json<PosResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = PointsOfSale::new(&mut conn);

    let pos = repo
        .update(
            id,
            &crate::db::models::points_of_sale::PosUpdateDBRequest {
                name: body.name,
                location: body.location,
                kind: body.kind,
            },
        )
        .await
        .map_err(|e| match e {
            crate::db::errors::DbError::NotFound => Error::NotFound {
                resource: "Point of sale".to_string(),
                id: id.to_string(),
            },
            other => Error::Database(other),
        })?;

    Ok(Json(pos.into()))
}

#[utoipa::path(
    delete,
    path = "/points-of-sale/{id}",
    tag = "points-of-sale",
    summary = "Delete a point of sale",
    params(("id" = i64, Path, description = "Point of sale ID")),
    responses(
        (status = 204, description = "Point of sale deleted"),
        (status = 400, description = "Point of sale is still referenced"),
        (status = 404, description = "Point of sale not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_pos(State(state): State<AppState>, Path(id): Path<PosId>) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = PointsOfSale::new(&mut conn);

    if !repo.delete(id).await? {
        return Err(Error::NotFound {
            resource: "Point of sale".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
