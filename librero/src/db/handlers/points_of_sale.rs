//! Database repository for points of sale.

use sqlx::{FromRow, PgConnection};
use tracing::instrument;

use crate::api::models::points_of_sale::PosKind;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::points_of_sale::{PosCreateDBRequest, PosDBResponse, PosUpdateDBRequest},
};
use crate::types::PosId;

/// Filter for listing points of sale. No filters are supported yet.
#[derive(Debug, Clone, Default)]
pub struct PosFilter;

#[derive(Debug, Clone, FromRow)]
struct PointOfSale {
    pub id: PosId,
    pub name: String,
    pub location: String,
    pub kind: PosKind,
}

impl From<PointOfSale> for PosDBResponse {
    fn from(p: PointOfSale) -> Self {
        Self {
            id: p.id,
            name: p.name,
            location: p.location,
            kind: p.kind,
        }
    }
}

pub struct PointsOfSale<'c> {
    db: &'c mut PgConnection,
}

impl<'c> PointsOfSale<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Existence check for validating user → point-of-sale references.
    #[instrument(skip(self), err)]
    pub async fn exists(&mut self, id: PosId) -> Result<bool> {
        let found: Option<PosId> = sqlx::query_scalar("SELECT id FROM points_of_sale WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(found.is_some())
    }
}

#[async_trait::async_trait]
impl Repository for PointsOfSale<'_> {
    type CreateRequest = PosCreateDBRequest;
    type UpdateRequest = PosUpdateDBRequest;
    type Response = PosDBResponse;
    type Id = PosId;
    type Filter = PosFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let pos = sqlx::query_as::<_, PointOfSale>(
            r#"
            INSERT INTO points_of_sale (name, location, kind)
            VALUES ($1, $2, $3)
            RETURNING id, name, location, kind
            "#,
        )
        .bind(&request.name)
        .bind(&request.location)
        .bind(request.kind)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(pos.into())
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let pos = sqlx::query_as::<_, PointOfSale>(
            "SELECT id, name, location, kind FROM points_of_sale WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(pos.map(Into::into))
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let locations = sqlx::query_as::<_, PointOfSale>(
            "SELECT id, name, location, kind FROM points_of_sale ORDER BY id ASC",
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(locations.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM points_of_sale WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let pos = sqlx::query_as::<_, PointOfSale>(
            r#"
            UPDATE points_of_sale SET
                name = COALESCE($2, name),
                location = COALESCE($3, location),
                kind = COALESCE($4, kind)
            WHERE id = $1
            RETURNING id, name, location, kind
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(&request.location)
        .bind(request.kind)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(pos.into())
    }
}
