//! HTTP handlers for user endpoints, including login.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    AppState,
    api::models::users::{
        ListUsersQuery, LoginRequest, LoginResponse, UserCreate, UserResponse, UserUpdate,
    },
    auth::password,
    db::{
        handlers::{PointsOfSale, Repository, Users, users::UserFilter},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{PosId, UserId},
};

/// Fail with a clear message when a referenced point of sale does not exist.
async fn ensure_pos_exists(conn: &mut sqlx::PgConnection, pos_id: PosId) -> Result<()> {
    let mut repo = PointsOfSale::new(conn);
    if !repo.exists(pos_id).await? {
        return Err(Error::BadRequest {
            message: "Point of sale does not exist".to_string(),
        });
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    summary = "Create a user",
    request_body = UserCreate,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Duplicate email or unknown point of sale"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    // Uniqueness pre-check for a friendly message; the unique constraint
    // remains the backstop under races.
    if Users::new(&mut conn).get_by_email(&body.email).await?.is_some() {
        return Err(Error::BadRequest {
            message: "A user with this email address already exists".to_string(),
        });
    }

    if let Some(pos_id) = body.pos_id {
        ensure_pos_exists(&mut conn, pos_id).await?;
    }

    let request = UserCreateDBRequest {
        name: body.name,
        email: body.email,
        password_hash: password::hash_password(&body.password)?,
        role: body.role,
        pos_id: body.pos_id,
    };

    let user = Users::new(&mut conn).create(&request).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    summary = "List users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let users = repo.list(&UserFilter { q: query.q }).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    summary = "Get a user",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<UserResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let user = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(user.into()))
}

#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "users",
    summary = "Update a user",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Duplicate email or unknown point of sale"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(body): Json<UserUpdate>,
) -> Result<Json<UserResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    if let Some(email) = &body.email {
        let existing = Users::new(&mut conn).get_by_email(email).await?;
        if existing.is_some_and(|u| u.id != id) {
            return Err(Error::BadRequest {
                message: "A user with this email address already exists".to_string(),
            });
        }
    }

    if let Some(pos_id) = body.pos_id {
        ensure_pos_exists(&mut conn, pos_id).await?;
    }

    let request = UserUpdateDBRequest {
        name: body.name,
        email: body.email,
        password_hash: body
            .password
            .as_deref()
            .map(password::hash_password)
            .transpose()?,
        role: body.role,
        pos_id: body.pos_id,
    };

    let user = Users::new(&mut conn).update(id, &request).await.map_err(|e| match e {
        crate::db::errors::DbError::NotFound => Error::NotFound {
            resource: "User".to_string(),
            id: id.to_string(),
        },
        other => Error::Database(other),
    })?;

    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    summary = "Delete a user",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "User is still referenced by movements"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<UserId>) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    if !repo.delete(id).await? {
        return Err(Error::NotFound {
            resource: "User".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/users/login",
    tag = "users",
    summary = "Log a user in",
    description = "Verifies the credential and reports the user's role and \
                   home point of sale.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login accepted", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    // A missing user and a wrong password are indistinguishable to the
    // caller.
    let invalid = || Error::Unauthenticated {
        message: Some("Invalid credentials".to_string()),
    };

    let user = repo.get_by_email(&body.email).await?.ok_or_else(invalid)?;

    if !password::verify_password(&body.password, &user.password_hash)? {
        return Err(invalid());
    }

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        role: user.role,
        pos_id: user.pos_id,
    }))
}
