//! # librero: inventory backend for a bookstore chain
//!
//! `librero` exposes an HTTP API for managing a bookstore's catalog, stock,
//! users and points of sale, backed by PostgreSQL. Its core is the inventory
//! ledger engine: every book has a denormalized stock counter and an
//! append-only ledger of movements (`entrada`, `salida`, `venta`, `ajuste`)
//! explaining how the counter got there. The engine keeps the two consistent
//! under concurrent writers by serializing all stock mutations on an
//! exclusive row lock (`SELECT ... FOR UPDATE`) and enforcing the
//! non-negative-stock invariant before anything is written.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses PostgreSQL for all persistence.
//!
//! The **API layer** ([`api`]) holds one handler module per resource and the
//! wire models, documented with utoipa and served at `/docs`. The
//! **database layer** ([`db`]) uses the repository pattern: plain CRUD
//! entities implement the [`db::handlers::Repository`] trait, while the
//! ledger engine ([`db::handlers::Inventory`]) is a bespoke handler whose
//! operations each own one transaction. Cross-request coordination happens
//! exclusively through the database's transactions and row locks; there is
//! no shared in-process mutable state between requests.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use librero::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = librero::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     librero::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
pub mod types;

use std::time::Duration;

use anyhow::Context;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post, put},
};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api::models::users::UserRole;
use crate::auth::password;
use crate::db::handlers::{Repository, Users};
use crate::db::models::users::UserCreateDBRequest;
use crate::openapi::ApiDoc;

pub use config::Config;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the database migrator for the embedded migrations.
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Seed the initial admin user.
///
/// Explicit startup step, not ambient global logic: runs once per process
/// start against the injected pool, and only creates the configured admin
/// when the users table is completely empty. Safe to call on every start.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(config: &Config, db: &PgPool) -> anyhow::Result<()> {
    let mut tx = db.begin().await?;
    let mut users = Users::new(&mut tx);

    if users.any_exist().await? {
        debug!("users already present, skipping admin seed");
        return Ok(());
    }

    let request = UserCreateDBRequest {
        name: "Administrator".to_string(),
        email: config.admin_email.clone(),
        password_hash: password::hash_password(&config.admin_password)
            .context("hash admin password")?,
        role: UserRole::Admin,
        pos_id: None,
    };
    users.create(&request).await?;

    tx.commit().await?;
    info!(email = %config.admin_email, "seeded initial admin user");
    Ok(())
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.cors;

    let mut cors = if cors_config.allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins = cors_config
            .allowed_origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .context("parse CORS origin")?;

        let mut layer = CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([header::CONTENT_TYPE]);
        if cors_config.allow_credentials {
            layer = layer.allow_credentials(true);
        }
        layer
    };

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let api_routes = Router::new()
        // Book catalog
        .route(
            "/books",
            post(api::handlers::books::create_book).get(api::handlers::books::list_books),
        )
        .route(
            "/books/{id}",
            get(api::handlers::books::get_book)
                .patch(api::handlers::books::update_book)
                .delete(api::handlers::books::delete_book),
        )
        // Inventory ledger engine
        .route("/inventory", get(api::handlers::inventory::list_inventory))
        .route("/inventory/low-stock", get(api::handlers::inventory::low_stock))
        .route(
            "/inventory/{book_id}",
            post(api::handlers::inventory::create_inventory)
                .get(api::handlers::inventory::get_stock),
        )
        .route(
            "/inventory/{book_id}/adjust",
            post(api::handlers::inventory::adjust_stock),
        )
        .route(
            "/inventory/{book_id}/set",
            put(api::handlers::inventory::set_stock),
        )
        // Movement ledger
        .route(
            "/movements",
            post(api::handlers::movements::create_movement)
                .get(api::handlers::movements::list_movements),
        )
        // Users
        .route(
            "/users",
            post(api::handlers::users::create_user).get(api::handlers::users::list_users),
        )
        .route("/users/login", post(api::handlers::users::login))
        .route(
            "/users/{id}",
            get(api::handlers::users::get_user)
                .patch(api::handlers::users::update_user)
                .delete(api::handlers::users::delete_user),
        )
        // Points of sale
        .route(
            "/points-of-sale",
            post(api::handlers::points_of_sale::create_pos)
                .get(api::handlers::points_of_sale::list_pos),
        )
        .route(
            "/points-of-sale/{id}",
            get(api::handlers::points_of_sale::get_pos)
                .patch(api::handlers::points_of_sale::update_pos)
                .delete(api::handlers::points_of_sale::delete_pos),
        )
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api/v1", api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let cors_layer = create_cors_layer(&state.config)?;

    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects the pool, runs migrations and
///    seeds the initial admin user
/// 2. **Serve**: [`Application::serve`] binds the TCP port and handles
///    requests until the shutdown signal fires
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting librero with configuration: {:#?}", config);

        let pool = PgPoolOptions::new()
            .max_connections(config.pool.max_connections)
            .acquire_timeout(Duration::from_secs(config.pool.acquire_timeout_secs))
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        migrator().run(&pool).await.context("run migrations")?;
        create_initial_admin_user(&config, &pool).await?;

        let state = AppState {
            db: pool.clone(),
            config: config.clone(),
        };
        let router = build_router(&state)?;

        Ok(Self {
            router,
            config,
            pool,
        })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "librero listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    /// State over a lazy pool: routes that fail validation before touching
    /// the database are testable without one.
    fn test_state() -> AppState {
        let config = Config::default();
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool");
        AppState { db, config }
    }

    fn test_server() -> axum_test::TestServer {
        let router = build_router(&test_state()).expect("router");
        axum_test::TestServer::new(router).expect("test server")
    }

    #[test_log::test(tokio::test)]
    async fn healthz_responds_ok() {
        let server = test_server();
        let response = server.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[test_log::test(tokio::test)]
    async fn docs_are_served() {
        let server = test_server();
        let response = server.get("/docs").await;
        response.assert_status_ok();
    }

    #[test_log::test(tokio::test)]
    async fn unknown_movement_kind_is_rejected_at_the_boundary() {
        let server = test_server();
        let response = server
            .post("/api/v1/movements")
            .json(&json!({
                "inventory_id": 1,
                "kind": "regalo",
                "quantity": 5
            }))
            .await;
        // serde refuses the unknown enum literal before any handler logic runs
        response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test_log::test(tokio::test)]
    async fn non_positive_movement_quantity_is_rejected() {
        let server = test_server();
        for quantity in [0, -4] {
            let response = server
                .post("/api/v1/movements")
                .json(&json!({
                    "inventory_id": 1,
                    "kind": "venta",
                    "quantity": quantity
                }))
                .await;
            response.assert_status_bad_request();
            assert_eq!(response.text(), "quantity must be a positive integer");
        }
    }

    #[test_log::test(tokio::test)]
    async fn negative_set_stock_target_is_rejected() {
        let server = test_server();
        let response = server
            .put("/api/v1/inventory/1/set")
            .json(&json!({ "stock": -1 }))
            .await;
        response.assert_status_bad_request();
        assert_eq!(response.text(), "stock must be non-negative");
    }

    #[test_log::test(tokio::test)]
    async fn unknown_role_is_rejected_at_the_boundary() {
        let server = test_server();
        let response = server
            .post("/api/v1/users")
            .json(&json!({
                "name": "Ana",
                "email": "ana@example.com",
                "password": "secret123",
                "role": "gerente"
            }))
            .await;
        response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    }
}
