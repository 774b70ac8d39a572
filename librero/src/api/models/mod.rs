//! API-layer (wire) models.
//!
//! Everything the HTTP surface accepts or returns lives here, with utoipa
//! schemas. The domain enums (`MovementKind`, `UserRole`, `PosKind`) also
//! live here and are shared with the database layer, which stores them as
//! PostgreSQL enum types.

pub mod books;
pub mod inventory;
pub mod movements;
pub mod points_of_sale;
pub mod users;
