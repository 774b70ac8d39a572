//! Database-layer request/response models.
//!
//! These types describe what the repositories accept and return. They are
//! deliberately separate from the API models so wire contracts and storage
//! contracts can evolve independently.

pub mod books;
pub mod inventory;
pub mod movements;
pub mod points_of_sale;
pub mod users;
