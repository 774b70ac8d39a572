//! Persistence layer: PostgreSQL repositories, their models, and the
//! database error taxonomy.

pub mod errors;
pub mod handlers;
pub mod models;
