//! HTTP surface: handlers and wire models.

pub mod handlers;
pub mod models;
