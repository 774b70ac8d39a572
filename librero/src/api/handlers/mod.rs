//! HTTP request handlers, one module per resource.

pub mod books;
pub mod inventory;
pub mod movements;
pub mod points_of_sale;
pub mod users;
