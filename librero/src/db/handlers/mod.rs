//! Database repositories, one per entity, plus the inventory ledger engine.

pub mod books;
pub mod inventory;
pub mod points_of_sale;
pub mod repository;
pub mod users;

pub use books::Books;
pub use inventory::Inventory;
pub use points_of_sale::PointsOfSale;
pub use repository::Repository;
pub use users::Users;
