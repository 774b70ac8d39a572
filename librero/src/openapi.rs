//! OpenAPI document for the management API.

use utoipa::OpenApi;

use crate::api::handlers;
use crate::api::models::{
    books::{BookCreate, BookResponse, BookUpdate},
    inventory::{InventoryResponse, InventoryWithBookResponse, LowStockEntry, StockAdjust, StockSet},
    movements::{MovementCreate, MovementKind, MovementResponse},
    points_of_sale::{PosCreate, PosKind, PosResponse, PosUpdate},
    users::{LoginRequest, LoginResponse, UserCreate, UserResponse, UserRole, UserUpdate},
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "librero",
        description = "Inventory management backend for a bookstore chain"
    ),
    paths(
        handlers::books::create_book,
        handlers::books::list_books,
        handlers::books::get_book,
        handlers::books::update_book,
        handlers::books::delete_book,
        handlers::inventory::create_inventory,
        handlers::inventory::list_inventory,
        handlers::inventory::low_stock,
        handlers::inventory::get_stock,
        handlers::inventory::adjust_stock,
        handlers::inventory::set_stock,
        handlers::movements::create_movement,
        handlers::movements::list_movements,
        handlers::users::create_user,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::delete_user,
        handlers::users::login,
        handlers::points_of_sale::create_pos,
        handlers::points_of_sale::list_pos,
        handlers::points_of_sale::get_pos,
        handlers::points_of_sale::update_pos,
        handlers::points_of_sale::delete_pos,
    ),
    components(schemas(
        BookCreate,
        BookUpdate,
        BookResponse,
        InventoryResponse,
        InventoryWithBookResponse,
        StockAdjust,
        StockSet,
        LowStockEntry,
        MovementCreate,
        MovementResponse,
        MovementKind,
        UserCreate,
        UserUpdate,
        UserResponse,
        UserRole,
        LoginRequest,
        LoginResponse,
        PosCreate,
        PosUpdate,
        PosResponse,
        PosKind,
    )),
    tags(
        (name = "books", description = "Book catalog"),
        (name = "inventory", description = "Stock counters and the ledger engine"),
        (name = "movements", description = "Append-only stock movement ledger"),
        (name = "users", description = "User management and login"),
        (name = "points-of-sale", description = "Sales locations"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_serializes() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().unwrap();
        assert!(json.contains("/movements"));
        assert!(json.contains("/inventory/low-stock"));
    }
}
