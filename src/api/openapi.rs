//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris API",
        version = "1.0.0",
        description = "Library Management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::update_books,
        books::delete_book,
        books::delete_books,
        books::borrow_books,
        books::return_books,
        books::set_availability,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        users::login,
        users::borrowed_books,
    ),
    components(
        schemas(
            // Health
            health::HealthResponse,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::BookIds,
            books::UpdateBooksRequest,
            books::UpdateBooksResponse,
            books::DeleteBooksRequest,
            books::DeleteBooksResponse,
            books::BorrowRequest,
            books::BorrowResponse,
            books::SetAvailabilityRequest,
            books::SetAvailabilityResponse,
            // Users
            crate::models::account::Account,
            crate::models::account::CreateAccount,
            crate::models::account::UpdateAccount,
            crate::models::account::LoginRequest,
            users::LoginResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "books", description = "Catalog management"),
        (name = "borrows", description = "Borrow/return coordination"),
        (name = "users", description = "Account management")
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router serving the OpenAPI document
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
