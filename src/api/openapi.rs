//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, borrows, health, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris API",
        version = "0.1.0",
        description = "Library Catalog Server REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        users::register,
        users::login,
        users::admin_login,
        users::me,
        users::validate_token,
        users::forgot_password,
        users::verify_otp,
        users::reset_password,
        // Users
        users::get_user_by_mobile,
        users::admin_exists,
        // Books
        books::list_books,
        books::list_available,
        books::list_available_by_category,
        books::list_categories,
        books::get_book,
        books::count_books,
        books::count_available,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Borrows
        borrows::borrow_book,
        borrows::get_user_loans,
        borrows::return_book,
        borrows::count_borrowed,
        borrows::get_fine,
        borrows::can_borrow,
        borrows::fine_status,
        borrows::already_borrowed,
    ),
    components(
        schemas(
            // Health
            health::HealthResponse,
            // Auth
            users::LoginResponse,
            users::MessageResponse,
            users::OtpRequest,
            users::VerifyOtpRequest,
            users::VerifyOtpResponse,
            users::ResetPasswordRequest,
            users::AdminExistsResponse,
            // Books
            books::CountResponse,
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Users
            crate::models::user::User,
            crate::models::user::Role,
            crate::models::user::RegisterRequest,
            crate::models::user::LoginRequest,
            // Borrows
            borrows::ReturnResponse,
            borrows::FineResponse,
            borrows::CanBorrowResponse,
            borrows::AlreadyBorrowedResponse,
            crate::models::loan::Loan,
            crate::models::loan::LoanStatus,
            crate::models::loan::BorrowRequest,
            crate::models::loan::FineStatus,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Authentication and recovery"),
        (name = "users", description = "User accounts"),
        (name = "books", description = "Catalog"),
        (name = "borrows", description = "Borrowing lifecycle")
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
