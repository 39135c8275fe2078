//! Book (catalog entry) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book model from database.
///
/// `available_copies` is bounded by `0 <= available_copies <= total_copies`;
/// `available` is derived from it and kept in sync by the store layer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub category: String,
    pub total_copies: i32,
    pub available_copies: i32,
    pub available: bool,
    pub cover: Option<String>,
    pub description: Option<String>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: String,
    pub category: String,
    #[validate(range(min = 0, message = "Copy count must not be negative"))]
    pub total_copies: i32,
    pub cover: Option<String>,
    pub description: Option<String>,
}

/// Update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0, message = "Copy count must not be negative"))]
    pub total_copies: Option<i32>,
    pub cover: Option<String>,
    pub description: Option<String>,
}
