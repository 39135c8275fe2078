//! Borrow lifecycle endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::loan::{BorrowRequest, FineStatus, Loan, LoanStatus},
};

use super::AuthenticatedUser;

/// Return response with the settled loan
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    pub message: String,
    pub loan: Loan,
}

/// Count response
#[derive(Serialize, ToSchema)]
pub struct CountResponse {
    pub count: i64,
}

/// Fine owed on a single loan
#[derive(Serialize, ToSchema)]
pub struct FineResponse {
    pub fine: i64,
}

/// Eligibility probe response
#[derive(Serialize, ToSchema)]
pub struct CanBorrowResponse {
    pub can_borrow: bool,
}

/// Duplicate-borrow probe response
#[derive(Serialize, ToSchema)]
pub struct AlreadyBorrowedResponse {
    pub already_borrowed: bool,
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/borrows/user/{user_id}/book/{book_id}",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = i64, Path, description = "User ID"),
        ("book_id" = i64, Path, description = "Book ID")
    ),
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Loan created", body = Loan),
        (status = 404, description = "User or book not found"),
        (status = 422, description = "Ineligible, no copies, or already borrowed")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path((user_id, book_id)): Path<(i64, i64)>,
    Json(request): Json<BorrowRequest>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    let loan = state
        .services
        .circulation
        .borrow(user_id, book_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// All loans recorded for a user
#[utoipa::path(
    get,
    path = "/borrows/user/{user_id}",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "The user's loans", body = Vec<Loan>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<Loan>>> {
    let loans = state.services.circulation.loans_for_user(user_id).await?;
    Ok(Json(loans))
}

/// Return a borrowed book
#[utoipa::path(
    put,
    path = "/borrows/{id}/return",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan settled", body = ReturnResponse),
        (status = 404, description = "Borrow record not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(loan_id): Path<i64>,
) -> AppResult<Json<ReturnResponse>> {
    let loan = state.services.circulation.return_loan(loan_id).await?;

    let message = match loan.status {
        LoanStatus::Fine => "Book returned late. Fine applied.",
        LoanStatus::BorrowCancelled => "Borrow cancelled due to invalid dates.",
        _ => "Book returned successfully.",
    }
    .to_string();

    Ok(Json(ReturnResponse { message, loan }))
}

/// Count of loans not yet returned
#[utoipa::path(
    get,
    path = "/borrows/count",
    tag = "borrows",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active loan count", body = CountResponse)
    )
)]
pub async fn count_borrowed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<CountResponse>> {
    let count = state.services.circulation.count_active().await?;
    Ok(Json(CountResponse { count }))
}

/// Fine currently owed on a loan
#[utoipa::path(
    get,
    path = "/borrows/{id}/fine",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Fine owed", body = FineResponse),
        (status = 404, description = "Borrow record not found")
    )
)]
pub async fn get_fine(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(loan_id): Path<i64>,
) -> AppResult<Json<FineResponse>> {
    let fine = state.services.circulation.fine_for(loan_id).await?;
    Ok(Json(FineResponse { fine }))
}

/// Whether the user may borrow right now
#[utoipa::path(
    get,
    path = "/borrows/user/{user_id}/can-borrow",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Eligibility", body = CanBorrowResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn can_borrow(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<CanBorrowResponse>> {
    let can_borrow = state.services.circulation.can_borrow(user_id).await?;
    Ok(Json(CanBorrowResponse { can_borrow }))
}

/// Total unpaid fine across the user's open loans
#[utoipa::path(
    get,
    path = "/borrows/user/{user_id}/fine-status",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Aggregate fine state", body = FineStatus),
        (status = 404, description = "User not found")
    )
)]
pub async fn fine_status(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<FineStatus>> {
    let status = state.services.circulation.fine_status(user_id).await?;
    Ok(Json(status))
}

/// Whether the user already holds this book
#[utoipa::path(
    get,
    path = "/borrows/user/{user_id}/book/{book_id}/already-borrowed",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = i64, Path, description = "User ID"),
        ("book_id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Probe result", body = AlreadyBorrowedResponse),
        (status = 404, description = "User or book not found")
    )
)]
pub async fn already_borrowed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path((user_id, book_id)): Path<(i64, i64)>,
) -> AppResult<Json<AlreadyBorrowedResponse>> {
    let already_borrowed = state
        .services
        .circulation
        .already_borrowed(user_id, book_id)
        .await?;
    Ok(Json(AlreadyBorrowedResponse { already_borrowed }))
}
