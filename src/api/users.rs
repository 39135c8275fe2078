//! Account, authentication and credential-recovery endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{LoginRequest, RegisterRequest, Role, User},
};

use super::AuthenticatedUser;

/// Login response carrying the bearer token
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub email: String,
    pub role: Role,
    pub user_id: i64,
}

/// Plain confirmation message
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Mobile-number query
#[derive(Deserialize, IntoParams)]
pub struct MobileQuery {
    pub mobile: String,
}

/// OTP request payload
#[derive(Deserialize, ToSchema)]
pub struct OtpRequest {
    pub mobile: String,
}

/// OTP verification payload
#[derive(Deserialize, ToSchema)]
pub struct VerifyOtpRequest {
    pub mobile: String,
    pub otp: String,
}

/// OTP verification outcome
#[derive(Serialize, ToSchema)]
pub struct VerifyOtpResponse {
    pub valid: bool,
}

/// Password reset payload
#[derive(Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub mobile: String,
    pub new_password: String,
}

/// Admin-existence probe response
#[derive(Serialize, ToSchema)]
pub struct AdminExistsResponse {
    pub exists: bool,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email or mobile already registered")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state.services.users.register(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticate and obtain a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state
        .services
        .users
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        email: user.email,
        role: user.role,
        user_id: user.id,
    }))
}

/// Authenticate an administrator
#[utoipa::path(
    post,
    path = "/auth/admin/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid admin credentials")
    )
)]
pub async fn admin_login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state
        .services
        .users
        .login_with_role(&request.email, &request.password, Role::Admin)
        .await?;

    Ok(Json(LoginResponse {
        token,
        email: user.email,
        role: user.role,
        user_id: user.id,
    }))
}

/// Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Invalid or expired token")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<User>> {
    let user = state.services.users.get(claims.user_id).await?;
    Ok(Json(user))
}

/// Validate a bearer token
#[utoipa::path(
    get,
    path = "/auth/validate",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Token is valid", body = MessageResponse),
        (status = 401, description = "Invalid or expired token")
    )
)]
pub async fn validate_token(
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Token is valid".to_string(),
    })
}

/// Send a password-recovery OTP to a registered mobile number
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    tag = "auth",
    request_body = OtpRequest,
    responses(
        (status = 200, description = "OTP sent", body = MessageResponse),
        (status = 404, description = "Mobile number not registered"),
        (status = 502, description = "SMS dispatch failed")
    )
)]
pub async fn forgot_password(
    State(state): State<crate::AppState>,
    Json(request): Json<OtpRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.services.recovery.request_otp(&request.mobile).await?;
    Ok(Json(MessageResponse {
        message: "OTP sent successfully".to_string(),
    }))
}

/// Verify a password-recovery OTP
#[utoipa::path(
    post,
    path = "/auth/verify-otp",
    tag = "auth",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Verification outcome", body = VerifyOtpResponse)
    )
)]
pub async fn verify_otp(
    State(state): State<crate::AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> AppResult<Json<VerifyOtpResponse>> {
    let valid = state
        .services
        .recovery
        .verify_otp(&request.mobile, &request.otp)
        .await?;
    Ok(Json(VerifyOtpResponse { valid }))
}

/// Reset a password after OTP verification
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    tag = "auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 404, description = "Mobile number not registered")
    )
)]
pub async fn reset_password(
    State(state): State<crate::AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .services
        .recovery
        .reset_password(&request.mobile, &request.new_password)
        .await?;
    Ok(Json(MessageResponse {
        message: "Password reset successfully".to_string(),
    }))
}

/// Look up a user by mobile number
#[utoipa::path(
    get,
    path = "/users/by-mobile",
    tag = "users",
    security(("bearer_auth" = [])),
    params(MobileQuery),
    responses(
        (status = 200, description = "The user", body = User),
        (status = 404, description = "Mobile number not registered")
    )
)]
pub async fn get_user_by_mobile(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<MobileQuery>,
) -> AppResult<Json<User>> {
    let user = state.services.users.find_by_mobile(&query.mobile).await?;
    Ok(Json(user))
}

/// Whether an admin account exists yet
#[utoipa::path(
    get,
    path = "/users/admin-exists",
    tag = "users",
    responses(
        (status = 200, description = "Probe result", body = AdminExistsResponse)
    )
)]
pub async fn admin_exists(
    State(state): State<crate::AppState>,
) -> AppResult<Json<AdminExistsResponse>> {
    let exists = state.services.users.admin_exists().await?;
    Ok(Json(AdminExistsResponse { exists }))
}
