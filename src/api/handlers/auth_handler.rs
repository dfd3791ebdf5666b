//! Authentication handlers: credentials in, token out.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Json, Response},
    routing::{patch, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::send_token;
use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::errors::AppResult;
use crate::types::{ApiResponse, AuthResponse};

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// User display name
    #[serde(default)]
    #[schema(example = "Maria Silva")]
    pub name: String,
    /// User email address
    #[serde(default)]
    #[validate(email(message = "Please provide a valid email"))]
    #[schema(example = "maria@example.com")]
    pub email: String,
    /// Password (minimum 6 characters)
    #[serde(default)]
    #[schema(example = "secret123", min_length = 6)]
    pub password: String,
    /// Must equal `password`
    #[serde(default)]
    #[schema(example = "secret123")]
    pub password_confirm: String,
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(example = "maria@example.com")]
    pub email: String,
    #[serde(default)]
    #[schema(example = "secret123")]
    pub password: String,
}

/// Forgot password request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Please provide a valid email"))]
    #[schema(example = "maria@example.com")]
    pub email: String,
}

/// Reset password request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[schema(example = "newsecret", min_length = 6)]
    pub password: String,
    #[schema(example = "newsecret")]
    pub password_confirm: String,
}

/// Create authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password/:token", patch(reset_password))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered; token also set as `jwt` cookie", body = AuthResponse),
        (status = 400, description = "Missing fields, invalid email or passwords do not match"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Response> {
    let session = state
        .auth_service
        .register(
            payload.name,
            payload.email,
            payload.password,
            payload.password_confirm,
        )
        .await?;

    Ok(send_token(&state, StatusCode::CREATED, session))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful; token also set as `jwt` cookie", body = AuthResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Incorrect email or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Response> {
    let session = state
        .auth_service
        .login(payload.email, payload.password)
        .await?;

    Ok(send_token(&state, StatusCode::OK, session))
}

/// Request a password reset link by email
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "Authentication",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent if the email is registered"),
        (status = 400, description = "Invalid email")
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ForgotPasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.auth_service.forgot_password(payload.email).await?;

    Ok(Json(ApiResponse::message(
        "If that email is registered, a reset link has been sent",
    )))
}

/// Set a new password with a reset token
#[utoipa::path(
    patch,
    path = "/api/auth/reset-password/{token}",
    tag = "Authentication",
    params(("token" = String, Path, description = "Token from the reset email")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset; token also set as `jwt` cookie", body = AuthResponse),
        (status = 400, description = "Token invalid or expired, or passwords do not match")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<Response> {
    let session = state
        .auth_service
        .reset_password(token, payload.password, payload.password_confirm)
        .await?;

    Ok(send_token(&state, StatusCode::OK, session))
}
