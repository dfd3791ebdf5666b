//! Handlers for the signed-in user's own account.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::send_token;
use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::ProfileUpdate;
use crate::errors::AppResult;
use crate::types::{ApiResponse, AuthResponse, UserData};

/// Profile update request. Omitted fields are left unchanged.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name cannot be empty"),
        custom(function = "validate_not_blank")
    )]
    #[schema(example = "Maria Silva")]
    pub name: Option<String>,
    #[schema(example = "+55 11 99999-0000")]
    pub phone: Option<String>,
    #[schema(example = "Rua das Flores, 123")]
    pub address: Option<String>,
    #[schema(example = "34")]
    pub age: Option<String>,
    #[serde(rename = "photoURL")]
    #[validate(url(message = "Photo must be a URL"))]
    pub photo_url: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            name: req.name.map(|n| n.trim().to_string()),
            phone: req.phone,
            address: req.address,
            age: req.age,
            photo_url: req.photo_url,
        }
    }
}

fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut err = validator::ValidationError::new("blank");
        err.message = Some("Name cannot be empty".into());
        return Err(err);
    }
    Ok(())
}

/// Password change request.
///
/// The storefront posts `{currentPassword, newPassword}`; the longer form
/// with `passwordConfirm` is accepted too.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_password_confirm"))]
pub struct ChangePasswordRequest {
    /// Required unless the account was created through Google and has no password yet
    #[serde(alias = "currentPassword")]
    pub password_current: Option<String>,
    #[serde(alias = "newPassword")]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[schema(example = "newsecret", min_length = 6)]
    pub password: String,
    /// Checked against `password` when present
    #[schema(example = "newsecret")]
    pub password_confirm: Option<String>,
}

fn validate_password_confirm(req: &ChangePasswordRequest) -> Result<(), validator::ValidationError> {
    match req.password_confirm.as_deref() {
        Some(confirm) if confirm != req.password => {
            let mut err = validator::ValidationError::new("must_match");
            err.message = Some("Passwords do not match".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

/// Routes behind the `protect` middleware
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/validate", get(validate))
        .route("/update", put(update_profile))
        .route("/change-password", post(change_password))
        .route("/delete", delete(delete_account))
}

/// Session routes that need no token
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/logout", get(logout))
}

/// Get the signed-in user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Account",
    responses(
        (status = 200, description = "Current user", body = UserData),
        (status = 401, description = "Not logged in")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(Extension(current): Extension<CurrentUser>) -> Json<ApiResponse<UserData>> {
    Json(ApiResponse::success(UserData::new(current.user)))
}

/// Check that the token is still valid
#[utoipa::path(
    get,
    path = "/api/auth/validate",
    tag = "Account",
    responses(
        (status = 200, description = "Token is valid"),
        (status = 401, description = "Token missing, invalid or stale")
    ),
    security(("bearer_auth" = []))
)]
pub async fn validate(Extension(_current): Extension<CurrentUser>) -> Json<ApiResponse<()>> {
    Json(ApiResponse::ok())
}

/// Log out by overwriting the `jwt` cookie
#[utoipa::path(
    get,
    path = "/api/auth/logout",
    tag = "Account",
    responses((status = 200, description = "Cookie replaced with a short-lived placeholder"))
)]
pub async fn logout(State(state): State<AppState>) -> Response {
    let mut headers = HeaderMap::new();
    state.cookies.add_logout(&mut headers);
    (headers, Json(ApiResponse::ok())).into_response()
}

/// Update the signed-in user's profile
#[utoipa::path(
    put,
    path = "/api/auth/update",
    tag = "Account",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserData),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not logged in")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<UserData>>> {
    let user = state
        .user_service
        .update_profile(current.user.id, payload.into())
        .await?;

    Ok(Json(ApiResponse::success(UserData::new(user))))
}

/// Change the signed-in user's password
#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    tag = "Account",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed; a fresh token is issued", body = AuthResponse),
        (status = 400, description = "Password too short or passwords do not match"),
        (status = 401, description = "Current password is wrong")
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<Response> {
    let session = state
        .auth_service
        .change_password(current.user.id, payload.password_current, payload.password)
        .await?;

    Ok(send_token(&state, StatusCode::OK, session))
}

/// Delete the signed-in user's account
#[utoipa::path(
    delete,
    path = "/api/auth/delete",
    tag = "Account",
    responses(
        (status = 200, description = "Account deleted and cookie cleared"),
        (status = 401, description = "Not logged in")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Response> {
    state.user_service.delete_account(current.user.id).await?;

    let mut headers = HeaderMap::new();
    state.cookies.add_logout(&mut headers);
    Ok((headers, Json(ApiResponse::ok())).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_password_request_validation() {
        let ok = ChangePasswordRequest {
            password_current: Some("oldsecret".to_string()),
            password: "newsecret".to_string(),
            password_confirm: Some("newsecret".to_string()),
        };
        assert!(ok.validate().is_ok());

        let mismatch = ChangePasswordRequest {
            password_current: None,
            password: "newsecret".to_string(),
            password_confirm: Some("other".to_string()),
        };
        assert!(mismatch.validate().is_err());

        let short = ChangePasswordRequest {
            password_current: None,
            password: "abc".to_string(),
            password_confirm: None,
        };
        assert!(short.validate().is_err());
    }

    #[test]
    fn test_change_password_request_reads_storefront_keys() {
        let req: ChangePasswordRequest = serde_json::from_value(serde_json::json!({
            "currentPassword": "secret123",
            "newPassword": "newsecret"
        }))
        .unwrap();

        assert!(req.validate().is_ok());
        assert_eq!(req.password_current.as_deref(), Some("secret123"));
        assert_eq!(req.password, "newsecret");
        assert!(req.password_confirm.is_none());
    }

    #[test]
    fn test_update_request_reads_photo_url_key() {
        let req: UpdateProfileRequest = serde_json::from_value(serde_json::json!({
            "name": "  Maria  ",
            "photoURL": "https://cdn.example.com/me.png"
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        let update = ProfileUpdate::from(req);
        assert_eq!(update.name.as_deref(), Some("Maria"));
        assert_eq!(update.photo_url.as_deref(), Some("https://cdn.example.com/me.png"));
        assert!(update.phone.is_none());
    }

    #[test]
    fn test_update_request_rejects_empty_name() {
        let req: UpdateProfileRequest =
            serde_json::from_value(serde_json::json!({ "name": "" })).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_request_rejects_blank_name() {
        let req: UpdateProfileRequest =
            serde_json::from_value(serde_json::json!({ "name": "   " })).unwrap();
        assert!(req.validate().is_err());
    }
}
