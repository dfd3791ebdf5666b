//! Admin-only user management.

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};

use crate::api::AppState;
use crate::domain::UserResponse;
use crate::errors::AppResult;
use crate::types::{ApiResponse, Paginated, PaginationParams};

/// Routes mounted under `/users`, behind `protect` and the admin check
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/", get(list_users))
}

/// List users, newest first
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    params(PaginationParams),
    responses(
        (status = 200, description = "One page of users"),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<UserResponse>>>> {
    let page = state.user_service.list_users(params).await?;

    Ok(Json(ApiResponse::success(page.map(UserResponse::from))))
}
