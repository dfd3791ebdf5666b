//! JWT authentication middleware.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::api::cookies::extract_token;
use crate::api::AppState;
use crate::domain::User;
use crate::errors::AppError;

/// Authenticated user, inserted into request extensions by [`auth_middleware`]
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user: User,
}

impl CurrentUser {
    /// Check if user has admin role.
    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }
}

/// JWT authentication middleware.
///
/// Takes the token from the Authorization header or the `jwt` cookie,
/// resolves it to a live user and injects the CurrentUser into the
/// request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(request.headers()).ok_or(AppError::Unauthorized)?;

    let user = state.auth_service.authenticate(&token).await?;

    request.extensions_mut().insert(CurrentUser { user });

    Ok(next.run(request).await)
}

/// Reject non-admins. Must run after [`auth_middleware`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let current = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::Unauthorized)?;

    if !current.is_admin() {
        tracing::warn!(user_id = %current.user.id, "Admin route refused");
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}
