//! HTTP request handlers.

pub mod account_handler;
pub mod auth_handler;
pub mod google_handler;
pub mod user_handler;

pub use account_handler::{account_routes, session_routes};
pub use auth_handler::auth_routes;
pub use google_handler::{google_callback_routes, google_routes};
pub use user_handler::user_routes;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::api::AppState;
use crate::services::AuthSession;
use crate::types::AuthResponse;

/// Token envelope plus the `jwt` cookie.
pub(crate) fn send_token(state: &AppState, status: StatusCode, session: AuthSession) -> Response {
    let mut headers = HeaderMap::new();
    state.cookies.add_session(&mut headers, &session.token);

    (
        status,
        headers,
        Json(AuthResponse::new(session.token, session.user)),
    )
        .into_response()
}
