//! Google login: redirect to the consent screen, then handle the callback.
//!
//! The callback always answers with a redirect back to the SPA, carrying
//! the token on success and an error flag otherwise.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use oauth2::CsrfToken;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::AppState;
use crate::config::{
    FRONTEND_AUTH_FAILURE_PATH, FRONTEND_AUTH_SUCCESS_PATH, OAUTH_STATE_TTL_SECONDS,
    SESSION_PREFIX_OAUTH_STATE,
};
use crate::errors::{AppError, AppResult};
use crate::services::AuthSession;

/// Query string Google sends back to the callback
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackParams {
    /// Authorization code
    pub code: Option<String>,
    /// CSRF state issued by `/auth/google`
    pub state: Option<String>,
    /// Set when the user cancelled or Google refused
    pub error: Option<String>,
}

/// Google login routes
pub fn google_routes() -> Router<AppState> {
    Router::new().route("/google", get(google_redirect))
}

/// Callback route, kept separate so it is not rate limited with the login forms
pub fn google_callback_routes() -> Router<AppState> {
    Router::new().route("/google/callback", get(google_callback))
}

fn state_key(csrf: &str) -> String {
    format!("{}{}", SESSION_PREFIX_OAUTH_STATE, csrf)
}

/// Start Google login
#[utoipa::path(
    get,
    path = "/api/auth/google",
    tag = "Authentication",
    responses(
        (status = 303, description = "Redirect to Google's consent screen"),
        (status = 503, description = "Google login is not configured")
    )
)]
pub async fn google_redirect(State(state): State<AppState>) -> AppResult<Redirect> {
    let oauth = state.oauth.as_ref().ok_or(AppError::OAuthDisabled)?;

    let csrf = CsrfToken::new_random();
    state
        .cache
        .set_session(&state_key(csrf.secret()), "1", OAUTH_STATE_TTL_SECONDS)
        .await?;

    Ok(Redirect::to(&oauth.authorize_url(csrf.secret())))
}

/// Finish Google login
#[utoipa::path(
    get,
    path = "/api/auth/google/callback",
    tag = "Authentication",
    params(CallbackParams),
    responses(
        (status = 303, description = "Redirect to the SPA: `/auth/success?token=...` with the `jwt` cookie, or `/login?error=google-auth`")
    )
)]
pub async fn google_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    match complete_login(&state, params).await {
        Ok(session) => {
            let mut headers = HeaderMap::new();
            state.cookies.add_session(&mut headers, &session.token);

            let target = format!(
                "{}{}?token={}",
                state.frontend_url, FRONTEND_AUTH_SUCCESS_PATH, session.token
            );
            (headers, Redirect::to(&target)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Google login failed");
            let target = format!("{}{}", state.frontend_url, FRONTEND_AUTH_FAILURE_PATH);
            Redirect::to(&target).into_response()
        }
    }
}

async fn complete_login(state: &AppState, params: CallbackParams) -> AppResult<AuthSession> {
    let oauth = state.oauth.as_ref().ok_or(AppError::OAuthDisabled)?;

    if let Some(error) = params.error {
        return Err(AppError::oauth(format!("provider returned {}", error)));
    }

    let csrf = params
        .state
        .ok_or_else(|| AppError::bad_request("missing state"))?;
    state
        .cache
        .take_session(&state_key(&csrf))
        .await?
        .ok_or_else(|| AppError::bad_request("unknown or expired state"))?;

    let code = params
        .code
        .ok_or_else(|| AppError::bad_request("missing code"))?;
    let profile = oauth.exchange_code(&code).await?;

    state.auth_service.google_login(profile).await
}
