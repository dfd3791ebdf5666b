//! Application route configuration.

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    account_routes, auth_routes, google_callback_routes, google_routes, session_routes,
    user_routes,
};
use super::middleware::{
    auth_middleware, rate_limit_auth_middleware, rate_limit_middleware, require_admin,
};
use super::openapi::ApiDoc;
use super::AppState;
use crate::errors::AppResult;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.frontend_url);

    Router::new()
        .route("/", get(root))
        .nest("/api", api_routes(&state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes(state: &AppState) -> Router<AppState> {
    // Login forms and the Google redirect share the strict limiter
    let credentials = auth_routes().merge(google_routes()).route_layer(
        middleware::from_fn_with_state(state.clone(), rate_limit_auth_middleware),
    );

    let account = account_routes()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let users = user_routes()
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .nest(
            "/auth",
            credentials
                .merge(session_routes())
                .merge(google_callback_routes())
                .merge(account),
        )
        .nest("/users", users)
}

/// Only the storefront may call the API with credentials.
fn cors_layer(frontend_url: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    match frontend_url.trim_end_matches('/').parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            tracing::warn!(frontend_url, error = %e, "FRONTEND_URL is not a valid origin; CORS disabled");
            cors
        }
    }
}

/// Root endpoint
async fn root() -> &'static str {
    "ROBOT Cleaner API"
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

/// Individual service health status
#[derive(Serialize)]
struct ServiceHealth {
    database: ServiceStatus,
    redis: ServiceStatus,
}

/// Service status
#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<AppResult<()>> for ServiceStatus {
    fn from(result: AppResult<()>) -> Self {
        match result {
            Ok(()) => Self {
                status: "healthy",
                error: None,
            },
            Err(e) => Self {
                status: "unhealthy",
                error: Some(e.to_string()),
            },
        }
    }
}

/// Health check endpoint with database and Redis connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = ServiceStatus::from(state.database.ping().await);
    let redis = ServiceStatus::from(state.cache.ping().await);

    let all_healthy = database.error.is_none() && redis.error.is_none();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" },
        services: ServiceHealth { database, redis },
    };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
