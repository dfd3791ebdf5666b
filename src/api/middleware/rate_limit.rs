//! Rate limiting middleware using Redis cache.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::net::SocketAddr;

use crate::api::AppState;
use crate::config::{
    RATE_LIMIT_AUTH_REQUESTS, RATE_LIMIT_AUTH_WINDOW_SECONDS, RATE_LIMIT_REQUESTS,
    RATE_LIMIT_WINDOW_SECONDS,
};

/// Rate limit error response
#[derive(Debug)]
pub struct RateLimitError {
    pub retry_after: u64,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert("Retry-After", HeaderValue::from(self.retry_after));
        headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));

        (
            StatusCode::TOO_MANY_REQUESTS,
            headers,
            Json(json!({
                "status": "fail",
                "code": "RATE_LIMITED",
                "message": "Too many requests. Please try again later.",
            })),
        )
            .into_response()
    }
}

/// Extract client identifier for rate limiting.
///
/// Proxy headers are only read when `trust_proxy` is set; otherwise any
/// caller could pick its own bucket. Falls back to the connection IP.
fn get_client_identifier(request: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(forwarded) = request
            .headers()
            .get("X-Forwarded-For")
            .and_then(|h| h.to_str().ok())
        {
            // First IP in the chain is the original client
            if let Some(ip) = forwarded.split(',').next() {
                return ip.trim().to_string();
            }
        }

        if let Some(real_ip) = request
            .headers()
            .get("X-Real-IP")
            .and_then(|h| h.to_str().ok())
        {
            return real_ip.to_string();
        }
    }

    if let Some(connect_info) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return connect_info.0.ip().to_string();
    }

    "unknown".to_string()
}

async fn enforce(
    state: &AppState,
    request: Request,
    next: Next,
    scope: &str,
    max_requests: u64,
    window_seconds: u64,
) -> Result<Response, RateLimitError> {
    let client_id = get_client_identifier(&request, state.trust_proxy);
    let key = format!("{}:{}", scope, client_id);

    let (count, allowed) = match state
        .cache
        .check_rate_limit(&key, max_requests, window_seconds)
        .await
    {
        Ok(result) => result,
        Err(e) => {
            // Fail closed: no counter, no request
            tracing::error!(error = %e, scope, "Rate limit check failed - denying request");
            return Err(RateLimitError {
                retry_after: window_seconds,
            });
        }
    };

    if !allowed {
        tracing::warn!(client = %client_id, count, scope, "Rate limit exceeded");
        return Err(RateLimitError {
            retry_after: window_seconds,
        });
    }

    let mut response = next.run(request).await;

    let remaining = max_requests.saturating_sub(count);
    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", HeaderValue::from(max_requests));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(remaining));

    Ok(response)
}

/// General rate limiting middleware.
/// Limits requests to RATE_LIMIT_REQUESTS per RATE_LIMIT_WINDOW_SECONDS.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    enforce(
        &state,
        request,
        next,
        "general",
        RATE_LIMIT_REQUESTS,
        RATE_LIMIT_WINDOW_SECONDS,
    )
    .await
}

/// Stricter rate limiting for authentication endpoints.
/// Limits requests to RATE_LIMIT_AUTH_REQUESTS per RATE_LIMIT_AUTH_WINDOW_SECONDS.
pub async fn rate_limit_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    enforce(
        &state,
        request,
        next,
        "auth",
        RATE_LIMIT_AUTH_REQUESTS,
        RATE_LIMIT_AUTH_WINDOW_SECONDS,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_rate_limit_error_response() {
        let error = RateLimitError { retry_after: 60 };
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["Retry-After"], "60");
    }

    fn forwarded_request() -> Request {
        let mut request = axum::http::Request::builder()
            .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
            .header("X-Real-IP", "10.0.0.2")
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 5555))));
        request
    }

    #[test]
    fn test_client_identifier_behind_trusted_proxy() {
        assert_eq!(get_client_identifier(&forwarded_request(), true), "203.0.113.7");
    }

    #[test]
    fn test_client_identifier_ignores_spoofed_headers() {
        assert_eq!(get_client_identifier(&forwarded_request(), false), "192.0.2.1");
    }

    #[test]
    fn test_client_identifier_without_connect_info() {
        let request = axum::http::Request::builder().body(Body::empty()).unwrap();
        assert_eq!(get_client_identifier(&request, false), "unknown");
    }
}
