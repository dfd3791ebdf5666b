//! `jwt` cookie handling.
//!
//! The session token lives in an httpOnly cookie for the browser and is
//! also accepted as an `Authorization: Bearer` header for API clients.

use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue};
use axum_extra::headers::{authorization::Bearer, Authorization, Cookie, HeaderMapExt};

use crate::config::{
    Config, JWT_COOKIE_NAME, LOGGED_OUT_COOKIE_SECONDS, LOGGED_OUT_COOKIE_VALUE,
};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Builds the Set-Cookie values for the session token.
#[derive(Debug, Clone)]
pub struct AuthCookies {
    secure: bool,
    max_age_seconds: i64,
}

impl AuthCookies {
    pub fn new(secure: bool, max_age_days: i64) -> Self {
        Self {
            secure,
            max_age_seconds: max_age_days * SECONDS_PER_DAY,
        }
    }

    /// Secure cookies in production, lifetime from `JWT_COOKIE_EXPIRES_IN_DAYS`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.is_production(), config.jwt_cookie_expiration_days)
    }

    /// Set-Cookie value carrying a fresh token.
    pub fn session_cookie(&self, token: &str) -> String {
        self.build_cookie(token, self.max_age_seconds)
    }

    /// Set-Cookie value that overwrites the token with a short-lived placeholder.
    pub fn logout_cookie(&self) -> String {
        self.build_cookie(LOGGED_OUT_COOKIE_VALUE, LOGGED_OUT_COOKIE_SECONDS)
    }

    /// Append the session cookie to a header map.
    pub fn add_session(&self, headers: &mut HeaderMap, token: &str) {
        if let Ok(value) = HeaderValue::from_str(&self.session_cookie(token)) {
            headers.append(SET_COOKIE, value);
        }
    }

    /// Append the logout cookie to a header map.
    pub fn add_logout(&self, headers: &mut HeaderMap) {
        if let Ok(value) = HeaderValue::from_str(&self.logout_cookie()) {
            headers.append(SET_COOKIE, value);
        }
    }

    fn build_cookie(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Strict",
            JWT_COOKIE_NAME, value, max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Token from the Bearer header, falling back to the `jwt` cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }

    headers
        .typed_get::<Cookie>()
        .and_then(|cookie| cookie.get(JWT_COOKIE_NAME).map(str::to_string))
        .filter(|token| !token.is_empty() && token != LOGGED_OUT_COOKIE_VALUE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{AUTHORIZATION, COOKIE};

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = AuthCookies::new(false, 1).session_cookie("abc");
        assert_eq!(
            cookie,
            "jwt=abc; Path=/; Max-Age=86400; HttpOnly; SameSite=Strict"
        );
    }

    #[test]
    fn test_secure_flag_in_production() {
        let cookie = AuthCookies::new(true, 7).session_cookie("abc");
        assert!(cookie.contains("Max-Age=604800"));
        assert!(cookie.ends_with("; Secure"));
    }

    #[test]
    fn test_logout_cookie() {
        let cookie = AuthCookies::new(false, 1).logout_cookie();
        assert!(cookie.starts_with("jwt=loggedout;"));
        assert!(cookie.contains("Max-Age=10"));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn test_extract_prefers_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(COOKIE, HeaderValue::from_static("jwt=from-cookie"));

        assert_eq!(extract_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_extract_falls_back_to_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; jwt=from-cookie"));

        assert_eq!(extract_token(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_extract_ignores_logged_out_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("jwt=loggedout"));

        assert!(extract_token(&headers).is_none());
        assert!(extract_token(&HeaderMap::new()).is_none());
    }
}
