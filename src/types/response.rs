//! Response envelopes shared by the handlers.
//!
//! Every body carries `status: "success"`; failures use the
//! `{"status":"fail"|"error"}` envelope from [`crate::errors`].

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::UserResponse;

const STATUS_SUCCESS: &str = "success";

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: STATUS_SUCCESS,
            data: Some(data),
            message: None,
        }
    }
}

impl ApiResponse<()> {
    /// Bare `{"status":"success"}`
    pub fn ok() -> Self {
        Self {
            status: STATUS_SUCCESS,
            data: None,
            message: None,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_SUCCESS,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// `{"user": ...}` payload
#[derive(Debug, Serialize, ToSchema)]
pub struct UserData {
    pub user: UserResponse,
}

impl UserData {
    pub fn new(user: impl Into<UserResponse>) -> Self {
        Self { user: user.into() }
    }
}

/// Envelope returned whenever a token is issued
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    #[schema(value_type = String, example = "success")]
    pub status: &'static str,
    /// JWT, also set as the `jwt` cookie
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    pub data: UserData,
}

impl AuthResponse {
    pub fn new(token: String, user: impl Into<UserResponse>) -> Self {
        Self {
            status: STATUS_SUCCESS,
            token,
            data: UserData::new(user),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_is_bare_status() {
        let json = serde_json::to_value(ApiResponse::ok()).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "success" }));
    }

    #[test]
    fn test_message_envelope() {
        let json = serde_json::to_value(ApiResponse::message("sent")).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "sent");
        assert!(json.get("data").is_none());
    }
}
