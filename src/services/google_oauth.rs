//! Google sign-in over OAuth 2.0.
//!
//! The authorization-code flow runs through the `oauth2` crate; the profile
//! is read from Google's OpenID Connect userinfo endpoint.

use async_trait::async_trait;
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenResponse, TokenUrl,
};
use serde::Deserialize;

use crate::config::{GoogleConfig, GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL, GOOGLE_USERINFO_URL};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const GOOGLE_SCOPES: [&str; 3] = ["openid", "email", "profile"];

/// Identity returned by Google after a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleProfile {
    pub google_id: String,
    pub email: String,
    pub name: String,
}

/// External identity provider used by the login redirect and callback.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Consent page URL carrying `state` for CSRF protection.
    fn authorize_url(&self, state: &str) -> String;

    /// Trade an authorization code for the user's profile.
    async fn exchange_code(&self, code: &str) -> AppResult<GoogleProfile>;
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    name: Option<String>,
}

impl GoogleUserInfo {
    fn into_profile(self) -> AppResult<GoogleProfile> {
        let email = self
            .email
            .filter(|_| self.email_verified)
            .ok_or_else(|| AppError::oauth("Google account has no verified email"))?
            .trim()
            .to_lowercase();

        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

        Ok(GoogleProfile {
            google_id: self.sub,
            email,
            name,
        })
    }
}

/// Google OAuth client
pub struct GoogleOAuth {
    client: BasicClient,
    http: reqwest::Client,
}

impl GoogleOAuth {
    /// Build the client, or `None` when credentials are not configured.
    pub fn from_config(config: &GoogleConfig) -> AppResult<Option<Self>> {
        let Some((client_id, client_secret)) = config.credentials() else {
            tracing::info!("Google OAuth not configured; Google login disabled");
            return Ok(None);
        };

        Self::new(client_id, client_secret, &config.callback_url).map(Some)
    }

    pub fn new(client_id: &str, client_secret: &str, callback_url: &str) -> AppResult<Self> {
        let client = BasicClient::new(
            ClientId::new(client_id.to_owned()),
            Some(ClientSecret::new(client_secret.to_owned())),
            AuthUrl::new(GOOGLE_AUTH_URL.to_string())
                .map_err(|e| AppError::internal(format!("invalid google auth url: {}", e)))?,
            Some(
                TokenUrl::new(GOOGLE_TOKEN_URL.to_string())
                    .map_err(|e| AppError::internal(format!("invalid google token url: {}", e)))?,
            ),
        )
        .set_redirect_uri(
            RedirectUrl::new(callback_url.to_owned())
                .map_err(|e| AppError::internal(format!("invalid google callback url: {}", e)))?,
        );

        let http = reqwest::Client::builder()
            .user_agent("robot-cleaner-api")
            .build()
            .map_err(|e| AppError::internal(format!("failed to build http client: {}", e)))?;

        Ok(Self { client, http })
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuth {
    fn authorize_url(&self, state: &str) -> String {
        let (url, _) = self
            .client
            .authorize_url(|| CsrfToken::new(state.to_owned()))
            .add_scopes(GOOGLE_SCOPES.iter().map(|s| Scope::new(s.to_string())))
            .add_extra_param("prompt", "select_account")
            .url();

        url.to_string()
    }

    async fn exchange_code(&self, code: &str) -> AppResult<GoogleProfile> {
        let token_response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_owned()))
            .request_async(async_http_client)
            .await
            .map_err(|e| AppError::oauth(format!("failed to exchange google code: {}", e)))?;

        let info: GoogleUserInfo = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(token_response.access_token().secret())
            .send()
            .await
            .map_err(|e| AppError::oauth(format!("failed to call google userinfo: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::oauth(format!("google userinfo returned error: {}", e)))?
            .json()
            .await
            .map_err(|e| AppError::oauth(format!("failed to decode google userinfo: {}", e)))?;

        tracing::debug!(google_id = %info.sub, "Fetched Google profile");

        info.into_profile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleOAuth {
        GoogleOAuth::new(
            "client-id.apps.googleusercontent.com",
            "client-secret",
            "http://localhost:5002/api/auth/google/callback",
        )
        .unwrap()
    }

    #[test]
    fn test_authorize_url_carries_state_scopes_and_prompt() {
        let url = client().authorize_url("state-123");

        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("state=state-123"));
        assert!(url.contains("scope=openid+email+profile"));
        assert!(url.contains("prompt=select_account"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=client-id.apps.googleusercontent.com"));
    }

    #[test]
    fn test_disabled_without_credentials() {
        let config = GoogleConfig::new(None, None, "http://localhost/cb".to_string());
        assert!(GoogleOAuth::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_userinfo_normalizes_email_and_defaults_name() {
        let info = GoogleUserInfo {
            sub: "1234".to_string(),
            email: Some(" Maria@Example.com ".to_string()),
            email_verified: true,
            name: None,
        };

        let profile = info.into_profile().unwrap();
        assert_eq!(profile.google_id, "1234");
        assert_eq!(profile.email, "maria@example.com");
        assert_eq!(profile.name, "maria");
    }

    #[test]
    fn test_userinfo_requires_verified_email() {
        let info = GoogleUserInfo {
            sub: "1234".to_string(),
            email: Some("maria@example.com".to_string()),
            email_verified: false,
            name: Some("Maria".to_string()),
        };

        assert!(matches!(info.into_profile(), Err(AppError::OAuth(_))));
    }
}
