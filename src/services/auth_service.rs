//! Authentication service - Handles user authentication and authorization.
//!
//! Issues and verifies the JWTs carried in the `jwt` cookie or the
//! `Authorization: Bearer` header, and owns every flow that changes a
//! user's credentials: registration, password login, Google login,
//! password change and the forgot/reset password cycle.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::GoogleProfile;
use crate::config::{Config, FRONTEND_RESET_PASSWORD_PATH};
use crate::domain::{NewUser, Password, ResetToken, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::jobs::{EmailJob, EmailQueue};

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// A signed-in user and the token that proves it
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user with email and password
    async fn register(
        &self,
        name: String,
        email: String,
        password: String,
        password_confirm: String,
    ) -> AppResult<AuthSession>;

    /// Login with email and password
    async fn login(&self, email: String, password: String) -> AppResult<AuthSession>;

    /// Sign in (or sign up) with a Google profile
    async fn google_login(&self, profile: GoogleProfile) -> AppResult<AuthSession>;

    /// Resolve a token to its still-valid user
    async fn authenticate(&self, token: &str) -> AppResult<User>;

    /// Change the password of a signed-in user
    async fn change_password(
        &self,
        user_id: Uuid,
        current_password: Option<String>,
        new_password: String,
    ) -> AppResult<AuthSession>;

    /// Email a reset link if the address belongs to a user
    async fn forgot_password(&self, email: String) -> AppResult<()>;

    /// Set a new password using a reset token
    async fn reset_password(
        &self,
        token: String,
        password: String,
        password_confirm: String,
    ) -> AppResult<AuthSession>;

    /// Sign a token for a user
    fn issue_token(&self, user: &User) -> AppResult<String>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Generate JWT token for a user
fn generate_token(user: &User, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        role: user.role.to_string(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?)
}

fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn require(field: &str) -> AppResult<&str> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request("Please fill in all fields"));
    }
    Ok(trimmed)
}

fn ensure_match(password: &str, password_confirm: &str) -> AppResult<()> {
    if password != password_confirm {
        return Err(AppError::bad_request("Passwords do not match"));
    }
    Ok(())
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
    mailer: Arc<dyn EmailQueue>,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config, mailer: Arc<dyn EmailQueue>) -> Self {
        Self {
            uow,
            config,
            mailer,
        }
    }

    fn session(&self, user: User) -> AppResult<AuthSession> {
        let token = generate_token(&user, &self.config)?;
        Ok(AuthSession { user, token })
    }

    fn reset_url(&self, raw_token: &str) -> String {
        format!(
            "{}{}/{}",
            self.config.frontend_url, FRONTEND_RESET_PASSWORD_PATH, raw_token
        )
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(
        &self,
        name: String,
        email: String,
        password: String,
        password_confirm: String,
    ) -> AppResult<AuthSession> {
        let name = require(&name)?.to_string();
        let email = normalize_email(require(&email)?);
        require(&password)?;
        require(&password_confirm)?;
        ensure_match(&password, &password_confirm)?;

        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Email"));
        }

        let password_hash = Password::new(&password)?.into_string();
        let user = self
            .uow
            .users()
            .create(NewUser::local(name, email, password_hash))
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        self.session(user)
    }

    async fn login(&self, email: String, password: String) -> AppResult<AuthSession> {
        let email = normalize_email(require(&email)?);
        require(&password)?;

        let user = self.uow.users().find_by_email(&email).await?;

        // Verify against a throwaway hash when there is nothing to check, so
        // unknown emails cost as much as wrong passwords.
        let verified = match user.as_ref().and_then(|u| u.password_hash.clone()) {
            Some(hash) => Password::from_hash(hash).verify(&password),
            None => Password::verify_dummy(&password),
        };

        match user {
            Some(user) if verified => {
                tracing::debug!(user_id = %user.id, "Password login succeeded");
                self.session(user)
            }
            _ => Err(AppError::InvalidCredentials),
        }
    }

    async fn google_login(&self, profile: GoogleProfile) -> AppResult<AuthSession> {
        let email = normalize_email(&profile.email);
        let users = self.uow.users();

        let user = match users.find_by_email(&email).await? {
            Some(user) if user.google_id.is_some() => user,
            Some(user) => {
                tracing::info!(user_id = %user.id, "Linking Google account to existing user");
                users.link_google(user.id, profile.google_id).await?
            }
            None => {
                let user = users
                    .create(NewUser::google(profile.name, email, profile.google_id))
                    .await?;
                tracing::info!(user_id = %user.id, "User registered with Google");
                user
            }
        };

        self.session(user)
    }

    async fn authenticate(&self, token: &str) -> AppResult<User> {
        let claims = self.verify_token(token)?;

        let user = self
            .uow
            .users()
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::TokenUserGone)?;

        if user.changed_password_after(claims.iat) {
            return Err(AppError::PasswordChanged);
        }

        Ok(user)
    }

    async fn change_password(
        &self,
        user_id: Uuid,
        current_password: Option<String>,
        new_password: String,
    ) -> AppResult<AuthSession> {
        let users = self.uow.users();
        let user = users.find_by_id(user_id).await?.ok_or(AppError::NotFound)?;

        // Accounts created through Google may set a first password freely
        if let Some(hash) = user.password_hash {
            let current = current_password.unwrap_or_default();
            if !Password::from_hash(hash).verify(&current) {
                return Err(AppError::InvalidCredentials);
            }
        }

        let password_hash = Password::new(&new_password)?.into_string();
        let user = users.set_password(user_id, password_hash).await?;

        tracing::info!(user_id = %user.id, "Password changed");
        self.session(user)
    }

    async fn forgot_password(&self, email: String) -> AppResult<()> {
        let email = normalize_email(require(&email)?);
        let users = self.uow.users();

        let Some(user) = users.find_by_email(&email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = ResetToken::issue(Utc::now());
        users
            .set_reset_token(user.id, token.hashed().to_string(), token.expires_at())
            .await?;

        let job = EmailJob::password_reset(&user.email, &user.name, &self.reset_url(token.raw()));
        if let Err(e) = self.mailer.enqueue(job).await {
            tracing::error!(user_id = %user.id, error = %e, "Could not queue reset email");
            // A link nobody received must not stay usable
            if let Err(e) = users.clear_reset_token(user.id).await {
                tracing::error!(user_id = %user.id, error = %e, "Could not clear reset token");
            }
        }

        Ok(())
    }

    async fn reset_password(
        &self,
        token: String,
        password: String,
        password_confirm: String,
    ) -> AppResult<AuthSession> {
        let users = self.uow.users();
        let user = users
            .find_by_reset_token(&ResetToken::digest(token.trim()))
            .await?
            .filter(|u| u.reset_token_active(Utc::now()))
            .ok_or(AppError::InvalidResetToken)?;

        ensure_match(&password, &password_confirm)?;

        let password_hash = Password::new(&password)?.into_string();
        let user = users.set_password(user.id, password_hash).await?;

        tracing::info!(user_id = %user.id, "Password reset");
        self.session(user)
    }

    fn issue_token(&self, user: &User) -> AppResult<String> {
        generate_token(user, &self.config)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }
}
