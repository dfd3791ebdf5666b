//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{ROLE_ADMIN, ROLE_USER};

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => UserRole::Admin,
            _ => UserRole::User,
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "{}", ROLE_ADMIN),
            UserRole::User => write!(f, "{}", ROLE_USER),
        }
    }
}

/// User domain entity
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string; `None` for accounts created through Google
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub is_verified: bool,
    pub role: UserRole,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub age: Option<String>,
    pub photo_url: Option<String>,
    pub password_changed_at: Option<DateTime<Utc>>,
    /// SHA-256 hex digest of the outstanding reset token
    pub password_reset_token: Option<String>,
    pub password_reset_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new, unverified local user with default role
    pub fn new(id: Uuid, name: String, email: String, password_hash: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            email,
            password_hash,
            google_id: None,
            is_verified: false,
            role: UserRole::User,
            phone: None,
            address: None,
            age: None,
            photo_url: None,
            password_changed_at: None,
            password_reset_token: None,
            password_reset_expires: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if user has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether the account can log in with a password
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Whether the password was changed after a token issued at `issued_at`
    /// (seconds since the epoch).
    pub fn changed_password_after(&self, issued_at: i64) -> bool {
        self.password_changed_at
            .map(|changed| issued_at < changed.timestamp())
            .unwrap_or(false)
    }

    /// Whether the outstanding reset token is still usable at `now`
    pub fn reset_token_active(&self, now: DateTime<Utc>) -> bool {
        self.password_reset_token.is_some()
            && self.password_reset_expires.map(|exp| exp > now).unwrap_or(false)
    }
}

/// Data for inserting a new user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub is_verified: bool,
}

impl NewUser {
    /// A user registering with email and password
    pub fn local(name: String, email: String, password_hash: String) -> Self {
        Self {
            name,
            email,
            password_hash: Some(password_hash),
            google_id: None,
            is_verified: false,
        }
    }

    /// A user created on first Google login; Google has verified the email
    pub fn google(name: String, email: String, google_id: String) -> Self {
        Self {
            name,
            email,
            password_hash: None,
            google_id: Some(google_id),
            is_verified: true,
        }
    }
}

/// Profile fields a user may edit. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub age: Option<String>,
    pub photo_url: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.age.is_none()
            && self.photo_url.is_none()
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// User display name
    #[schema(example = "Maria Silva")]
    pub name: String,
    /// User email address
    #[schema(example = "maria@example.com")]
    pub email: String,
    /// User role
    #[schema(example = "user")]
    pub role: String,
    /// Whether the email was verified (set by Google login)
    pub is_verified: bool,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub age: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    /// Login provider: `google` when the account is linked to Google
    #[schema(value_type = String, example = "manual")]
    pub provider: &'static str,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            provider: if user.google_id.is_some() { "google" } else { "manual" },
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role.to_string(),
            is_verified: user.is_verified,
            phone: user.phone,
            address: user.address,
            age: user.age,
            photo_url: user.photo_url,
            created_at: user.created_at,
        }
    }
}
