//! Service layer - Application use cases
//!
//! Services orchestrate the domain and the repositories. Each one is
//! exposed as a trait so the HTTP layer can be tested against fakes.

mod auth_service;
mod container;
mod google_oauth;
mod user_service;

pub use auth_service::{AuthService, AuthSession, Authenticator, Claims};
pub use container::{ServiceContainer, Services};
pub use google_oauth::{GoogleOAuth, GoogleProfile, OAuthProvider};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use google_oauth::MockOAuthProvider;
