//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use super::cookies::AuthCookies;
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{CacheStore, Database, HealthCheck};
use crate::jobs::EmailQueue;
use crate::services::{
    AuthService, GoogleOAuth, OAuthProvider, ServiceContainer, Services, UserService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Google login; `None` when not configured
    pub oauth: Option<Arc<dyn OAuthProvider>>,
    /// Sessions and rate limits
    pub cache: Arc<dyn CacheStore>,
    /// Database liveness
    pub database: Arc<dyn HealthCheck>,
    pub cookies: AuthCookies,
    /// SPA origin, used for CORS and login redirects
    pub frontend_url: String,
    /// Key rate limits on proxy headers instead of the peer address
    pub trust_proxy: bool,
}

impl AppState {
    /// Wire the production services from live connections.
    pub fn from_config(
        database: Arc<Database>,
        cache: Arc<dyn CacheStore>,
        mailer: Arc<dyn EmailQueue>,
        config: Config,
    ) -> AppResult<Self> {
        let oauth = GoogleOAuth::from_config(&config.google)?
            .map(|google| Arc::new(google) as Arc<dyn OAuthProvider>);
        let container = Services::from_connection(database.get_connection(), config.clone(), mailer);

        let state = Self::new(&container, cache, database, &config);
        Ok(match oauth {
            Some(provider) => state.with_oauth(provider),
            None => state,
        })
    }

    /// Create application state with manually injected services.
    pub fn new(
        services: &dyn ServiceContainer,
        cache: Arc<dyn CacheStore>,
        database: Arc<dyn HealthCheck>,
        config: &Config,
    ) -> Self {
        Self {
            auth_service: services.auth(),
            user_service: services.users(),
            oauth: None,
            cache,
            database,
            cookies: AuthCookies::from_config(config),
            frontend_url: config.frontend_url.clone(),
            trust_proxy: config.trust_proxy,
        }
    }

    /// Enable Google login through the given provider.
    pub fn with_oauth(mut self, provider: Arc<dyn OAuthProvider>) -> Self {
        self.oauth = Some(provider);
        self
    }
}
