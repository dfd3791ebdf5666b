//! Service Container - Centralized service access.
//!
//! Handlers reach the services through [`ServiceContainer`] so the
//! implementations behind it can be swapped in tests.

use std::sync::Arc;

use super::{AuthService, Authenticator, UserManager, UserService};
use crate::config::Config;
use crate::infra::{Persistence, UnitOfWork};
use crate::jobs::EmailQueue;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// The services the HTTP layer needs.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;
}

/// Authentication and user services sharing one unit of work.
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
}

impl Services {
    /// Wrap already built services.
    pub fn new(auth_service: Arc<dyn AuthService>, user_service: Arc<dyn UserService>) -> Self {
        Self {
            auth_service,
            user_service,
        }
    }

    /// Production services over the Postgres repositories.
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: Config,
        mailer: Arc<dyn EmailQueue>,
    ) -> Self {
        Self::from_unit(Arc::new(Persistence::new(db)), config, mailer)
    }

    /// Services over any repository set.
    pub fn from_unit<U: UnitOfWork + 'static>(
        uow: Arc<U>,
        config: Config,
        mailer: Arc<dyn EmailQueue>,
    ) -> Self {
        Self::new(
            Arc::new(Authenticator::new(uow.clone(), config, mailer)),
            Arc::new(UserManager::new(uow)),
        )
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }
}
