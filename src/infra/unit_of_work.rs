//! Unit of Work: single entry point to the repositories.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repositories::{UserRepository, UserStore};

/// Centralized repository access for the services.
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    user_repo: Arc<UserStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }
}

/// Unit of work over an arbitrary user repository, used by tests.
#[cfg(any(test, feature = "test-utils"))]
pub struct RepositoryUnit {
    users: Arc<dyn UserRepository>,
}

#[cfg(any(test, feature = "test-utils"))]
impl RepositoryUnit {
    pub fn new(users: impl UserRepository + 'static) -> Self {
        Self {
            users: Arc::new(users),
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl UnitOfWork for RepositoryUnit {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }
}
