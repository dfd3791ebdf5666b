//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections, migrations and repositories
//! - Caching (Redis) for sessions and rate limits
//! - Unit of Work for repository access

pub mod cache;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use cache::{Cache, CacheStore};
pub use db::{Database, HealthCheck, Migrator};
pub use repositories::{UserRepository, UserStore};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use cache::MockCacheStore;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::MockUserRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use unit_of_work::RepositoryUnit;
