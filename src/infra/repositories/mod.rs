//! Repositories over the sea-orm entities.

pub(crate) mod entities;
mod user_repository;

pub use user_repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
