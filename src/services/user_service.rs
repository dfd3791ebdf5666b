//! User service - Handles user-related business logic.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{ProfileUpdate, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get user by ID
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Update the editable profile fields. Email and role are not editable.
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User>;

    /// Permanently delete the account
    async fn delete_account(&self, id: Uuid) -> AppResult<()>;

    /// One page of users, newest first
    async fn list_users(&self, params: PaginationParams) -> AppResult<Paginated<User>>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    /// Create new user service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow.users().find_by_id(id).await?.ok_or_not_found()
    }

    async fn update_profile(&self, id: Uuid, mut update: ProfileUpdate) -> AppResult<User> {
        if let Some(name) = update.name.take() {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::validation("Name cannot be empty"));
            }
            update.name = Some(name.to_string());
        }

        if update.is_empty() {
            return self.get_user(id).await;
        }

        let user = self.uow.users().update_profile(id, update).await?;
        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    async fn delete_account(&self, id: Uuid) -> AppResult<()> {
        self.uow.users().delete(id).await?;
        tracing::info!(user_id = %id, "Account deleted");
        Ok(())
    }

    async fn list_users(&self, params: PaginationParams) -> AppResult<Paginated<User>> {
        let page = params.page.max(1);
        let per_page = params.limit().max(1);

        let (users, total) = self.uow.users().list(page, per_page).await?;
        Ok(Paginated::new(users, page, per_page, total))
    }
}
