//! User repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::config::{PASSWORD_CHANGED_BACKDATE_SECONDS, ROLE_USER};
use crate::domain::{NewUser, ProfileUpdate, User};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by (normalized) email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find user holding a reset token with the given digest
    async fn find_by_reset_token(&self, token_hash: &str) -> AppResult<Option<User>>;

    /// Insert a new user with the default role
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    /// Attach a Google account to an existing user and mark it verified
    async fn link_google(&self, id: Uuid, google_id: String) -> AppResult<User>;

    /// Apply profile edits
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User>;

    /// Store a new password hash, stamp the change and drop any reset token
    async fn set_password(&self, id: Uuid, password_hash: String) -> AppResult<User>;

    /// Store a reset token digest and its expiry
    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Remove any outstanding reset token
    async fn clear_reset_token(&self, id: Uuid) -> AppResult<()>;

    /// Permanently delete user
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// One page of users, newest first, and the total count
    async fn list(&self, page: u64, per_page: u64) -> AppResult<(Vec<User>, u64)>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: Uuid) -> AppResult<user::Model> {
        UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn save(&self, mut active: ActiveModel) -> AppResult<User> {
        active.updated_at = Set(Utc::now());
        let model = active.update(&self.db).await.map_err(map_unique)?;
        Ok(User::from(model))
    }
}

fn map_unique(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict("User"),
        _ => AppError::from(err),
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::PasswordResetToken.eq(token_hash))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_user.name),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            google_id: Set(new_user.google_id),
            is_verified: Set(new_user.is_verified),
            role: Set(ROLE_USER.to_string()),
            phone: Set(None),
            address: Set(None),
            age: Set(None),
            photo_url: Set(None),
            password_changed_at: Set(None),
            password_reset_token: Set(None),
            password_reset_expires: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(map_unique)?;
        Ok(User::from(model))
    }

    async fn link_google(&self, id: Uuid, google_id: String) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.google_id = Set(Some(google_id));
        active.is_verified = Set(true);
        self.save(active).await
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(id).await?.into();

        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(phone) = update.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = update.address {
            active.address = Set(Some(address));
        }
        if let Some(age) = update.age {
            active.age = Set(Some(age));
        }
        if let Some(photo_url) = update.photo_url {
            active.photo_url = Set(Some(photo_url));
        }

        self.save(active).await
    }

    async fn set_password(&self, id: Uuid, password_hash: String) -> AppResult<User> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        // Backdated so a token signed in the same second stays valid
        let changed_at = Utc::now() - Duration::seconds(PASSWORD_CHANGED_BACKDATE_SECONDS);

        active.password_hash = Set(Some(password_hash));
        active.password_changed_at = Set(Some(changed_at));
        active.password_reset_token = Set(None);
        active.password_reset_expires = Set(None);
        self.save(active).await
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.password_reset_token = Set(Some(token_hash));
        active.password_reset_expires = Set(Some(expires_at));
        self.save(active).await?;
        Ok(())
    }

    async fn clear_reset_token(&self, id: Uuid) -> AppResult<()> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.password_reset_token = Set(None);
        active.password_reset_expires = Set(None);
        self.save(active).await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn list(&self, page: u64, per_page: u64) -> AppResult<(Vec<User>, u64)> {
        let paginator = UserEntity::find()
            .order_by_desc(user::Column::CreatedAt)
            .paginate(&self.db, per_page.max(1));

        let total = paginator.num_items().await?;
        // Pages are 1-based at the API, 0-based in SeaORM
        let models = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((models.into_iter().map(User::from).collect(), total))
    }
}
