//! Producer side of the background job queue.

use apalis::prelude::Storage;
use apalis_sql::postgres::PostgresStorage;
use apalis_sql::sqlx::postgres::PgPoolOptions;
use async_trait::async_trait;

use super::EmailJob;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Queue for outgoing email.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EmailQueue: Send + Sync {
    async fn enqueue(&self, job: EmailJob) -> AppResult<()>;
}

/// Email queue stored in the apalis Postgres tables.
#[derive(Clone)]
pub struct PostgresEmailQueue {
    storage: PostgresStorage<EmailJob>,
}

impl PostgresEmailQueue {
    pub fn new(storage: PostgresStorage<EmailJob>) -> Self {
        Self { storage }
    }
}

/// Open the apalis job storage, creating its tables on first use.
pub async fn connect_storage(database_url: &str) -> AppResult<PostgresStorage<EmailJob>> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect job storage: {}", e)))?;

    PostgresStorage::setup(&pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;

    Ok(PostgresStorage::new(pool))
}

#[async_trait]
impl EmailQueue for PostgresEmailQueue {
    async fn enqueue(&self, job: EmailJob) -> AppResult<()> {
        let to = job.to.clone();
        let mut storage = self.storage.clone();
        storage
            .push(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to enqueue email: {}", e)))?;

        tracing::debug!(to = %to, "Email job enqueued");
        Ok(())
    }
}
