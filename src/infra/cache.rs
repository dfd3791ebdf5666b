//! Redis cache implementation.
//!
//! Backs short-lived sessions (OAuth login state) and the request
//! rate limiter. Both go through [`CacheStore`] so handlers and
//! middleware can run against an in-memory store in tests.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};

use crate::config::{Config, CACHE_PREFIX_RATE_LIMIT, CACHE_PREFIX_SESSION};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Cache operations used by the HTTP layer.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Store session data that expires after `ttl_seconds`.
    async fn set_session(&self, session_id: &str, data: &str, ttl_seconds: u64) -> AppResult<()>;

    /// Read and delete session data in one step. A session can be taken once.
    async fn take_session(&self, session_id: &str) -> AppResult<Option<String>>;

    /// Check and increment rate limit counter.
    /// Returns (current_count, is_allowed) tuple.
    async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)>;

    /// Round-trip to the server.
    async fn ping(&self) -> AppResult<()>;
}

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
}

impl Cache {
    /// Connect to Redis.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let client = Client::open(config.redis_url.as_str()).map_err(cache_error)?;
        let connection = ConnectionManager::new(client).await.map_err(cache_error)?;

        tracing::info!("Redis cache connected");

        Ok(Self { connection })
    }

    fn session_key(session_id: &str) -> String {
        format!("{}{}", CACHE_PREFIX_SESSION, session_id)
    }

    fn rate_limit_key(identifier: &str) -> String {
        format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier)
    }
}

#[async_trait]
impl CacheStore for Cache {
    async fn set_session(&self, session_id: &str, data: &str, ttl_seconds: u64) -> AppResult<()> {
        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(Self::session_key(session_id), data, ttl_seconds)
            .await
            .map_err(cache_error)?;
        Ok(())
    }

    async fn take_session(&self, session_id: &str) -> AppResult<Option<String>> {
        let key = Self::session_key(session_id);
        let mut conn = self.connection.clone();

        let (value,): (Option<String>,) = redis::pipe()
            .atomic()
            .get(&key)
            .del(&key)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;

        Ok(value)
    }

    async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = Self::rate_limit_key(identifier);
        let mut conn = self.connection.clone();

        let count: i64 = conn.incr(&key, 1).await.map_err(cache_error)?;
        if count == 1 {
            // First request in window
            let _: () = conn
                .expire(&key, window_seconds as i64)
                .await
                .map_err(cache_error)?;
        }

        let count = count.max(0) as u64;
        Ok((count, count <= max_requests))
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(())
    }
}

fn cache_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {}", e);
    AppError::internal(format!("Cache error: {}", e))
}
