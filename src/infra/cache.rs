//! Redis cache implementation.
//!
//! Backs per-client rate limiting and short-lived caching of user detail
//! representations.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::config::{CACHE_PREFIX_RATE_LIMIT, CACHE_PREFIX_USER, DEFAULT_CACHE_TTL_SECONDS};
use crate::domain::UserResponse;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Cache operations the HTTP layer relies on.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Cached detail representation for a user, if present.
    async fn get_user(&self, user_id: &Uuid) -> AppResult<Option<UserResponse>>;

    /// Store a detail representation.
    async fn set_user(&self, user: &UserResponse) -> AppResult<()>;

    /// Count a request against a fixed window.
    ///
    /// Returns the request count within the current window and whether the
    /// request is allowed.
    async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)>;

    /// Round-trip to the cache server.
    async fn ping(&self) -> AppResult<()>;
}

/// Redis cache wrapper with a multiplexed connection.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
    default_ttl: u64,
}

impl Cache {
    /// Connect to Redis at the given URL.
    pub async fn connect(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis cache connected");

        Ok(Self {
            connection,
            default_ttl: DEFAULT_CACHE_TTL_SECONDS,
        })
    }

    // =========================================================================
    // Generic Cache Operations
    // =========================================================================

    /// Get a JSON value from cache.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await.map_err(cache_error)?;

        value
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| {
                    AppError::internal(format!("Cache deserialization error: {}", e))
                })
            })
            .transpose()
    }

    /// Set a JSON value with the default TTL.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::internal(format!("Cache serialization error: {}", e)))?;

        conn.set_ex::<_, _, ()>(key, json, self.default_ttl)
            .await
            .map_err(cache_error)
    }

    /// Check if a key exists in cache.
    pub async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.connection.clone();
        conn.exists(key).await.map_err(cache_error)
    }
}

#[async_trait]
impl CacheStore for Cache {
    async fn get_user(&self, user_id: &Uuid) -> AppResult<Option<UserResponse>> {
        self.get(&user_key(user_id)).await
    }

    async fn set_user(&self, user: &UserResponse) -> AppResult<()> {
        self.set(&user_key(&user.id), user).await
    }

    async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = rate_limit_key(identifier);
        let mut conn = self.connection.clone();

        let (count, ttl): (u64, i64) = redis::pipe()
            .atomic()
            .incr(&key, 1u64)
            .ttl(&key)
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;

        // Any hit on a counter without expiry re-arms the window
        if needs_expiry(ttl) {
            conn.expire::<_, ()>(&key, window_seconds as i64)
                .await
                .map_err(cache_error)?;
        }

        Ok((count, count <= max_requests))
    }

    async fn ping(&self) -> AppResult<()> {
        self.exists("health:ping").await.map(|_| ())
    }
}

/// TTL reply -1 means the key exists without an expiry.
fn needs_expiry(ttl: i64) -> bool {
    ttl == -1
}

fn user_key(user_id: &Uuid) -> String {
    format!("{}{}", CACHE_PREFIX_USER, user_id)
}

fn rate_limit_key(identifier: &str) -> String {
    format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier)
}

fn cache_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {}", e);
    AppError::internal(format!("Cache error: {}", e))
}
