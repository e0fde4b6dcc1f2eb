//! Fixed-window rate limiter backed by Redis.
//!
//! Each window is its own key (`gstudy:ratelimit:{user}:{window}`); a request
//! adds its cost with INCRBY and refreshes the TTL in one MULTI/EXEC pipeline.

use async_trait::async_trait;
use redis::Client as RedisClient;
use tracing::debug;

use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u64 },
    Denied { reason: String },
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn check(&self, key: &str, cost: u32) -> Result<RateDecision, AppError>;
}

pub struct RedisRateLimiter {
    client: RedisClient,
    capacity: u64,
    window_secs: u64,
}

impl RedisRateLimiter {
    pub fn new(client: RedisClient, capacity: u32, window_secs: u64) -> Self {
        Self {
            client,
            capacity: u64::from(capacity),
            window_secs: window_secs.max(1),
        }
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check(&self, key: &str, cost: u32) -> Result<RateDecision, AppError> {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let window = now / self.window_secs;
        let resets_in = self.window_secs - now % self.window_secs;
        let redis_key = format!("gstudy:ratelimit:{key}:{window}");

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let (used,): (u64,) = redis::pipe()
            .atomic()
            .incr(&redis_key, cost)
            .expire(&redis_key, self.window_secs as i64)
            .ignore()
            .query_async(&mut conn)
            .await?;

        debug!("Rate limit window {redis_key}: {used}/{}", self.capacity);
        Ok(decide(used, self.capacity, resets_in))
    }
}

/// `used` already includes the current request's cost.
pub fn decide(used: u64, capacity: u64, resets_in_secs: u64) -> RateDecision {
    if used > capacity {
        RateDecision::Denied {
            reason: format!(
                "Rate limit exceeded ({used}/{capacity} units). Try again in {resets_in_secs}s."
            ),
        }
    } else {
        RateDecision::Allowed {
            remaining: capacity - used,
        }
    }
}
