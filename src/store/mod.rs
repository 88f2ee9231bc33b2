//! Shared counter store clients.
//!
//! The rate limiter only needs two commands from its backing store: an atomic
//! increment that creates missing keys at 1, and a way to put a TTL on a key.
//! Keeping that behind `CounterStore` lets the same limiter run against the
//! Upstash REST API, a plain Redis server, or an in-process map in tests.

mod memory;
mod redis_store;
mod upstash;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use upstash::UpstashStore;

use async_trait::async_trait;

/// Errors surfaced by a counter store call.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The HTTP request to a REST store failed (connect, TLS, body read).
    #[error("counter store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The Redis connection or command failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The store answered with an explicit error message.
    #[error("counter store error: {0}")]
    Rejected(String),

    /// The store answered, but not with what the command should return.
    #[error("unexpected counter store reply: {0}")]
    UnexpectedReply(String),

    /// No answer within the configured timeout.
    #[error("counter store timed out")]
    Timeout,
}

/// Atomic integer counters keyed by string, with expiry.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically adds 1 to `key` and returns the new value.
    /// A missing (or expired) key is created with value 1.
    async fn increment(&self, key: &str) -> Result<i64, StoreError>;

    /// Makes `key` expire `seconds` from now.
    async fn set_expiry(&self, key: &str, seconds: u64) -> Result<(), StoreError>;
}
