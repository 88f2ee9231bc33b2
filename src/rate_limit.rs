//! Fixed-window rate limiting on top of a shared counter store.
//!
//! No state is kept in-process: every decision is one atomic `INCR` on
//! `rate_limit:{identifier}`, plus an `EXPIRE` when that increment created the
//! key. Any number of server instances pointed at the same store therefore
//! share one window per identifier.
//!
//! The increment and the expiry are two separate store calls. If the process
//! dies (or the store fails) between them, the counter is left without a TTL.
//! The window is approximate, not exact.
//!
//! The per-call timeout widens that gap: an `INCR` the store applied but
//! answered after the timeout never gets its `EXPIRE`. Once such a key passes
//! `max_requests`, the identifier stays limited until the key is removed by
//! hand (or the store evicts it).

use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;

use crate::metrics::STORE_ERRORS;
use crate::store::{CounterStore, StoreError};

pub const KEY_PREFIX: &str = "rate_limit:";

/// Window length and request budget, fixed for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    pub window: Duration,
    pub max_requests: u64,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            max_requests: 30,
        }
    }
}

/// What to decide when the counter store cannot answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FailPolicy {
    /// Let the request through.
    #[default]
    Open,
    /// Reject the request as rate limited.
    Closed,
}

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
    policy: WindowPolicy,
    fail_policy: FailPolicy,
    timeout: Duration,
}

impl RateLimiter {
    pub fn new(
        store: Arc<dyn CounterStore>,
        policy: WindowPolicy,
        fail_policy: FailPolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            policy,
            fail_policy,
            timeout,
        }
    }

    /// Store key for a client identifier.
    pub fn key(identifier: &str) -> String {
        format!("{KEY_PREFIX}{identifier}")
    }

    /// Counts this request and reports whether it is over the budget.
    ///
    /// Store failures and timeouts are returned as-is; see
    /// [`RateLimiter::is_rate_limited`] for the policy-applying variant.
    pub async fn try_is_rate_limited(&self, identifier: &str) -> Result<bool, StoreError> {
        let key = Self::key(identifier);

        let count = self.bounded(self.store.increment(&key)).await?;

        // only the increment that created the key starts the window
        if count == 1 {
            self.bounded(self.store.set_expiry(&key, self.policy.window.as_secs()))
                .await?;
        }

        Ok(u64::try_from(count).is_ok_and(|count| count > self.policy.max_requests))
    }

    /// Like [`RateLimiter::try_is_rate_limited`], with store failures
    /// resolved by the configured [`FailPolicy`].
    pub async fn is_rate_limited(&self, identifier: &str) -> bool {
        match self.try_is_rate_limited(identifier).await {
            Ok(limited) => limited,
            Err(e) => {
                STORE_ERRORS.inc();
                let limited = self.fail_policy == FailPolicy::Closed;
                tracing::warn!(
                    error = %e,
                    identifier,
                    fail_policy = ?self.fail_policy,
                    "rate limit check failed"
                );
                limited
            }
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| StoreError::Timeout)?
    }
}
