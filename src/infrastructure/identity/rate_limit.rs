use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use moka::future::Cache;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::middleware::ClientIdentity;
use crate::error::AppError;
use crate::infrastructure::config::Config;

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";

/// Fixed-window request ceiling per client identity.
///
/// A window opens with the first request of a client and closes `window`
/// later, when the cache entry expires.
pub struct RateLimiter {
    max_requests: u32,
    windows: Cache<String, Arc<AtomicU32>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            windows: Cache::builder()
                .max_capacity(100_000)
                .time_to_live(window)
                .build(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.rate_limit_max_requests,
            Duration::from_secs(config.rate_limit_window_secs),
        )
    }

    /// Count one request for `key`, false once the window's budget is spent
    pub async fn try_acquire(&self, key: &str) -> bool {
        let counter = self
            .windows
            .get_with(key.to_string(), async { Arc::new(AtomicU32::new(0)) })
            .await;
        counter.fetch_add(1, Ordering::SeqCst) < self.max_requests
    }
}

/// Reject callers over their budget with 429. Runs after identity resolution.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(ClientIdentity(owner_key)) = request.extensions().get::<ClientIdentity>() {
        if !limiter.try_acquire(owner_key).await {
            tracing::warn!(owner_key = %owner_key, "Rate limit exceeded");
            return Err(AppError::RateLimitExceeded(RATE_LIMIT_MESSAGE.to_string()));
        }
    }

    Ok(next.run(request).await)
}
