use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::database::TokenStore;
use crate::utils::{time::to_bson, AppError};

/// Login requests allowed per email inside one window.
pub const MAX_LOGIN_REQUESTS: u64 = 5;
pub const LOGIN_WINDOW_MINUTES: i64 = 10;

/// Sliding-window limiter over issued login tokens.
///
/// The window is recomputed from the clock on every call
/// (`created_at >= now - window`), so there are no fixed buckets. Checking
/// is read-only: the token created after a successful check is what counts
/// against later requests.
#[derive(Clone)]
pub struct RateLimiter {
    tokens: Arc<dyn TokenStore>,
    max_requests: u64,
    window: Duration,
}

impl RateLimiter {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            tokens,
            max_requests: MAX_LOGIN_REQUESTS,
            window: Duration::minutes(LOGIN_WINDOW_MINUTES),
        }
    }

    /// Returns the number of tokens issued to `email` in the trailing window,
    /// or `AppError::RateLimited` once that number reaches the limit.
    pub async fn check_and_count(&self, email: &str) -> Result<u64, AppError> {
        let since = to_bson(Utc::now() - self.window);
        let count = self.tokens.count_recent_by_email(email, since).await?;

        if count >= self.max_requests {
            log::warn!(
                "🚫 Rate limit hit for {}: {} requests in {} min",
                email,
                count,
                self.window.num_minutes()
            );
            return Err(AppError::RateLimited(
                "too many login requests, please try again later".to_string(),
            ));
        }

        Ok(count)
    }
}
