use chrono::{Duration, Utc};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::database::{StoreError, TokenStore};
use crate::models::LoginToken;
use crate::utils::{time::to_bson, AppError};

/// Lifetime of a magic-link token.
pub const TOKEN_TTL_MINUTES: i64 = 15;

/// Why a token could not be redeemed.
#[derive(Debug, Error)]
pub enum RedeemError {
    #[error("invalid token")]
    NotFound,

    #[error("token has expired")]
    Expired,

    #[error("token has already been used")]
    AlreadyUsed,

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<RedeemError> for AppError {
    fn from(err: RedeemError) -> Self {
        match err {
            RedeemError::Storage(e) => AppError::Storage(e),
            rejected => AppError::Unauthorized(rejected.to_string()),
        }
    }
}

/// Opaque token value: 244 random bits from two v4 UUIDs, hex encoded.
/// Nothing about the email or the clock goes into it.
fn generate_token_value() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Issues and redeems single-use login tokens.
#[derive(Clone)]
pub struct TokenService {
    tokens: Arc<dyn TokenStore>,
    ttl: Duration,
}

impl TokenService {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            tokens,
            ttl: Duration::minutes(TOKEN_TTL_MINUTES),
        }
    }

    /// Creates and stores a fresh token for `email`. Delivery is up to the
    /// caller.
    pub async fn issue(&self, email: &str) -> Result<LoginToken, AppError> {
        let now = Utc::now();
        let token = LoginToken {
            id: None,
            email: email.to_string(),
            token: generate_token_value(),
            expires_at: to_bson(now + self.ttl),
            is_used: false,
            created_at: to_bson(now),
        };

        let token = self.tokens.create(token).await?;
        log::info!("🔑 Login token issued for {}", email);
        Ok(token)
    }

    /// Consumes `value` and returns the email it was issued for.
    ///
    /// The final step is a conditional `is_used: false -> true` write in the
    /// store that also requires the token to be unexpired at write time. The
    /// earlier checks only classify the failure; whether this call wins is
    /// decided by that write alone, so of several concurrent callers exactly
    /// one succeeds and the rest get `AlreadyUsed`.
    pub async fn redeem(&self, value: &str) -> Result<String, RedeemError> {
        let token = self
            .tokens
            .find_by_token(value)
            .await?
            .ok_or(RedeemError::NotFound)?;

        let now = to_bson(Utc::now());
        if token.is_expired_at(now) {
            return Err(RedeemError::Expired);
        }
        if token.is_used {
            return Err(RedeemError::AlreadyUsed);
        }

        // Fresh clock for the write: the token may have expired since the read.
        let write_at = to_bson(Utc::now());
        if !self.tokens.mark_used(value, write_at).await? {
            let current = self.tokens.find_by_token(value).await?;
            if current.is_some_and(|t| t.is_expired_at(write_at) && !t.is_used) {
                return Err(RedeemError::Expired);
            }
            log::warn!("⚠️ Lost redemption race for a token issued to {}", token.email);
            return Err(RedeemError::AlreadyUsed);
        }

        Ok(token.email)
    }
}
