// ==================== EXPIRED TOKEN PURGE ====================
// Removes login tokens past their expiry. MongoDB's TTL monitor already does
// this about once a minute; the job keeps the collection small on deployments
// where the TTL index is missing or the monitor lags.

use std::sync::Arc;

use tokio::time::{interval, Duration};

use crate::database::{StoreError, TokenStore};
use crate::utils::time::to_bson;

const PURGE_INTERVAL_SECS: u64 = 3600;

/// Deletes every token whose expiry has passed. Returns how many were removed.
pub async fn purge_once(tokens: &dyn TokenStore) -> Result<u64, StoreError> {
    let now = to_bson(chrono::Utc::now());
    tokens.purge_expired(now).await
}

/// Starts the hourly purge loop in the background. The first tick fires
/// immediately.
pub fn start_token_purge_job(tokens: Arc<dyn TokenStore>) {
    log::info!("🧹 Starting expired token purge (runs every hour)");

    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(PURGE_INTERVAL_SECS));

        loop {
            ticker.tick().await;

            match purge_once(tokens.as_ref()).await {
                Ok(0) => log::debug!("🧹 No expired tokens to purge"),
                Ok(count) => log::info!("🧹 Purged {} expired login tokens", count),
                Err(e) => log::error!("❌ Token purge failed: {}", e),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::{FailingTokenStore, MemoryTokenStore};
    use crate::models::LoginToken;
    use chrono::Utc;

    fn token(value: &str, expires_in_minutes: i64) -> LoginToken {
        let now = Utc::now();
        LoginToken {
            id: None,
            email: "a@ex.com".to_string(),
            token: value.to_string(),
            expires_at: to_bson(now + chrono::Duration::minutes(expires_in_minutes)),
            is_used: false,
            created_at: to_bson(now),
        }
    }

    #[tokio::test]
    async fn test_purge_once_removes_only_expired_tokens() {
        let store = MemoryTokenStore::default();
        store.create(token("old", -20)).await.unwrap();
        store.create(token("older", -60)).await.unwrap();
        store.create(token("fresh", 10)).await.unwrap();

        assert_eq!(purge_once(&store).await.unwrap(), 2);

        let remaining = store.all();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].token, "fresh");

        assert_eq!(purge_once(&store).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_purge_once_surfaces_store_errors() {
        assert!(matches!(
            purge_once(&FailingTokenStore).await,
            Err(StoreError::Backend(_))
        ));
    }
}
