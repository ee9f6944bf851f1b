use async_trait::async_trait;
use mongodb::bson::{doc, DateTime as BsonDateTime};
use mongodb::Collection;

use super::{MongoDB, StoreError, AUTH_TOKENS};
use crate::models::LoginToken;

/// Persistence of login tokens.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn create(&self, token: LoginToken) -> Result<LoginToken, StoreError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<LoginToken>, StoreError>;

    /// Flips `is_used` from `false` to `true` in one conditional write that
    /// also requires `expires_at > now`. Returns `true` only for the caller
    /// whose write took effect.
    async fn mark_used(&self, token: &str, now: BsonDateTime) -> Result<bool, StoreError>;

    /// Number of tokens issued to `email` with `created_at >= since`.
    async fn count_recent_by_email(
        &self,
        email: &str,
        since: BsonDateTime,
    ) -> Result<u64, StoreError>;

    /// Deletes tokens whose expiry has passed. MongoDB's TTL monitor does this
    /// on its own; the method exists for stores without TTL support.
    async fn purge_expired(&self, now: BsonDateTime) -> Result<u64, StoreError>;
}

#[derive(Clone)]
pub struct MongoTokenStore {
    collection: Collection<LoginToken>,
}

impl MongoTokenStore {
    pub fn new(db: &MongoDB) -> Self {
        Self {
            collection: db.collection(AUTH_TOKENS),
        }
    }
}

#[async_trait]
impl TokenStore for MongoTokenStore {
    async fn create(&self, mut token: LoginToken) -> Result<LoginToken, StoreError> {
        let result = self.collection.insert_one(&token).await?;
        token.id = result.inserted_id.as_object_id();
        Ok(token)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<LoginToken>, StoreError> {
        Ok(self.collection.find_one(doc! { "token": token }).await?)
    }

    async fn mark_used(&self, token: &str, now: BsonDateTime) -> Result<bool, StoreError> {
        let result = self
            .collection
            .update_one(
                doc! { "token": token, "is_used": false, "expires_at": { "$gt": now } },
                doc! { "$set": { "is_used": true, "used_at": now } },
            )
            .await?;
        Ok(result.modified_count == 1)
    }

    async fn count_recent_by_email(
        &self,
        email: &str,
        since: BsonDateTime,
    ) -> Result<u64, StoreError> {
        Ok(self
            .collection
            .count_documents(doc! { "email": email, "created_at": { "$gte": since } })
            .await?)
    }

    async fn purge_expired(&self, now: BsonDateTime) -> Result<u64, StoreError> {
        let result = self
            .collection
            .delete_many(doc! { "expires_at": { "$lte": now } })
            .await?;
        Ok(result.deleted_count)
    }
}
