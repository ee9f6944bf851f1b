use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::Collection;

use super::{MongoDB, StoreError, FEEDBACKS};
use crate::models::Feedback;

/// Append-only feedback storage: records have no update or delete path.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Feedback>, StoreError>;

    /// Fails with `StoreError::DuplicateKey` when the idempotency key is taken.
    async fn insert(&self, feedback: Feedback) -> Result<Feedback, StoreError>;
}

#[derive(Clone)]
pub struct MongoFeedbackStore {
    collection: Collection<Feedback>,
}

impl MongoFeedbackStore {
    pub fn new(db: &MongoDB) -> Self {
        Self {
            collection: db.collection(FEEDBACKS),
        }
    }
}

#[async_trait]
impl FeedbackStore for MongoFeedbackStore {
    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Feedback>, StoreError> {
        Ok(self
            .collection
            .find_one(doc! { "idempotency_key": key })
            .await?)
    }

    async fn insert(&self, mut feedback: Feedback) -> Result<Feedback, StoreError> {
        let result = self.collection.insert_one(&feedback).await?;
        feedback.id = result.inserted_id.as_object_id();
        Ok(feedback)
    }
}
