use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use mongodb::Collection;

use super::{MongoDB, StoreError, USERS};
use crate::models::User;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<User>, StoreError>;

    /// Inserts a new user. A second user with the same email fails with
    /// `StoreError::DuplicateKey`.
    async fn insert(&self, user: User) -> Result<User, StoreError>;

    /// Sets `onboarding_completed` to true. Returns `false` when no user has
    /// this id; completing an already completed onboarding is not an error.
    async fn complete_onboarding(
        &self,
        id: ObjectId,
        now: BsonDateTime,
    ) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct MongoUserStore {
    collection: Collection<User>,
}

impl MongoUserStore {
    pub fn new(db: &MongoDB) -> Self {
        Self {
            collection: db.collection(USERS),
        }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<User>, StoreError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn insert(&self, mut user: User) -> Result<User, StoreError> {
        let result = self.collection.insert_one(&user).await?;
        user.id = result.inserted_id.as_object_id();
        Ok(user)
    }

    async fn complete_onboarding(
        &self,
        id: ObjectId,
        now: BsonDateTime,
    ) -> Result<bool, StoreError> {
        // Only the first completion touches the document, so `updated_at`
        // records when onboarding finished.
        let result = self
            .collection
            .update_one(
                doc! { "_id": id, "onboarding_completed": false },
                doc! { "$set": { "onboarding_completed": true, "updated_at": now } },
            )
            .await?;
        if result.matched_count == 1 {
            return Ok(true);
        }
        Ok(self.find_by_id(id).await?.is_some())
    }
}
