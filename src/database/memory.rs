//! In-memory stores for tests.
//!
//! Each store keeps its records behind a `std::sync::Mutex` that is never
//! held across an await, and mirrors the MongoDB unique indexes. Lookups
//! yield to the scheduler before returning so concurrent callers interleave
//! between "read" and "write" the way they do against a real server.

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{FeedbackStore, StoreError, TokenStore, UserStore};
use crate::models::{Feedback, LoginToken, User};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Vec<LoginToken>>,
}

impl MemoryTokenStore {
    pub fn all(&self) -> Vec<LoginToken> {
        lock(&self.tokens).clone()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn create(&self, mut token: LoginToken) -> Result<LoginToken, StoreError> {
        let mut tokens = lock(&self.tokens);
        if tokens.iter().any(|t| t.token == token.token) {
            return Err(StoreError::DuplicateKey);
        }
        token.id = Some(ObjectId::new());
        tokens.push(token.clone());
        Ok(token)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<LoginToken>, StoreError> {
        let found = lock(&self.tokens).iter().find(|t| t.token == token).cloned();
        tokio::task::yield_now().await;
        Ok(found)
    }

    async fn mark_used(&self, token: &str, now: BsonDateTime) -> Result<bool, StoreError> {
        let mut tokens = lock(&self.tokens);
        match tokens
            .iter_mut()
            .find(|t| t.token == token && !t.is_used && t.expires_at > now)
        {
            Some(t) => {
                t.is_used = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_recent_by_email(
        &self,
        email: &str,
        since: BsonDateTime,
    ) -> Result<u64, StoreError> {
        let count = lock(&self.tokens)
            .iter()
            .filter(|t| t.email == email && t.created_at >= since)
            .count();
        Ok(count as u64)
    }

    async fn purge_expired(&self, now: BsonDateTime) -> Result<u64, StoreError> {
        let mut tokens = lock(&self.tokens);
        let before = tokens.len();
        tokens.retain(|t| t.expires_at > now);
        Ok((before - tokens.len()) as u64)
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn len(&self) -> usize {
        lock(&self.users).len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let found = lock(&self.users).iter().find(|u| u.email == email).cloned();
        tokio::task::yield_now().await;
        Ok(found)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<User>, StoreError> {
        Ok(lock(&self.users).iter().find(|u| u.id == Some(id)).cloned())
    }

    async fn insert(&self, mut user: User) -> Result<User, StoreError> {
        let mut users = lock(&self.users);
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateKey);
        }
        user.id = Some(ObjectId::new());
        users.push(user.clone());
        Ok(user)
    }

    async fn complete_onboarding(
        &self,
        id: ObjectId,
        now: BsonDateTime,
    ) -> Result<bool, StoreError> {
        let mut users = lock(&self.users);
        match users.iter_mut().find(|u| u.id == Some(id)) {
            Some(user) => {
                if !user.onboarding_completed {
                    user.onboarding_completed = true;
                    user.updated_at = now;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MemoryFeedbackStore {
    feedbacks: Mutex<Vec<Feedback>>,
}

impl MemoryFeedbackStore {
    pub fn len(&self) -> usize {
        lock(&self.feedbacks).len()
    }
}

#[async_trait]
impl FeedbackStore for MemoryFeedbackStore {
    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Feedback>, StoreError> {
        let found = lock(&self.feedbacks)
            .iter()
            .find(|f| f.idempotency_key.as_deref() == Some(key))
            .cloned();
        tokio::task::yield_now().await;
        Ok(found)
    }

    async fn insert(&self, mut feedback: Feedback) -> Result<Feedback, StoreError> {
        let mut feedbacks = lock(&self.feedbacks);
        if let Some(key) = feedback.idempotency_key.as_deref() {
            if feedbacks
                .iter()
                .any(|f| f.idempotency_key.as_deref() == Some(key))
            {
                return Err(StoreError::DuplicateKey);
            }
        }
        feedback.id = Some(ObjectId::new());
        feedbacks.push(feedback.clone());
        Ok(feedback)
    }
}

/// Token store whose backend is down.
pub struct FailingTokenStore;

#[async_trait]
impl TokenStore for FailingTokenStore {
    async fn create(&self, _token: LoginToken) -> Result<LoginToken, StoreError> {
        Err(StoreError::Backend("server selection timeout".into()))
    }

    async fn find_by_token(&self, _token: &str) -> Result<Option<LoginToken>, StoreError> {
        Err(StoreError::Backend("server selection timeout".into()))
    }

    async fn mark_used(&self, _token: &str, _now: BsonDateTime) -> Result<bool, StoreError> {
        Err(StoreError::Backend("server selection timeout".into()))
    }

    async fn count_recent_by_email(
        &self,
        _email: &str,
        _since: BsonDateTime,
    ) -> Result<u64, StoreError> {
        Err(StoreError::Backend("server selection timeout".into()))
    }

    async fn purge_expired(&self, _now: BsonDateTime) -> Result<u64, StoreError> {
        Err(StoreError::Backend("server selection timeout".into()))
    }
}
