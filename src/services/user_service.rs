use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;

use crate::database::UserStore;
use crate::models::User;
use crate::services::idempotency::{insert_once, WriteOutcome};
use crate::utils::{time::to_bson, AppError};

/// Maps verified emails to user records and tracks onboarding.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Finds the user for `email`, creating it on first login.
    ///
    /// Two first logins for the same email can race; the unique index on
    /// `email` lets exactly one insert through and the loser reads back the
    /// winner's record instead of failing.
    pub async fn resolve_or_create(&self, email: &str) -> Result<User, AppError> {
        let outcome = insert_once(
            || self.users.find_by_email(email),
            || self.users.insert(User::new(email, to_bson(Utc::now()))),
        )
        .await?;

        if let WriteOutcome::Created(user) = &outcome {
            log::info!("👤 New user created: {} ({})", user.email, user.id_hex());
        }
        Ok(outcome.into_record())
    }

    pub async fn get(&self, id: ObjectId) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))
    }

    /// Marks onboarding as completed. The flag never goes back to false.
    pub async fn complete_onboarding(&self, id: ObjectId) -> Result<(), AppError> {
        if self
            .users
            .complete_onboarding(id, to_bson(Utc::now()))
            .await?
        {
            Ok(())
        } else {
            Err(AppError::NotFound("user not found".to_string()))
        }
    }
}
