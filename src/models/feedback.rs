use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use crate::utils::time::rfc3339;

/// Feedback entry. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub text: String,
    pub rating: i32,
    /// Unique but sparse: documents without a key are not constrained.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    pub created_at: BsonDateTime,
}

/// Validated input for a feedback submission.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub user_id: ObjectId,
    pub text: String,
    pub rating: i32,
    pub idempotency_key: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FeedbackInfo {
    pub id: String,
    pub user_id: String,
    pub text: String,
    pub rating: i32,
    pub idempotency_key: Option<String>,
    pub created_at: String,
}

impl From<&Feedback> for FeedbackInfo {
    fn from(feedback: &Feedback) -> Self {
        Self {
            id: feedback.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: feedback.user_id.to_hex(),
            text: feedback.text.clone(),
            rating: feedback.rating,
            idempotency_key: feedback.idempotency_key.clone(),
            created_at: rfc3339(feedback.created_at),
        }
    }
}
