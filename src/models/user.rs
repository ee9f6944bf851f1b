use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use crate::utils::time::rfc3339;

/// App user, created lazily on the first successful magic-link login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    #[serde(default)]
    pub onboarding_completed: bool,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

impl User {
    pub fn new(email: &str, now: BsonDateTime) -> Self {
        Self {
            id: None,
            email: email.to_string(),
            onboarding_completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Hex form of the ObjectId, empty for a record that was never stored.
    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

/// Public shape of a user in API responses.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub onboarding_completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id_hex(),
            email: user.email.clone(),
            onboarding_completed: user.onboarding_completed,
            created_at: rfc3339(user.created_at),
            updated_at: rfc3339(user.updated_at),
        }
    }
}
