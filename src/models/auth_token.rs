use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Single-use login token (stored in the `auth_tokens` collection).
///
/// A token is valid while `now < expires_at` and `is_used == false`. The
/// `is_used` flag only ever moves from `false` to `true`, and only through
/// the conditional update in `TokenStore::mark_used`.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginToken {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub token: String,
    /// TTL index key: MongoDB deletes the document once this date has passed.
    pub expires_at: BsonDateTime,
    #[serde(default)]
    pub is_used: bool,
    pub created_at: BsonDateTime,
}

impl LoginToken {
    pub fn is_expired_at(&self, now: BsonDateTime) -> bool {
        now >= self.expires_at
    }
}

// The token value is a bearer secret; keep it out of logs.
impl std::fmt::Debug for LoginToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginToken")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("is_used", &self.is_used)
            .field("created_at", &self.created_at)
            .finish()
    }
}
