use chrono::{DateTime, Utc};
use mongodb::bson::DateTime as BsonDateTime;

/// Converts a chrono timestamp into the BSON date type stored in MongoDB.
pub fn to_bson(at: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(at.timestamp_millis())
}

/// Converts a stored BSON date back into chrono, saturating at the epoch
/// for values chrono cannot represent.
pub fn from_bson(at: BsonDateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or_default()
}

/// RFC 3339 rendering used in API responses.
pub fn rfc3339(at: BsonDateTime) -> String {
    from_bson(at).to_rfc3339()
}
