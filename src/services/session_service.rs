use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::User;
use crate::utils::AppError;

/// Session lifetime.
pub const SESSION_TTL_DAYS: i64 = 30;

/// HS256 keys shorter than this are rejected at startup.
pub const MIN_SECRET_LEN: usize = 16;

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub user_id: String, // ObjectId hex
    pub email: String,
    pub iat: i64, // issued at
    pub exp: i64, // expiration
    pub jti: String,
}

/// Signs and verifies bearer credentials.
///
/// Keys are derived once from the configured secret; building the service
/// is the only place a `Signing` error can come from a bad key.
#[derive(Clone)]
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl SessionService {
    pub fn new(secret: &str) -> Result<Self, AppError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(AppError::Signing(format!(
                "JWT secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(SESSION_TTL_DAYS),
        })
    }

    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = SessionClaims {
            user_id: user.id_hex(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Signing(format!("Failed to sign session: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, AppError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("Rejected bearer token: {}", e);
                AppError::Unauthorized("invalid or expired session".to_string())
            })
    }
}
