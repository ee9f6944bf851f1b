use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::{User, UserInfo};
use crate::services::email_service::EmailSender;
use crate::services::rate_limiter::RateLimiter;
use crate::services::session_service::SessionService;
use crate::services::token_service::TokenService;
use crate::services::user_service::UserService;
use crate::utils::AppError;

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RequestLoginBody {
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RequestLoginResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct VerifyResponse {
    pub success: bool,
    /// Signed bearer credential for subsequent requests.
    pub token: String,
    pub user: UserInfo,
}

/// Outcome of a login request once the token exists.
#[derive(Debug, PartialEq)]
pub enum LinkDelivery {
    Sent,
    /// The token was created but the email could not be sent.
    Delayed,
}

/// A redeemed magic link.
#[derive(Debug)]
pub struct VerifiedLogin {
    pub session: String,
    pub user: User,
}

/// Trims and lower-cases an email, rejecting obviously malformed input.
pub fn normalize_email(raw: Option<&str>) -> Result<String, AppError> {
    let email = raw.map(str::trim).unwrap_or_default().to_lowercase();
    if email.is_empty() {
        return Err(AppError::Validation("email is required".to_string()));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AppError::Validation("email is invalid".to_string())),
    }
}

/// Magic-link login flow: rate limit, issue, deliver; then redeem, resolve,
/// sign.
#[derive(Clone)]
pub struct AuthService {
    rate_limiter: RateLimiter,
    tokens: TokenService,
    users: UserService,
    sessions: SessionService,
    mailer: Arc<dyn EmailSender>,
}

impl AuthService {
    pub fn new(
        rate_limiter: RateLimiter,
        tokens: TokenService,
        users: UserService,
        sessions: SessionService,
        mailer: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            rate_limiter,
            tokens,
            users,
            sessions,
            mailer,
        }
    }

    /// Issues a token for `email` and emails a link to `{base_url}/auth/redirect`.
    ///
    /// Delivery is best-effort: once the token is stored the request succeeds,
    /// and a failed send only changes the returned `LinkDelivery`.
    pub async fn request_login(
        &self,
        email: &str,
        base_url: &str,
    ) -> Result<LinkDelivery, AppError> {
        self.rate_limiter.check_and_count(email).await?;
        let token = self.tokens.issue(email).await?;

        let link = format!(
            "{}/auth/redirect?token={}",
            base_url.trim_end_matches('/'),
            urlencoding::encode(&token.token)
        );

        match self.mailer.send_login_link(email, &link).await {
            Ok(()) => Ok(LinkDelivery::Sent),
            Err(e) => {
                log::error!("❌ Error sending login email to {}: {}", email, e);
                Ok(LinkDelivery::Delayed)
            }
        }
    }

    /// Redeems a magic-link token into a session for the matching user.
    pub async fn verify(&self, token: &str) -> Result<VerifiedLogin, AppError> {
        let email = self.tokens.redeem(token).await.map_err(|e| {
            log::warn!("❌ Token rejected: {}", e);
            AppError::from(e)
        })?;

        let user = self.users.resolve_or_create(&email).await?;
        let session = self.sessions.issue(&user)?;

        log::info!("✅ Login verified for {}", user.email);
        Ok(VerifiedLogin { session, user })
    }

    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }
}

#[cfg(test)]
pub mod mail_doubles {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Mailer that remembers every link it was asked to send.
    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingMailer {
        pub fn last_link(&self) -> Option<String> {
            self.sent
                .lock()
                .unwrap()
                .last()
                .map(|(_, link)| link.clone())
        }
    }

    #[async_trait]
    impl EmailSender for RecordingMailer {
        async fn send_login_link(&self, to: &str, link: &str) -> Result<(), AppError> {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), link.to_string()));
            Ok(())
        }
    }

    pub struct FailingMailer;

    #[async_trait]
    impl EmailSender for FailingMailer {
        async fn send_login_link(&self, _to: &str, _link: &str) -> Result<(), AppError> {
            Err(AppError::Delivery("smtp relay unavailable".to_string()))
        }
    }

    /// Pulls the token value back out of a login link.
    pub fn token_from_link(link: &str) -> String {
        let encoded = link.split("token=").nth(1).unwrap_or_default();
        urlencoding::decode(encoded).unwrap().into_owned()
    }
}
