use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::{
    FeedbackStore, MongoDB, MongoFeedbackStore, MongoTokenStore, MongoUserStore, TokenStore,
    UserStore,
};
use crate::services::{
    AuthService, EmailSender, FeedbackService, LogMailer, LogNotifier, Notifier, RateLimiter,
    ResendMailer, SessionService, SlackWebhookNotifier, TokenService, UserService,
};
use crate::utils::AppError;

/// Where login links point.
#[derive(Debug, Clone)]
pub struct LinkSettings {
    /// Public base URL of this service; `None` means derive from the request.
    pub base_url: Option<String>,
    /// Custom URL scheme the mobile app registers (`rizon://login?...`).
    pub app_scheme: String,
}

/// Everything the handlers need, shared through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub users: UserService,
    pub feedback: FeedbackService,
    pub links: LinkSettings,
}

/// Store and collaborator wiring for `AppState::new`.
pub struct Collaborators {
    pub tokens: Arc<dyn TokenStore>,
    pub users: Arc<dyn UserStore>,
    pub feedbacks: Arc<dyn FeedbackStore>,
    pub mailer: Arc<dyn EmailSender>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(deps: Collaborators, sessions: SessionService, links: LinkSettings) -> Self {
        let users = UserService::new(deps.users);
        let auth = AuthService::new(
            RateLimiter::new(deps.tokens.clone()),
            TokenService::new(deps.tokens),
            users.clone(),
            sessions,
            deps.mailer,
        );

        Self {
            auth,
            users,
            feedback: FeedbackService::new(deps.feedbacks, deps.notifier),
            links,
        }
    }

    /// Production wiring: MongoDB stores, Resend/Slack when configured and
    /// log-only stand-ins otherwise.
    pub fn from_config(db: &MongoDB, config: &AppConfig) -> Result<Self, AppError> {
        let sessions = SessionService::new(&config.jwt_secret)?;
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Config(format!("HTTP client: {}", e)))?;

        let mailer: Arc<dyn EmailSender> = match &config.resend_api_key {
            Some(key) => Arc::new(ResendMailer::new(
                http.clone(),
                key.clone(),
                config.from_email.clone(),
            )),
            None => {
                log::warn!("⚠️  RESEND_API_KEY not set, login links will only be logged");
                Arc::new(LogMailer)
            }
        };

        let notifier: Arc<dyn Notifier> = match &config.slack_webhook_url {
            Some(url) => Arc::new(SlackWebhookNotifier::new(http, url.clone())),
            None => {
                log::warn!(
                    "⚠️  SLACK_WEBHOOK_URL not set, feedback notifications will only be logged"
                );
                Arc::new(LogNotifier)
            }
        };

        let deps = Collaborators {
            tokens: Arc::new(MongoTokenStore::new(db)),
            users: Arc::new(MongoUserStore::new(db)),
            feedbacks: Arc::new(MongoFeedbackStore::new(db)),
            mailer,
            notifier,
        };

        Ok(Self::new(
            deps,
            sessions,
            LinkSettings {
                base_url: config.base_url.clone(),
                app_scheme: config.app_scheme.clone(),
            },
        ))
    }
}
