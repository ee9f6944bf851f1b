use crate::services::session_service::MIN_SECRET_LEN;
use crate::utils::AppError;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub db_name: String,
    pub jwt_secret: String,
    /// Public base URL for email links; derived from the request when unset.
    pub base_url: Option<String>,
    pub app_scheme: String,
    pub resend_api_key: Option<String>,
    pub from_email: String,
    pub slack_webhook_url: Option<String>,
    /// Empty means any origin is allowed.
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mongodb_uri = get("MONGODB_URI")
            .or_else(|| get("DATABASE_URL"))
            .ok_or_else(|| AppError::Config("MONGODB_URI is required".to_string()))?;

        let jwt_secret = get("JWT_SECRET")
            .ok_or_else(|| AppError::Config("JWT_SECRET is required".to_string()))?;
        if jwt_secret.len() < MIN_SECRET_LEN {
            return Err(AppError::Config(format!(
                "JWT_SECRET must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("PORT is not a valid port: {}", raw)))?,
            None => 8080,
        };

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            mongodb_uri,
            db_name: get("DB_NAME").unwrap_or_else(|| "rizon".to_string()),
            jwt_secret,
            base_url: get("BASE_URL").map(|url| url.trim_end_matches('/').to_string()),
            app_scheme: get("APP_SCHEME").unwrap_or_else(|| "rizon".to_string()),
            resend_api_key: get("RESEND_API_KEY"),
            from_email: get("FROM_EMAIL").unwrap_or_else(|| "onboarding@resend.dev".to_string()),
            slack_webhook_url: get("SLACK_WEBHOOK_URL"),
            cors_allowed_origins,
        })
    }
}
