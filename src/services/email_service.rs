use async_trait::async_trait;
use serde_json::json;

use crate::services::token_service::TOKEN_TTL_MINUTES;
use crate::utils::AppError;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

/// Delivers login links. Always best-effort from the caller's point of view.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_login_link(&self, to: &str, link: &str) -> Result<(), AppError>;
}

/// Development sender: no API key configured, so the link goes to the log.
pub struct LogMailer;

#[async_trait]
impl EmailSender for LogMailer {
    async fn send_login_link(&self, to: &str, link: &str) -> Result<(), AppError> {
        log::warn!("⚠️  RESEND_API_KEY not set, skipping email send");
        log::info!("📧 [Dev Mode] Login link for {}: {}", to, link);
        Ok(())
    }
}

/// Sends through the Resend HTTP API.
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
}

impl ResendMailer {
    pub fn new(client: reqwest::Client, api_key: String, from: String) -> Self {
        Self {
            client,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl EmailSender for ResendMailer {
    async fn send_login_link(&self, to: &str, link: &str) -> Result<(), AppError> {
        let body = json!({
            "from": self.from,
            "to": [to],
            "subject": "Your Rizon Login Link",
            "html": login_email_html(link),
        });

        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| AppError::Delivery(format!("failed to send email: {}", e)))?;

        let sent: serde_json::Value = response.json().await.unwrap_or_default();
        log::info!(
            "📧 Email sent to {} (ID: {})",
            to,
            sent["id"].as_str().unwrap_or("unknown")
        );
        Ok(())
    }
}

pub fn login_email_html(link: &str) -> String {
    format!(
        r#"<div style="font-family: sans-serif; max-width: 480px; margin: 0 auto; padding: 24px;">
  <h2 style="color: #333;">Welcome to Rizon! 🚀</h2>
  <p>Click the button below to log in to your account:</p>
  <a href="{link}" style="display: inline-block; background: #6366f1; color: white; padding: 12px 24px; border-radius: 8px; text-decoration: none; font-weight: 600;">Open Rizon App</a>
  <p style="color: #888; font-size: 14px; margin-top: 16px;">This link expires in {ttl} minutes and can only be used once.</p>
  <p style="color: #aaa; font-size: 12px;">If you didn't request this, you can safely ignore this email.</p>
</div>"#,
        link = link,
        ttl = TOKEN_TTL_MINUTES
    )
}
