use async_trait::async_trait;
use serde_json::json;

use crate::utils::AppError;

/// Outbound chat channel for team notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, message: &str) -> Result<(), AppError>;
}

/// Stand-in used when no webhook is configured: writes the message to the log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(&self, message: &str) -> Result<(), AppError> {
        log::info!("📨 [MockSlack] Published to channel: {}", message);
        Ok(())
    }
}

/// Posts messages to a Slack incoming webhook.
pub struct SlackWebhookNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl SlackWebhookNotifier {
    pub fn new(client: reqwest::Client, webhook_url: String) -> Self {
        Self { client, webhook_url }
    }
}

#[async_trait]
impl Notifier for SlackWebhookNotifier {
    async fn publish(&self, message: &str) -> Result<(), AppError> {
        self.client
            .post(&self.webhook_url)
            .json(&json!({ "text": message }))
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| AppError::Delivery(format!("Slack webhook failed: {}", e)))?;
        Ok(())
    }
}

/// Slack-formatted summary of a new feedback entry.
pub fn format_feedback_message(user_id: &str, text: &str, rating: i32) -> String {
    let stars = "⭐".repeat(rating.max(0) as usize);
    format!(
        "📝 *New Feedback Received*\nUser: `{}`\nRating: {}\nFeedback: {}",
        user_id, stars, text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_message_has_one_star_per_point() {
        let message = format_feedback_message("65f0c0ffee", "Love it", 3);
        assert_eq!(
            message,
            "📝 *New Feedback Received*\nUser: `65f0c0ffee`\nRating: ⭐⭐⭐\nFeedback: Love it"
        );
    }

    #[test]
    fn test_zero_rating_has_no_stars() {
        let message = format_feedback_message("u", "meh", 0);
        assert!(message.contains("Rating: \n"));
    }

    #[tokio::test]
    async fn test_log_notifier_never_fails() {
        assert!(LogNotifier.publish("hello").await.is_ok());
    }
}
