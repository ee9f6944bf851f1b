use chrono::Utc;
use std::sync::Arc;

use crate::database::FeedbackStore;
use crate::models::{Feedback, NewFeedback};
use crate::services::idempotency::{insert_once, WriteOutcome};
use crate::services::notifier::{format_feedback_message, Notifier};
use crate::utils::{time::to_bson, AppError};

pub const MAX_RATING: i32 = 5;

/// Feedback submission guarded by a caller-supplied idempotency key.
#[derive(Clone)]
pub struct FeedbackService {
    feedbacks: Arc<dyn FeedbackStore>,
    notifier: Arc<dyn Notifier>,
}

impl FeedbackService {
    pub fn new(feedbacks: Arc<dyn FeedbackStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            feedbacks,
            notifier,
        }
    }

    /// Stores the feedback once per idempotency key.
    ///
    /// A replay (sequential or concurrent) by the same user gets
    /// `WriteOutcome::Existing` with the stored record. A key already taken by
    /// another user is a `Conflict` and the record is not returned. Only the
    /// call that actually inserted the record fires the notification.
    pub async fn submit_once(
        &self,
        input: NewFeedback,
    ) -> Result<WriteOutcome<Feedback>, AppError> {
        validate(&input)?;

        let key = input.idempotency_key.clone();
        let outcome = insert_once(
            || self.feedbacks.find_by_idempotency_key(&key),
            || {
                self.feedbacks.insert(Feedback {
                    id: None,
                    user_id: input.user_id,
                    text: input.text.clone(),
                    rating: input.rating,
                    idempotency_key: Some(input.idempotency_key.clone()),
                    created_at: to_bson(Utc::now()),
                })
            },
        )
        .await?;

        match &outcome {
            WriteOutcome::Created(feedback) => {
                log::info!("📝 Feedback stored for user {}", feedback.user_id.to_hex());
                self.dispatch_notification(feedback);
            }
            WriteOutcome::Existing(feedback) if feedback.user_id != input.user_id => {
                log::warn!(
                    "⚠️ Idempotency key {} reused by user {} (owned by another user)",
                    key,
                    input.user_id.to_hex()
                );
                return Err(AppError::Conflict("idempotency_key already used".to_string()));
            }
            WriteOutcome::Existing(_) => {
                log::info!("🔁 Feedback replay for idempotency key {}", key);
            }
        }

        Ok(outcome)
    }

    /// Fire-and-forget: the task is not awaited, not tied to the request, and
    /// may be dropped on shutdown. Failures are logged only.
    fn dispatch_notification(&self, feedback: &Feedback) {
        let notifier = Arc::clone(&self.notifier);
        let message =
            format_feedback_message(&feedback.user_id.to_hex(), &feedback.text, feedback.rating);

        tokio::spawn(async move {
            if let Err(e) = notifier.publish(&message).await {
                log::error!("❌ Error publishing feedback notification: {}", e);
            }
        });
    }
}

fn validate(input: &NewFeedback) -> Result<(), AppError> {
    if input.text.trim().is_empty() {
        return Err(AppError::Validation("feedback text is required".to_string()));
    }
    if input.idempotency_key.trim().is_empty() {
        return Err(AppError::Validation("idempotency_key is required".to_string()));
    }
    if !(0..=MAX_RATING).contains(&input.rating) {
        return Err(AppError::Validation(format!(
            "rating must be between 0 and {}",
            MAX_RATING
        )));
    }
    Ok(())
}

#[cfg(test)]
pub mod notify_doubles {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    /// Notifier that forwards every published message to a channel.
    pub struct RecordingNotifier {
        tx: mpsc::UnboundedSender<String>,
    }

    impl RecordingNotifier {
        pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
            let (tx, rx) = mpsc::unbounded_channel();
            (Self { tx }, rx)
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn publish(&self, message: &str) -> Result<(), AppError> {
            let _ = self.tx.send(message.to_string());
            Ok(())
        }
    }

    /// Notifier whose channel is always down.
    pub struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn publish(&self, _message: &str) -> Result<(), AppError> {
            Err(AppError::Delivery("webhook returned 500".to_string()))
        }
    }
}
