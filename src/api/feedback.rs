use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::api::session_user_id;
use crate::models::{FeedbackInfo, NewFeedback};
use crate::services::{SessionClaims, WriteOutcome};
use crate::state::AppState;
use crate::utils::AppError;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SubmitFeedbackBody {
    pub text: Option<String>,
    pub rating: Option<i32>,
    /// Client-generated key; retries with the same key return the stored entry.
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FeedbackResponse {
    pub success: bool,
    pub message: String,
    pub feedback: FeedbackInfo,
}

#[utoipa::path(
    post,
    path = "/feedback",
    tag = "Feedback",
    request_body = SubmitFeedbackBody,
    responses(
        (status = 201, description = "Feedback stored", body = FeedbackResponse),
        (status = 200, description = "Replay of a stored submission", body = FeedbackResponse),
        (status = 400, description = "Missing text or idempotency key"),
        (status = 409, description = "Idempotency key already used by another user"),
        (status = 401, description = "Missing or invalid session")
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_feedback(
    user: web::ReqData<SessionClaims>,
    state: web::Data<AppState>,
    body: web::Json<SubmitFeedbackBody>,
) -> Result<HttpResponse, AppError> {
    let user_id = session_user_id(&user)?;
    log::info!("📝 POST /feedback - user: {}", user.user_id);

    let body = body.into_inner();
    let input = NewFeedback {
        user_id,
        text: body.text.unwrap_or_default(),
        rating: body.rating.unwrap_or(0),
        idempotency_key: body.idempotency_key.unwrap_or_default(),
    };

    let response = match state.feedback.submit_once(input).await? {
        WriteOutcome::Created(feedback) => HttpResponse::Created().json(FeedbackResponse {
            success: true,
            message: "feedback submitted successfully".to_string(),
            feedback: FeedbackInfo::from(&feedback),
        }),
        WriteOutcome::Existing(feedback) => HttpResponse::Ok().json(FeedbackResponse {
            success: true,
            message: "feedback already submitted".to_string(),
            feedback: FeedbackInfo::from(&feedback),
        }),
    };

    Ok(response)
}
