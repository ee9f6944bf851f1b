use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::api::session_user_id;
use crate::services::SessionClaims;
use crate::state::AppState;
use crate::utils::AppError;

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserStatusResponse {
    pub success: bool,
    pub onboarding_completed: bool,
}

#[utoipa::path(
    get,
    path = "/user/status",
    tag = "User",
    responses(
        (status = 200, description = "Onboarding state", body = UserStatusResponse),
        (status = 401, description = "Missing or invalid session"),
        (status = 404, description = "User no longer exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_status(
    user: web::ReqData<SessionClaims>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = session_user_id(&user)?;
    let record = state.users.get(user_id).await?;

    Ok(HttpResponse::Ok().json(UserStatusResponse {
        success: true,
        onboarding_completed: record.onboarding_completed,
    }))
}

#[utoipa::path(
    patch,
    path = "/user/onboarding",
    tag = "User",
    responses(
        (status = 200, description = "Onboarding marked as completed"),
        (status = 401, description = "Missing or invalid session"),
        (status = 404, description = "User no longer exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn complete_onboarding(
    user: web::ReqData<SessionClaims>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = session_user_id(&user)?;
    log::info!("🎉 PATCH /user/onboarding - user: {}", user.user_id);

    state.users.complete_onboarding(user_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "onboarding marked as completed"
    })))
}
