pub mod auth;
pub mod feedback;
pub mod health;
pub mod swagger;
pub mod user;

use actix_web::web;
use mongodb::bson::oid::ObjectId;

use crate::middleware::AuthMiddleware;
use crate::services::SessionClaims;
use crate::utils::AppError;

/// User id carried by a verified session. A well-signed token with a
/// malformed id is still rejected as unauthorized.
pub(crate) fn session_user_id(claims: &SessionClaims) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(&claims.user_id)
        .map_err(|_| AppError::Unauthorized("invalid session subject".to_string()))
}

/// Registers every route. `AppState` must already be in the app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(16 * 1024)
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    // Health check
    .route("/health", web::get().to(health::health_check))
    // Magic-link login (public)
    .service(
        web::scope("/auth")
            .route("/request", web::post().to(auth::request_login))
            .route("/verify", web::get().to(auth::verify_token))
            .route("/redirect", web::get().to(auth::redirect_to_app)),
    )
    // Feedback: requires a session
    .service(
        web::resource("/feedback")
            .wrap(AuthMiddleware)
            .route(web::post().to(feedback::submit_feedback)),
    )
    // Onboarding: requires a session
    .service(
        web::scope("/user")
            .wrap(AuthMiddleware)
            .route("/status", web::get().to(user::get_status))
            .route("/onboarding", web::patch().to(user::complete_onboarding)),
    );
}
