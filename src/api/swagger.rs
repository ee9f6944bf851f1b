use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rizon Backend API",
        version = "1.0.0",
        description = "Passwordless authentication, onboarding and feedback for the Rizon app.\n\n**Authentication:** request a magic link with `POST /auth/request`, redeem it with `GET /auth/verify`, then send the returned token as `Authorization: Bearer <token>`.\n\n**Idempotency:** `POST /feedback` takes a client-generated `idempotency_key`; retries with the same key return the stored entry instead of creating a new one.",
        contact(
            name = "Rizon Team"
        )
    ),
    paths(
        // Auth
        crate::api::auth::request_login,
        crate::api::auth::verify_token,
        crate::api::auth::redirect_to_app,

        // Feedback
        crate::api::feedback::submit_feedback,

        // User
        crate::api::user::get_status,
        crate::api::user::complete_onboarding,

        // Health
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::services::auth_service::RequestLoginBody,
            crate::services::auth_service::RequestLoginResponse,
            crate::services::auth_service::VerifyResponse,
            crate::models::UserInfo,
            crate::models::FeedbackInfo,
            crate::api::feedback::SubmitFeedbackBody,
            crate::api::feedback::FeedbackResponse,
            crate::api::user::UserStatusResponse,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Magic-link login: request a link by email, redeem it for a session token."),
        (name = "Feedback", description = "Idempotent feedback submission. Each new entry is forwarded to the team channel."),
        (name = "User", description = "Onboarding status of the signed-in user."),
        (name = "Health", description = "Liveness probe."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Session token from GET /auth/verify"))
                        .build()
                ),
            );
        }
    }
}
