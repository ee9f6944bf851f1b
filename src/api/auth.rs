use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::models::UserInfo;
use crate::services::auth_service::{
    normalize_email, LinkDelivery, RequestLoginBody, RequestLoginResponse, VerifyResponse,
};
use crate::state::AppState;
use crate::utils::AppError;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TokenQuery {
    /// Magic-link token from the login email.
    pub token: Option<String>,
}

impl TokenQuery {
    fn required(&self) -> Result<&str, AppError> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Validation("token is required".to_string()))
    }
}

/// Base URL for email links: configured `BASE_URL`, otherwise the scheme and
/// host this request arrived on (proxy headers included).
fn link_base_url(state: &AppState, req: &HttpRequest) -> String {
    match &state.links.base_url {
        Some(url) => url.clone(),
        None => {
            let info = req.connection_info();
            format!("{}://{}", info.scheme(), info.host())
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/request",
    tag = "Auth",
    request_body = RequestLoginBody,
    responses(
        (status = 200, description = "Login link issued", body = RequestLoginResponse),
        (status = 400, description = "Missing or malformed email"),
        (status = 429, description = "Too many login requests for this email")
    )
)]
pub async fn request_login(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<RequestLoginBody>,
) -> Result<HttpResponse, AppError> {
    let email = normalize_email(body.email.as_deref())?;
    log::info!("🔐 POST /auth/request - email: {}", email);

    let base_url = link_base_url(&state, &req);
    let response = match state.auth.request_login(&email, &base_url).await? {
        LinkDelivery::Sent => RequestLoginResponse {
            success: true,
            message: "login link sent to your email".to_string(),
            note: None,
        },
        LinkDelivery::Delayed => RequestLoginResponse {
            success: true,
            message: "login link generated (email delivery may be delayed)".to_string(),
            note: Some(
                "if the email does not arrive, request a new link in a few minutes".to_string(),
            ),
        },
    };

    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    get,
    path = "/auth/verify",
    tag = "Auth",
    params(TokenQuery),
    responses(
        (status = 200, description = "Token redeemed, session issued", body = VerifyResponse),
        (status = 400, description = "Missing token"),
        (status = 401, description = "Token unknown, expired or already used")
    )
)]
pub async fn verify_token(
    state: web::Data<AppState>,
    query: web::Query<TokenQuery>,
) -> Result<HttpResponse, AppError> {
    log::info!("✓ GET /auth/verify");
    let token = query.required()?;

    let login = state.auth.verify(token).await?;

    Ok(HttpResponse::Ok().json(VerifyResponse {
        success: true,
        token: login.session,
        user: UserInfo::from(&login.user),
    }))
}

const REDIRECT_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Opening Rizon...</title>
  <style>
    body { font-family: -apple-system, sans-serif; display: flex; justify-content: center; align-items: center; min-height: 100vh; margin: 0; background: #f5f3ff; }
    .card { text-align: center; padding: 40px; background: white; border-radius: 16px; box-shadow: 0 4px 24px rgba(0,0,0,0.1); max-width: 400px; }
    h1 { color: #333; font-size: 24px; }
    p { color: #666; font-size: 16px; line-height: 1.5; }
    .btn { display: inline-block; background: #6366f1; color: white; padding: 14px 32px; border-radius: 10px; text-decoration: none; font-weight: 600; font-size: 16px; margin-top: 16px; }
  </style>
</head>
<body>
  <div class="card">
    <h1>Opening Rizon...</h1>
    <p>You should be redirected to the app automatically.</p>
    <p>If nothing happens, tap the button below:</p>
    <a href="__DEEP_LINK__" class="btn">Open Rizon App</a>
  </div>
  <script>window.location.href = "__DEEP_LINK__";</script>
</body>
</html>"#;

/// Hand-off page opened from the email: mail clients strip custom URL
/// schemes, so the email links here and this page opens the app.
pub fn render_redirect_page(app_scheme: &str, token: &str) -> String {
    // Percent-encoding leaves nothing that can break out of the attribute or
    // the script string.
    let deep_link = format!("{}://login?token={}", app_scheme, urlencoding::encode(token));
    REDIRECT_PAGE.replace("__DEEP_LINK__", &deep_link)
}

#[utoipa::path(
    get,
    path = "/auth/redirect",
    tag = "Auth",
    params(TokenQuery),
    responses(
        (status = 200, description = "Page that opens the app", content_type = "text/html"),
        (status = 400, description = "Missing token")
    )
)]
pub async fn redirect_to_app(
    state: web::Data<AppState>,
    query: web::Query<TokenQuery>,
) -> Result<HttpResponse, AppError> {
    let token = query.required()?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_redirect_page(&state.links.app_scheme, token)))
}
