use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::security;
use crate::AppState;

/// Identity of the caller, resolved from the bearer token and injected
/// into request extensions. Every handler takes this explicitly; there is
/// no ambient current-user state.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub id: String,
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    // Authorization header first, access_token cookie as fallback.
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.to_string());

    let cookie_token = request
        .headers()
        .get(header::COOKIE)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split("; ")
                .find_map(|c| c.strip_prefix("access_token=").map(|t| t.to_string()))
        });

    if let Some(token) = bearer.or(cookie_token) {
        if let Some(user_id) = security::verify_access_token(&token, &state.config.secret_key) {
            request
                .extensions_mut()
                .insert(AuthenticatedUser { id: user_id });
            return next.run(request).await;
        }
        tracing::warn!("rejected request with invalid access token");
    }

    Response::builder()
        .status(401)
        .body(axum::body::Body::from("Unauthorized - Please login"))
        .unwrap()
}
