use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::{UserInfo, UserRow};
use crate::services::user_service;
use crate::{security, AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub email: String,
    pub username: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: UserInfo,
}

pub async fn register_handler(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if body.password.len() < 8 {
        return Err(AppError::invalid_state(
            "password must be at least 8 characters",
        ));
    }

    let password_hash = security::hash_password(&body.password)?;
    let user = user_service::register(
        &state.pool,
        body.email.trim(),
        body.username.as_deref(),
        &password_hash,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(profile_json(&user))))
}

pub async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = crate::database::user_repo::load_by_email(&state.pool, body.email.trim())
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !security::verify_password(&body.password, &user.password_hash) {
        return Err(AppError::Unauthorized);
    }

    let access_token = security::create_access_token(
        &user.user_id,
        &state.config.secret_key,
        state.config.access_token_expire_minutes,
    )?;

    tracing::info!(user = %user.user_id, "login");
    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer",
        user: UserInfo::from(&user),
    }))
}

pub(super) fn profile_json(user: &UserRow) -> Value {
    json!({
        "user_id": user.user_id,
        "email": user.email,
        "username": user.username,
        "bio": user.bio,
        "profile_image_url": user.profile_image_url,
        "friends_list_visibility": user.friends_list_visibility,
        "discoverable_for_friends": user.is_discoverable(),
        "created_at": user.created_at,
    })
}
