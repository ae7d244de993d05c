use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::{FriendsListVisibility, UserInfo};
use crate::services::user_service;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::auth::profile_json;
use crate::{AppError, AppState};

pub async fn me_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let user = user_service::get_user(&state.pool, &auth_user.id).await?;

    let now = Utc::now();
    let cooldown = state.config.username_cooldown_months;
    let (can_change, days_remaining) =
        user_service::can_change_username(user.username_changed_at(), cooldown, now);
    let next_change =
        user_service::next_username_change_date(user.username_changed_at(), cooldown, now);

    let mut body = profile_json(&user);
    body["username_change"] = json!({
        "allowed": can_change,
        "days_remaining": days_remaining,
        "next_eligible_date": next_change.to_rfc3339(),
    });
    Ok(Json(body))
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateMeBody {
    pub username: Option<String>,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub friends_list_visibility: Option<String>,
    pub discoverable_for_friends: Option<bool>,
}

pub async fn update_me_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(body): Json<UpdateMeBody>,
) -> Result<Json<Value>, AppError> {
    let visibility = match body.friends_list_visibility.as_deref() {
        None => None,
        Some(raw) => Some(FriendsListVisibility::try_parse(raw).ok_or_else(|| {
            AppError::invalid_state("friends_list_visibility must be public, friends_only or private")
        })?),
    };

    let patch = user_service::UserPatch {
        username: body.username,
        bio: body.bio,
        profile_image_url: body.profile_image_url,
        friends_list_visibility: visibility,
        discoverable_for_friends: body.discoverable_for_friends,
    };

    let user = user_service::update_profile(
        &state.pool,
        &auth_user.id,
        patch,
        state.config.username_cooldown_months,
    )
    .await?;
    Ok(Json(profile_json(&user)))
}

pub async fn delete_me_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    user_service::delete_user(&state.pool, &auth_user.id).await?;
    Ok(Json(json!({ "message": "account deleted" })))
}

pub async fn get_user_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<UserInfo>, AppError> {
    let user = user_service::get_user(&state.pool, &user_id).await?;
    Ok(Json(UserInfo::from(&user)))
}

#[derive(Debug, Deserialize, Default)]
pub struct SearchQuery {
    pub q: Option<String>,
}

pub async fn search_users_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<UserInfo>>, AppError> {
    let users = user_service::search_users(&state.pool, query.q.as_deref().unwrap_or("")).await?;
    Ok(Json(users.iter().map(UserInfo::from).collect()))
}
