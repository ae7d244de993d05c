use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::models::{PostRow, PostStatus};
use crate::services::post_service;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct CreatePostBody {
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: String,
    pub prep_time: Option<i64>,
    pub cook_time: Option<i64>,
    pub servings: Option<i64>,
    pub difficulty_level: Option<String>,
    pub cuisine_type: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub post_id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub prep_time: Option<i64>,
    pub cook_time: Option<i64>,
    pub servings: Option<i64>,
    pub difficulty_level: Option<String>,
    pub cuisine_type: Option<String>,
    pub image_url: Option<String>,
    pub status: String,
    pub created_at: String,
    pub published_at: Option<String>,
    pub archived_at: Option<String>,
}

impl From<&PostRow> for PostResponse {
    fn from(row: &PostRow) -> Self {
        let ingredients = row
            .ingredients
            .as_deref()
            .and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
            .unwrap_or_default();
        Self {
            post_id: row.post_id.clone(),
            user_id: row.user_id.clone(),
            title: row.title.clone(),
            description: row.description.clone(),
            ingredients,
            instructions: row.instructions.clone(),
            prep_time: row.prep_time,
            cook_time: row.cook_time,
            servings: row.servings,
            difficulty_level: row.difficulty_level.clone(),
            cuisine_type: row.cuisine_type.clone(),
            image_url: row.image_url.clone(),
            status: row.status.clone(),
            created_at: row.created_at.clone(),
            published_at: row.published_at.clone(),
            archived_at: row.archived_at.clone(),
        }
    }
}

pub async fn create_post_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(body): Json<CreatePostBody>,
) -> Result<(StatusCode, Json<PostResponse>), AppError> {
    if body.title.trim().is_empty() {
        return Err(AppError::invalid_state("title must not be empty"));
    }

    let post = post_service::create_draft(
        &state.pool,
        &auth_user.id,
        post_service::NewPostInput {
            title: body.title,
            description: body.description,
            ingredients: body.ingredients,
            instructions: body.instructions,
            prep_time: body.prep_time,
            cook_time: body.cook_time,
            servings: body.servings,
            difficulty_level: body.difficulty_level,
            cuisine_type: body.cuisine_type,
            image_url: body.image_url,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(PostResponse::from(&post))))
}

pub async fn get_post_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(post_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<PostResponse>, AppError> {
    let post = post_service::get_post(&state.pool, &post_id, &auth_user.id).await?;
    Ok(Json(PostResponse::from(&post)))
}

pub async fn publish_post_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(post_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<PostResponse>, AppError> {
    let post = post_service::publish(&state.pool, &post_id, &auth_user.id).await?;
    Ok(Json(PostResponse::from(&post)))
}

pub async fn archive_post_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(post_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<PostResponse>, AppError> {
    let post = post_service::archive(&state.pool, &post_id, &auth_user.id).await?;
    Ok(Json(PostResponse::from(&post)))
}

pub async fn unarchive_post_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(post_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<PostResponse>, AppError> {
    let post = post_service::unarchive(&state.pool, &post_id, &auth_user.id).await?;
    Ok(Json(PostResponse::from(&post)))
}

/// A user's posts. Owners see every status; everyone else only published.
pub async fn user_posts_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let posts = post_service::list_by_user(&state.pool, &user_id).await?;
    let visible = posts
        .iter()
        .filter(|p| p.user_id == auth_user.id || p.status() == PostStatus::Published)
        .map(PostResponse::from)
        .collect();
    Ok(Json(visible))
}
