use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::post_repo;
use crate::models::{PostRow, PostStatus};
use crate::AppError;

pub struct NewPostInput {
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

/// Every recipe starts life as a draft owned by its author.
pub async fn create_draft(
    pool: &SqlitePool,
    owner_id: &str,
    input: NewPostInput,
) -> Result<PostRow, AppError> {
    let post_id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    let ingredients = match &input.ingredients {
        Some(items) => Some(serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())),
        None => None,
    };

    post_repo::insert_post(
        pool,
        post_repo::NewPost {
            post_id: &post_id,
            user_id: owner_id,
            title: &input.title,
            description: input.description.as_deref(),
            ingredients: ingredients.as_deref(),
            instructions: &input.instructions,
            prep_time: input.prep_time,
            cook_time: input.cook_time,
            servings: input.servings,
            difficulty_level: input.difficulty_level.as_deref(),
            cuisine_type: input.cuisine_type.as_deref(),
            image_url: input.image_url.as_deref(),
            created_at: &now,
        },
    )
    .await?;

    get_post_internal(pool, &post_id).await
}

async fn get_post_internal(pool: &SqlitePool, post_id: &str) -> Result<PostRow, AppError> {
    post_repo::load_by_id(pool, post_id)
        .await?
        .ok_or(AppError::NotFound("post"))
}

/// Fetch a post as `viewer`. Drafts and archived posts exist only for
/// their owner; everyone else gets NotFound rather than Forbidden, so the
/// post's existence is not leaked.
pub async fn get_post(
    pool: &SqlitePool,
    post_id: &str,
    viewer_id: &str,
) -> Result<PostRow, AppError> {
    let post = get_post_internal(pool, post_id).await?;
    if post.status() != PostStatus::Published && post.user_id != viewer_id {
        return Err(AppError::NotFound("post"));
    }
    Ok(post)
}

pub async fn list_by_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<PostRow>, AppError> {
    Ok(post_repo::list_by_user(pool, user_id).await?)
}

/// draft -> published, stamping `published_at`. Owner only.
pub async fn publish(pool: &SqlitePool, post_id: &str, actor: &str) -> Result<PostRow, AppError> {
    let mut tx = pool.begin().await?;

    let post = post_repo::load_by_id(&mut *tx, post_id)
        .await?
        .ok_or(AppError::NotFound("post"))?;
    if post.user_id != actor {
        return Err(AppError::Forbidden("you can only publish your own posts"));
    }
    if post.status() != PostStatus::Draft {
        return Err(AppError::invalid_state("only draft posts can be published"));
    }

    let now = Utc::now().to_rfc3339();
    post_repo::mark_published(&mut *tx, post_id, &now).await?;
    tx.commit().await?;
    get_post_internal(pool, post_id).await
}

/// published -> archived, stamping `archived_at`. Owner only.
pub async fn archive(pool: &SqlitePool, post_id: &str, actor: &str) -> Result<PostRow, AppError> {
    let mut tx = pool.begin().await?;

    let post = post_repo::load_by_id(&mut *tx, post_id)
        .await?
        .ok_or(AppError::NotFound("post"))?;
    if post.user_id != actor {
        return Err(AppError::Forbidden("you can only archive your own posts"));
    }
    if post.status() != PostStatus::Published {
        return Err(AppError::invalid_state(
            "only published posts can be archived",
        ));
    }

    let now = Utc::now().to_rfc3339();
    post_repo::mark_archived(&mut *tx, post_id, &now).await?;
    tx.commit().await?;
    get_post_internal(pool, post_id).await
}

/// archived -> published again. `published_at` keeps its original stamp.
pub async fn unarchive(
    pool: &SqlitePool,
    post_id: &str,
    actor: &str,
) -> Result<PostRow, AppError> {
    let mut tx = pool.begin().await?;

    let post = post_repo::load_by_id(&mut *tx, post_id)
        .await?
        .ok_or(AppError::NotFound("post"))?;
    if post.user_id != actor {
        return Err(AppError::Forbidden("you can only restore your own posts"));
    }
    if post.status() != PostStatus::Archived {
        return Err(AppError::invalid_state(
            "only archived posts can be restored",
        ));
    }

    let now = Utc::now().to_rfc3339();
    post_repo::mark_unarchived(&mut *tx, post_id, &now).await?;
    tx.commit().await?;
    get_post_internal(pool, post_id).await
}

/// Signal contract for the suggestion engine: distinct published cuisines.
pub async fn published_cuisines_of(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<String>, AppError> {
    Ok(post_repo::published_cuisines_of(pool, user_id).await?)
}

/// Signal contract: distinct published difficulty levels.
pub async fn published_difficulties_of(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<String>, AppError> {
    Ok(post_repo::published_difficulties_of(pool, user_id).await?)
}

/// Signal contract: any post created within the window.
pub async fn has_recent_activity(
    pool: &SqlitePool,
    user_id: &str,
    window_days: i64,
) -> Result<bool, AppError> {
    let since = (Utc::now() - Duration::days(window_days)).to_rfc3339();
    Ok(post_repo::has_post_since(pool, user_id, &since).await?)
}
