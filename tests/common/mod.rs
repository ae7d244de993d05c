#![allow(dead_code)]

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use tastebook::database;
use tastebook::models::UserRow;
use tastebook::services::{post_service, user_service};

/// Fresh in-memory database. Single connection so every handle sees the
/// same memory store.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");
    database::init_db(&pool).await.expect("init schema");
    pool
}

pub async fn create_user(pool: &SqlitePool, name: &str) -> UserRow {
    user_service::register(
        pool,
        &format!("{name}@example.com"),
        Some(name),
        "not-a-real-hash",
    )
    .await
    .expect("register user")
}

/// Publish a recipe for `owner` with the given cuisine/difficulty, so it
/// counts toward suggestion signals.
pub async fn publish_recipe(
    pool: &SqlitePool,
    owner: &UserRow,
    cuisine: Option<&str>,
    difficulty: Option<&str>,
) -> String {
    let draft = post_service::create_draft(
        pool,
        &owner.user_id,
        post_service::NewPostInput {
            title: format!("recipe by {}", owner.user_id),
            description: None,
            ingredients: None,
            instructions: "mix and cook".to_string(),
            prep_time: None,
            cook_time: None,
            servings: None,
            difficulty_level: difficulty.map(|s| s.to_string()),
            cuisine_type: cuisine.map(|s| s.to_string()),
            image_url: None,
        },
    )
    .await
    .expect("create draft");
    post_service::publish(pool, &draft.post_id, &owner.user_id)
        .await
        .expect("publish");
    draft.post_id
}

/// Push a post's creation time outside the recent-activity window.
pub async fn backdate_posts(pool: &SqlitePool, user_id: &str, days_ago: i64) {
    let stamp = (chrono::Utc::now() - chrono::Duration::days(days_ago)).to_rfc3339();
    sqlx::query("UPDATE posts SET created_at = ?1 WHERE user_id = ?2")
        .bind(&stamp)
        .bind(user_id)
        .execute(pool)
        .await
        .expect("backdate posts");
}
