use sqlx::SqliteExecutor;

use crate::models::PostRow;

const POST_COLUMNS: &str = r#"
  post_id,
  user_id,
  title,
  description,
  ingredients,
  instructions,
  prep_time,
  cook_time,
  servings,
  difficulty_level,
  cuisine_type,
  image_url,
  status,
  is_featured,
  created_at,
  updated_at,
  published_at,
  archived_at
"#;

pub struct NewPost<'a> {
    pub post_id: &'a str,
    pub user_id: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub ingredients: Option<&'a str>,
    pub instructions: &'a str,
    pub prep_time: Option<i64>,
    pub cook_time: Option<i64>,
    pub servings: Option<i64>,
    pub difficulty_level: Option<&'a str>,
    pub cuisine_type: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub created_at: &'a str,
}

const SQL_INSERT_POST: &str = r#"
INSERT INTO posts (
  post_id,
  user_id,
  title,
  description,
  ingredients,
  instructions,
  prep_time,
  cook_time,
  servings,
  difficulty_level,
  cuisine_type,
  image_url,
  status,
  created_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 'draft', ?13)
"#;

pub async fn insert_post(
    executor: impl SqliteExecutor<'_>,
    post: NewPost<'_>,
) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_POST)
        .bind(post.post_id)
        .bind(post.user_id)
        .bind(post.title)
        .bind(post.description)
        .bind(post.ingredients)
        .bind(post.instructions)
        .bind(post.prep_time)
        .bind(post.cook_time)
        .bind(post.servings)
        .bind(post.difficulty_level)
        .bind(post.cuisine_type)
        .bind(post.image_url)
        .bind(post.created_at)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn load_by_id(
    executor: impl SqliteExecutor<'_>,
    post_id: &str,
) -> sqlx::Result<Option<PostRow>> {
    let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE post_id = ?1 LIMIT 1");
    sqlx::query_as::<_, PostRow>(&sql)
        .bind(post_id)
        .fetch_optional(executor)
        .await
}

const SQL_SET_PUBLISHED: &str = r#"
UPDATE posts SET status = 'published', published_at = ?2, updated_at = ?2
WHERE post_id = ?1
"#;

pub async fn mark_published(
    executor: impl SqliteExecutor<'_>,
    post_id: &str,
    at: &str,
) -> sqlx::Result<()> {
    sqlx::query(SQL_SET_PUBLISHED)
        .bind(post_id)
        .bind(at)
        .execute(executor)
        .await?;
    Ok(())
}

const SQL_SET_ARCHIVED: &str = r#"
UPDATE posts SET status = 'archived', archived_at = ?2, updated_at = ?2
WHERE post_id = ?1
"#;

pub async fn mark_archived(
    executor: impl SqliteExecutor<'_>,
    post_id: &str,
    at: &str,
) -> sqlx::Result<()> {
    sqlx::query(SQL_SET_ARCHIVED)
        .bind(post_id)
        .bind(at)
        .execute(executor)
        .await?;
    Ok(())
}

const SQL_SET_UNARCHIVED: &str = r#"
UPDATE posts SET status = 'published', archived_at = NULL, updated_at = ?2
WHERE post_id = ?1
"#;

pub async fn mark_unarchived(
    executor: impl SqliteExecutor<'_>,
    post_id: &str,
    at: &str,
) -> sqlx::Result<()> {
    sqlx::query(SQL_SET_UNARCHIVED)
        .bind(post_id)
        .bind(at)
        .execute(executor)
        .await?;
    Ok(())
}

const SQL_LIST_BY_USER: &str = r#"
SELECT
  post_id,
  user_id,
  title,
  description,
  ingredients,
  instructions,
  prep_time,
  cook_time,
  servings,
  difficulty_level,
  cuisine_type,
  image_url,
  status,
  is_featured,
  created_at,
  updated_at,
  published_at,
  archived_at
FROM posts
WHERE user_id = ?1
ORDER BY created_at DESC
"#;

pub async fn list_by_user(
    executor: impl SqliteExecutor<'_>,
    user_id: &str,
) -> sqlx::Result<Vec<PostRow>> {
    sqlx::query_as::<_, PostRow>(SQL_LIST_BY_USER)
        .bind(user_id)
        .fetch_all(executor)
        .await
}

const SQL_PUBLISHED_CUISINES: &str = r#"
SELECT DISTINCT cuisine_type
FROM posts
WHERE user_id = ?1
  AND status = 'published'
  AND cuisine_type IS NOT NULL
  AND TRIM(cuisine_type) != ''
"#;

/// Distinct cuisines a user has published. Feeds suggestion scoring.
pub async fn published_cuisines_of(
    executor: impl SqliteExecutor<'_>,
    user_id: &str,
) -> sqlx::Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(SQL_PUBLISHED_CUISINES)
        .bind(user_id)
        .fetch_all(executor)
        .await?;
    Ok(rows.into_iter().map(|(c,)| c).collect())
}

const SQL_PUBLISHED_DIFFICULTIES: &str = r#"
SELECT DISTINCT difficulty_level
FROM posts
WHERE user_id = ?1
  AND status = 'published'
  AND difficulty_level IS NOT NULL
  AND TRIM(difficulty_level) != ''
"#;

pub async fn published_difficulties_of(
    executor: impl SqliteExecutor<'_>,
    user_id: &str,
) -> sqlx::Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(SQL_PUBLISHED_DIFFICULTIES)
        .bind(user_id)
        .fetch_all(executor)
        .await?;
    Ok(rows.into_iter().map(|(d,)| d).collect())
}

const SQL_HAS_RECENT_POST: &str = r#"
SELECT 1 FROM posts WHERE user_id = ?1 AND created_at >= ?2 LIMIT 1
"#;

/// Whether the user created any post on or after `since`. Creation time,
/// not publish time, defines recency here.
pub async fn has_post_since(
    executor: impl SqliteExecutor<'_>,
    user_id: &str,
    since: &str,
) -> sqlx::Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as(SQL_HAS_RECENT_POST)
        .bind(user_id)
        .bind(since)
        .fetch_optional(executor)
        .await?;
    Ok(row.is_some())
}
