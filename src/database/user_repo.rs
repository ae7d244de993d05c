use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

use crate::models::UserRow;

const USER_COLUMNS: &str = r#"
  user_id,
  email,
  username,
  username_last_changed,
  password_hash,
  bio,
  profile_image_url,
  friends_list_visibility,
  discoverable_for_friends,
  created_at,
  updated_at
"#;

pub struct NewUser<'a> {
    pub user_id: &'a str,
    pub email: &'a str,
    pub username: Option<&'a str>,
    pub password_hash: &'a str,
    pub created_at: &'a str,
}

const SQL_INSERT_USER: &str = r#"
INSERT INTO users (
  user_id,
  email,
  username,
  password_hash,
  created_at
) VALUES (?1, ?2, ?3, ?4, ?5)
"#;

pub async fn insert_user(
    executor: impl SqliteExecutor<'_>,
    user: NewUser<'_>,
) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_USER)
        .bind(user.user_id)
        .bind(user.email)
        .bind(user.username)
        .bind(user.password_hash)
        .bind(user.created_at)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn load_by_id(
    executor: impl SqliteExecutor<'_>,
    user_id: &str,
) -> sqlx::Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1 LIMIT 1");
    sqlx::query_as::<_, UserRow>(&sql)
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

pub async fn load_by_email(
    executor: impl SqliteExecutor<'_>,
    email: &str,
) -> sqlx::Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1 LIMIT 1");
    sqlx::query_as::<_, UserRow>(&sql)
        .bind(email)
        .fetch_optional(executor)
        .await
}

const SQL_USERNAME_TAKEN: &str = r#"
SELECT 1 FROM users WHERE username = ?1 AND user_id != ?2 LIMIT 1
"#;

pub async fn username_taken(
    executor: impl SqliteExecutor<'_>,
    username: &str,
    exclude_user_id: &str,
) -> sqlx::Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as(SQL_USERNAME_TAKEN)
        .bind(username)
        .bind(exclude_user_id)
        .fetch_optional(executor)
        .await?;
    Ok(row.is_some())
}

const SQL_UPDATE_PROFILE: &str = r#"
UPDATE users SET
  username = ?2,
  username_last_changed = ?3,
  bio = ?4,
  profile_image_url = ?5,
  friends_list_visibility = ?6,
  discoverable_for_friends = ?7,
  updated_at = ?8
WHERE user_id = ?1
"#;

/// Full profile write. The service resolves the patch against the loaded
/// row first, so unset fields keep their previous values.
#[allow(clippy::too_many_arguments)]
pub async fn update_profile(
    executor: impl SqliteExecutor<'_>,
    user_id: &str,
    username: Option<&str>,
    username_last_changed: Option<&str>,
    bio: Option<&str>,
    profile_image_url: Option<&str>,
    friends_list_visibility: &str,
    discoverable_for_friends: bool,
    updated_at: &str,
) -> sqlx::Result<()> {
    sqlx::query(SQL_UPDATE_PROFILE)
        .bind(user_id)
        .bind(username)
        .bind(username_last_changed)
        .bind(bio)
        .bind(profile_image_url)
        .bind(friends_list_visibility)
        .bind(discoverable_for_friends as i64)
        .bind(updated_at)
        .execute(executor)
        .await?;
    Ok(())
}

const SQL_SEARCH_USERS: &str = r#"
SELECT
  user_id,
  email,
  username,
  username_last_changed,
  password_hash,
  bio,
  profile_image_url,
  friends_list_visibility,
  discoverable_for_friends,
  created_at,
  updated_at
FROM users
WHERE email LIKE ?1 OR username LIKE ?1
ORDER BY username ASC
LIMIT ?2
"#;

pub async fn search(
    executor: impl SqliteExecutor<'_>,
    pattern: &str,
    limit: i64,
) -> sqlx::Result<Vec<UserRow>> {
    sqlx::query_as::<_, UserRow>(SQL_SEARCH_USERS)
        .bind(pattern)
        .bind(limit)
        .fetch_all(executor)
        .await
}

const SQL_LIST_DISCOVERABLE: &str = r#"
SELECT
  user_id,
  email,
  username,
  username_last_changed,
  password_hash,
  bio,
  profile_image_url,
  friends_list_visibility,
  discoverable_for_friends,
  created_at,
  updated_at
FROM users
WHERE discoverable_for_friends = 1
  AND user_id != ?1
ORDER BY user_id ASC
"#;

pub async fn list_discoverable_except(
    executor: impl SqliteExecutor<'_>,
    user_id: &str,
) -> sqlx::Result<Vec<UserRow>> {
    sqlx::query_as::<_, UserRow>(SQL_LIST_DISCOVERABLE)
        .bind(user_id)
        .fetch_all(executor)
        .await
}

/// Resolve a set of ids to user rows. Returns rows in id order.
pub async fn load_by_ids(
    executor: impl SqliteExecutor<'_>,
    ids: &[String],
) -> sqlx::Result<Vec<UserRow>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {USER_COLUMNS} FROM users WHERE user_id IN ("
    ));
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(") ORDER BY user_id ASC");
    builder
        .build_query_as::<UserRow>()
        .fetch_all(executor)
        .await
}

const SQL_DELETE_USER: &str = "DELETE FROM users WHERE user_id = ?1";
const SQL_DELETE_USER_POSTS: &str = "DELETE FROM posts WHERE user_id = ?1";
const SQL_DELETE_USER_EDGES: &str = r#"
DELETE FROM friendships WHERE requester_id = ?1 OR addressee_id = ?1
"#;

pub async fn delete_posts_of(
    executor: impl SqliteExecutor<'_>,
    user_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_USER_POSTS)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete_edges_of(
    executor: impl SqliteExecutor<'_>,
    user_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_USER_EDGES)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete_user(
    executor: impl SqliteExecutor<'_>,
    user_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_USER)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}
