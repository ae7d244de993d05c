use sqlx::SqliteExecutor;

use crate::models::FriendshipRow;

/// Canonical unordered-pair key. Every write goes through this so a pair
/// can never appear twice under swapped directions.
pub fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

pub struct NewFriendship<'a> {
    pub friendship_id: &'a str,
    pub requester_id: &'a str,
    pub addressee_id: &'a str,
    pub status: &'a str,
    pub created_at: &'a str,
}

const SQL_INSERT_EDGE: &str = r#"
INSERT INTO friendships (
  friendship_id,
  requester_id,
  addressee_id,
  user_lo,
  user_hi,
  status,
  created_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

pub async fn insert_edge(
    executor: impl SqliteExecutor<'_>,
    edge: NewFriendship<'_>,
) -> sqlx::Result<()> {
    let (lo, hi) = canonical_pair(edge.requester_id, edge.addressee_id);
    sqlx::query(SQL_INSERT_EDGE)
        .bind(edge.friendship_id)
        .bind(edge.requester_id)
        .bind(edge.addressee_id)
        .bind(lo)
        .bind(hi)
        .bind(edge.status)
        .bind(edge.created_at)
        .execute(executor)
        .await?;
    Ok(())
}

const EDGE_COLUMNS: &str = r#"
  friendship_id,
  requester_id,
  addressee_id,
  status,
  created_at,
  updated_at
"#;

pub async fn load_pair(
    executor: impl SqliteExecutor<'_>,
    a: &str,
    b: &str,
) -> sqlx::Result<Option<FriendshipRow>> {
    let (lo, hi) = canonical_pair(a, b);
    let sql = format!(
        "SELECT {EDGE_COLUMNS} FROM friendships WHERE user_lo = ?1 AND user_hi = ?2 LIMIT 1"
    );
    sqlx::query_as::<_, FriendshipRow>(&sql)
        .bind(lo)
        .bind(hi)
        .fetch_optional(executor)
        .await
}

pub async fn load_by_id(
    executor: impl SqliteExecutor<'_>,
    friendship_id: &str,
) -> sqlx::Result<Option<FriendshipRow>> {
    let sql = format!("SELECT {EDGE_COLUMNS} FROM friendships WHERE friendship_id = ?1 LIMIT 1");
    sqlx::query_as::<_, FriendshipRow>(&sql)
        .bind(friendship_id)
        .fetch_optional(executor)
        .await
}

const SQL_UPDATE_STATUS: &str = r#"
UPDATE friendships SET status = ?2, updated_at = ?3 WHERE friendship_id = ?1
"#;

pub async fn update_status(
    executor: impl SqliteExecutor<'_>,
    friendship_id: &str,
    status: &str,
    updated_at: &str,
) -> sqlx::Result<()> {
    sqlx::query(SQL_UPDATE_STATUS)
        .bind(friendship_id)
        .bind(status)
        .bind(updated_at)
        .execute(executor)
        .await?;
    Ok(())
}

const SQL_REORIENT_TO_BLOCKED: &str = r#"
UPDATE friendships SET
  requester_id = ?2,
  addressee_id = ?3,
  status = 'blocked',
  updated_at = ?4
WHERE friendship_id = ?1
"#;

/// Flip an existing edge to blocked with the blocker recorded as
/// requester. `user_lo`/`user_hi` stay put; the pair is unchanged.
pub async fn reorient_to_blocked(
    executor: impl SqliteExecutor<'_>,
    friendship_id: &str,
    blocker_id: &str,
    blocked_id: &str,
    updated_at: &str,
) -> sqlx::Result<()> {
    sqlx::query(SQL_REORIENT_TO_BLOCKED)
        .bind(friendship_id)
        .bind(blocker_id)
        .bind(blocked_id)
        .bind(updated_at)
        .execute(executor)
        .await?;
    Ok(())
}

const SQL_DELETE_EDGE: &str = "DELETE FROM friendships WHERE friendship_id = ?1";

pub async fn delete_edge(
    executor: impl SqliteExecutor<'_>,
    friendship_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_DELETE_EDGE)
        .bind(friendship_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_LIST_FRIEND_IDS: &str = r#"
SELECT
  CASE WHEN requester_id = ?1 THEN addressee_id ELSE requester_id END AS friend_id
FROM friendships
WHERE (requester_id = ?1 OR addressee_id = ?1)
  AND status = 'accepted'
"#;

pub async fn list_friend_ids(
    executor: impl SqliteExecutor<'_>,
    user_id: &str,
) -> sqlx::Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(SQL_LIST_FRIEND_IDS)
        .bind(user_id)
        .fetch_all(executor)
        .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

const SQL_LIST_CONNECTED_IDS: &str = r#"
SELECT
  CASE WHEN requester_id = ?1 THEN addressee_id ELSE requester_id END AS other_id
FROM friendships
WHERE requester_id = ?1 OR addressee_id = ?1
"#;

/// Every user sharing an edge with `user_id`, in any state. Used to carve
/// the suggestion candidate pool.
pub async fn list_connected_ids(
    executor: impl SqliteExecutor<'_>,
    user_id: &str,
) -> sqlx::Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(SQL_LIST_CONNECTED_IDS)
        .bind(user_id)
        .fetch_all(executor)
        .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

const SQL_LIST_PENDING_SENT: &str = r#"
SELECT
  friendship_id,
  requester_id,
  addressee_id,
  status,
  created_at,
  updated_at
FROM friendships
WHERE requester_id = ?1 AND status = 'pending'
ORDER BY created_at ASC
"#;

pub async fn list_pending_sent(
    executor: impl SqliteExecutor<'_>,
    user_id: &str,
) -> sqlx::Result<Vec<FriendshipRow>> {
    sqlx::query_as::<_, FriendshipRow>(SQL_LIST_PENDING_SENT)
        .bind(user_id)
        .fetch_all(executor)
        .await
}

const SQL_LIST_PENDING_RECEIVED: &str = r#"
SELECT
  friendship_id,
  requester_id,
  addressee_id,
  status,
  created_at,
  updated_at
FROM friendships
WHERE addressee_id = ?1 AND status = 'pending'
ORDER BY created_at ASC
"#;

pub async fn list_pending_received(
    executor: impl SqliteExecutor<'_>,
    user_id: &str,
) -> sqlx::Result<Vec<FriendshipRow>> {
    sqlx::query_as::<_, FriendshipRow>(SQL_LIST_PENDING_RECEIVED)
        .bind(user_id)
        .fetch_all(executor)
        .await
}

const SQL_LIST_BLOCKED_IDS: &str = r#"
SELECT addressee_id
FROM friendships
WHERE requester_id = ?1 AND status = 'blocked'
"#;

/// Users blocked by `user_id` (edges where they are the recorded blocker).
pub async fn list_blocked_ids(
    executor: impl SqliteExecutor<'_>,
    user_id: &str,
) -> sqlx::Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(SQL_LIST_BLOCKED_IDS)
        .bind(user_id)
        .fetch_all(executor)
        .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}
