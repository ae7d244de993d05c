use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::user_repo;
use crate::error::is_unique_violation;
use crate::models::{FriendsListVisibility, UserRow};
use crate::AppError;

/// Whether a username change is allowed now, and how many days remain if
/// not. The cooldown approximates months as 30 days; a partial remaining
/// day counts as a full one.
pub fn can_change_username(
    last_changed: Option<DateTime<Utc>>,
    cooldown_months: i64,
    now: DateTime<Utc>,
) -> (bool, i64) {
    let Some(last_changed) = last_changed else {
        return (true, 0);
    };

    let required_wait = Duration::days(cooldown_months * 30);
    let elapsed = now - last_changed;
    if elapsed >= required_wait {
        return (true, 0);
    }

    let remaining = required_wait - elapsed;
    let days_remaining = remaining.num_days() + 1;
    (false, days_remaining.max(1))
}

/// Earliest instant the username may change again; `now` when it has
/// never changed.
pub fn next_username_change_date(
    last_changed: Option<DateTime<Utc>>,
    cooldown_months: i64,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    match last_changed {
        None => now,
        Some(at) => at + Duration::days(cooldown_months * 30),
    }
}

pub async fn get_user(pool: &SqlitePool, user_id: &str) -> Result<UserRow, AppError> {
    user_repo::load_by_id(pool, user_id)
        .await?
        .ok_or(AppError::NotFound("user"))
}

/// Register a new account. Email and username uniqueness are checked
/// first; a racing duplicate insert still surfaces as Conflict through the
/// unique indexes.
pub async fn register(
    pool: &SqlitePool,
    email: &str,
    username: Option<&str>,
    password_hash: &str,
) -> Result<UserRow, AppError> {
    let mut tx = pool.begin().await?;

    if user_repo::load_by_email(&mut *tx, email).await?.is_some() {
        return Err(AppError::invalid_state("email already registered"));
    }
    if let Some(username) = username {
        if user_repo::username_taken(&mut *tx, username, "").await? {
            return Err(AppError::invalid_state("username already taken"));
        }
    }

    let user_id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    let insert = user_repo::insert_user(
        &mut *tx,
        user_repo::NewUser {
            user_id: &user_id,
            email,
            username,
            password_hash,
            created_at: &now,
        },
    )
    .await;

    match insert {
        Ok(()) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::conflict("email or username already in use"));
        }
        Err(e) => return Err(e.into()),
    }

    tx.commit().await?;
    tracing::info!(user = %user_id, "user registered");
    get_user(pool, &user_id).await
}

/// Explicit optional-field patch: `None` leaves a field untouched. A set
/// username goes through the uniqueness check and the cooldown gate.
#[derive(Debug, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub friends_list_visibility: Option<FriendsListVisibility>,
    pub discoverable_for_friends: Option<bool>,
}

pub async fn update_profile(
    pool: &SqlitePool,
    user_id: &str,
    patch: UserPatch,
    cooldown_months: i64,
) -> Result<UserRow, AppError> {
    let mut tx = pool.begin().await?;

    let user = user_repo::load_by_id(&mut *tx, user_id)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    let now = Utc::now();
    let mut username = user.username.clone();
    let mut username_last_changed = user.username_last_changed.clone();

    if let Some(new_username) = patch.username {
        let is_change = user.username.as_deref() != Some(new_username.as_str());
        if is_change {
            if user_repo::username_taken(&mut *tx, &new_username, user_id).await? {
                return Err(AppError::invalid_state("username already taken"));
            }
            let (allowed, days_remaining) =
                can_change_username(user.username_changed_at(), cooldown_months, now);
            if !allowed {
                return Err(AppError::invalid_state(format!(
                    "username can be changed again in {days_remaining} day(s)"
                )));
            }
            username = Some(new_username);
            username_last_changed = Some(now.to_rfc3339());
        }
    }

    let bio = patch.bio.or(user.bio.clone());
    let profile_image_url = patch.profile_image_url.or(user.profile_image_url.clone());
    let visibility = patch
        .friends_list_visibility
        .unwrap_or_else(|| user.visibility());
    let discoverable = patch
        .discoverable_for_friends
        .unwrap_or_else(|| user.is_discoverable());

    user_repo::update_profile(
        &mut *tx,
        user_id,
        username.as_deref(),
        username_last_changed.as_deref(),
        bio.as_deref(),
        profile_image_url.as_deref(),
        visibility.as_str(),
        discoverable,
        &now.to_rfc3339(),
    )
    .await?;

    tx.commit().await?;
    get_user(pool, user_id).await
}

pub async fn search_users(pool: &SqlitePool, query: &str) -> Result<Vec<UserRow>, AppError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    let pattern = format!("%{query}%");
    Ok(user_repo::search(pool, &pattern, 20).await?)
}

/// Delete an account and everything hanging off it: posts and every
/// friendship edge referencing the user go in the same transaction, so no
/// orphaned edge can survive.
pub async fn delete_user(pool: &SqlitePool, user_id: &str) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    if user_repo::load_by_id(&mut *tx, user_id).await?.is_none() {
        return Err(AppError::NotFound("user"));
    }

    let posts = user_repo::delete_posts_of(&mut *tx, user_id).await?;
    let edges = user_repo::delete_edges_of(&mut *tx, user_id).await?;
    user_repo::delete_user(&mut *tx, user_id).await?;

    tx.commit().await?;
    tracing::info!(user = %user_id, posts, edges, "user deleted with cascade");
    Ok(())
}
