use std::collections::{BTreeSet, HashSet};

use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::database::{friendship_repo, post_repo, user_repo};
use crate::models::{UserInfo, UserRow};
use crate::AppError;

const MUTUAL_FRIEND_WEIGHT: i64 = 10;
const SHARED_CUISINE_WEIGHT: i64 = 5;
const SHARED_DIFFICULTY_WEIGHT: i64 = 3;
const RECENT_ACTIVITY_BONUS: i64 = 2;
const RECENT_ACTIVITY_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize)]
pub struct FriendSuggestion {
    pub user: UserInfo,
    pub mutual_friends_count: i64,
    pub common_cuisines: Vec<String>,
    pub suggestion_score: i64,
    pub reason: String,
}

/// Ranked friend suggestions for `user`. Empty when the user has opted out
/// of discovery. Candidates sharing any edge with the user, in any state,
/// are excluded up front; only positive scores survive. Ties break on
/// candidate user id ascending so the ranking is deterministic.
pub async fn suggest(
    pool: &SqlitePool,
    user: &UserRow,
    limit: usize,
) -> Result<Vec<FriendSuggestion>, AppError> {
    if !user.is_discoverable() {
        return Ok(Vec::new());
    }

    let connected: HashSet<String> = friendship_repo::list_connected_ids(pool, &user.user_id)
        .await?
        .into_iter()
        .collect();

    let candidates: Vec<UserRow> = user_repo::list_discoverable_except(pool, &user.user_id)
        .await?
        .into_iter()
        .filter(|c| !connected.contains(&c.user_id))
        .collect();

    let own_friends: HashSet<String> = friendship_repo::list_friend_ids(pool, &user.user_id)
        .await?
        .into_iter()
        .collect();
    let own_cuisines: BTreeSet<String> = post_repo::published_cuisines_of(pool, &user.user_id)
        .await?
        .into_iter()
        .collect();
    let own_difficulties: BTreeSet<String> =
        post_repo::published_difficulties_of(pool, &user.user_id)
            .await?
            .into_iter()
            .collect();
    let recency_cutoff =
        (Utc::now() - Duration::days(RECENT_ACTIVITY_WINDOW_DAYS)).to_rfc3339();

    let mut suggestions = Vec::new();
    for candidate in candidates {
        let mut score = 0;
        let mut reasons: Vec<String> = Vec::new();

        let candidate_friends = friendship_repo::list_friend_ids(pool, &candidate.user_id).await?;
        let mutual_count = candidate_friends
            .iter()
            .filter(|id| own_friends.contains(*id))
            .count() as i64;
        if mutual_count > 0 {
            score += mutual_count * MUTUAL_FRIEND_WEIGHT;
            let plural = if mutual_count == 1 { "" } else { "s" };
            reasons.push(format!("{mutual_count} mutual friend{plural}"));
        }

        let candidate_cuisines: BTreeSet<String> =
            post_repo::published_cuisines_of(pool, &candidate.user_id)
                .await?
                .into_iter()
                .collect();
        let common_cuisines: Vec<String> = own_cuisines
            .intersection(&candidate_cuisines)
            .cloned()
            .collect();
        if !common_cuisines.is_empty() {
            score += common_cuisines.len() as i64 * SHARED_CUISINE_WEIGHT;
            let named = common_cuisines
                .iter()
                .take(2)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            reasons.push(format!("Cooks {named} cuisine"));
        }

        let candidate_difficulties: BTreeSet<String> =
            post_repo::published_difficulties_of(pool, &candidate.user_id)
                .await?
                .into_iter()
                .collect();
        let common_difficulties = own_difficulties
            .intersection(&candidate_difficulties)
            .count() as i64;
        if common_difficulties > 0 {
            score += common_difficulties * SHARED_DIFFICULTY_WEIGHT;
            reasons.push("Similar cooking difficulty".to_string());
        }

        if post_repo::has_post_since(pool, &candidate.user_id, &recency_cutoff).await? {
            score += RECENT_ACTIVITY_BONUS;
            reasons.push("Active user".to_string());
        }

        if score <= 0 {
            continue;
        }

        let reason = if reasons.is_empty() {
            "New user".to_string()
        } else {
            reasons.join(" • ")
        };

        suggestions.push(FriendSuggestion {
            user: UserInfo::from(&candidate),
            mutual_friends_count: mutual_count,
            common_cuisines,
            suggestion_score: score,
            reason,
        });
    }

    suggestions.sort_by(|a, b| {
        b.suggestion_score
            .cmp(&a.suggestion_score)
            .then_with(|| a.user.user_id.cmp(&b.user.user_id))
    });
    suggestions.truncate(limit);
    Ok(suggestions)
}

/// Suggestion variant for the explore page: over-fetches twice the limit,
/// then keeps only candidates whose shared cuisines contain the filter
/// (case-insensitive).
pub async fn explore(
    pool: &SqlitePool,
    user: &UserRow,
    cuisine_filter: Option<&str>,
    limit: usize,
) -> Result<Vec<FriendSuggestion>, AppError> {
    let mut suggestions = suggest(pool, user, limit * 2).await?;

    if let Some(filter) = cuisine_filter {
        let filter = filter.to_lowercase();
        suggestions.retain(|s| {
            s.common_cuisines
                .iter()
                .any(|c| c.to_lowercase() == filter)
        });
    }

    suggestions.truncate(limit);
    Ok(suggestions)
}
