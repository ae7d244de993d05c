use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{friendship_repo, user_repo};
use crate::error::is_unique_violation;
use crate::models::{FriendshipRow, FriendshipStatus, RelationshipType, UserRow};
use crate::AppError;

/// Relationship between two users from `a`'s point of view, with the
/// backing edge when one exists. `a == b` classifies as `Own` without
/// touching storage.
pub async fn get_relationship(
    pool: &SqlitePool,
    a: &str,
    b: &str,
) -> Result<(Option<FriendshipRow>, RelationshipType), AppError> {
    if a == b {
        return Ok((None, RelationshipType::Own));
    }

    let Some(edge) = friendship_repo::load_pair(pool, a, b).await? else {
        return Ok((None, RelationshipType::None));
    };

    let relationship = classify(&edge, a);
    Ok((Some(edge), relationship))
}

/// Classification of an existing edge from `viewer`'s side. Blocked is
/// reported the same to both parties.
fn classify(edge: &FriendshipRow, viewer: &str) -> RelationshipType {
    match edge.status() {
        FriendshipStatus::Accepted => RelationshipType::Friend,
        FriendshipStatus::Blocked => RelationshipType::Blocked,
        FriendshipStatus::Declined => RelationshipType::Declined,
        FriendshipStatus::Pending => {
            if edge.requester_id == viewer {
                RelationshipType::PendingSent
            } else {
                RelationshipType::PendingReceived
            }
        }
    }
}

/// Create a pending edge from `from` to `to`. Any existing edge in any
/// state rejects the request; a declined request is not re-sendable. Two
/// racing sends for the same pair collapse to one success, the loser
/// surfaces as Conflict via the canonical-pair unique index.
pub async fn send_request(
    pool: &SqlitePool,
    from: &str,
    to: &str,
) -> Result<FriendshipRow, AppError> {
    if from == to {
        return Err(AppError::invalid_state(
            "cannot send a friend request to yourself",
        ));
    }

    let mut tx = pool.begin().await?;

    if user_repo::load_by_id(&mut *tx, to).await?.is_none() {
        return Err(AppError::NotFound("user"));
    }

    if let Some(edge) = friendship_repo::load_pair(&mut *tx, from, to).await? {
        let reason = match classify(&edge, from) {
            RelationshipType::Friend => "already friends with this user",
            RelationshipType::PendingSent => "friend request already sent",
            RelationshipType::PendingReceived => {
                "this user has already sent you a friend request"
            }
            RelationshipType::Blocked => "cannot send a friend request to this user",
            RelationshipType::Declined => "a previous request was declined",
            _ => "a relationship with this user already exists",
        };
        return Err(AppError::invalid_state(reason));
    }

    let friendship_id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    let insert = friendship_repo::insert_edge(
        &mut *tx,
        friendship_repo::NewFriendship {
            friendship_id: &friendship_id,
            requester_id: from,
            addressee_id: to,
            status: FriendshipStatus::Pending.as_str(),
            created_at: &now,
        },
    )
    .await;

    match insert {
        Ok(()) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::conflict(
                "a relationship for this pair already exists",
            ));
        }
        Err(e) => return Err(e.into()),
    }

    tx.commit().await?;
    tracing::info!(from = %from, to = %to, "friend request sent");

    let edge = friendship_repo::load_by_id(pool, &friendship_id)
        .await?
        .ok_or(AppError::NotFound("friend request"))?;
    Ok(edge)
}

/// Accept or decline a pending request. Only the addressee may respond.
pub async fn respond(
    pool: &SqlitePool,
    request_id: &str,
    responder: &str,
    accept: bool,
) -> Result<FriendshipRow, AppError> {
    let mut tx = pool.begin().await?;

    let edge = friendship_repo::load_by_id(&mut *tx, request_id)
        .await?
        .ok_or(AppError::NotFound("friend request"))?;

    if edge.addressee_id != responder {
        return Err(AppError::Forbidden(
            "only the addressee can respond to this request",
        ));
    }
    if edge.status() != FriendshipStatus::Pending {
        return Err(AppError::invalid_state("request is no longer pending"));
    }

    let status = if accept {
        FriendshipStatus::Accepted
    } else {
        FriendshipStatus::Declined
    };
    let now = Utc::now().to_rfc3339();
    friendship_repo::update_status(&mut *tx, request_id, status.as_str(), &now).await?;
    tx.commit().await?;

    tracing::info!(request = %request_id, accepted = accept, "friend request answered");

    friendship_repo::load_by_id(pool, request_id)
        .await?
        .ok_or(AppError::NotFound("friend request"))
}

/// Withdraw a pending request. Only the requester may cancel; the edge is
/// deleted, returning the pair to `none`.
pub async fn cancel(pool: &SqlitePool, request_id: &str, canceler: &str) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let edge = friendship_repo::load_by_id(&mut *tx, request_id)
        .await?
        .ok_or(AppError::NotFound("friend request"))?;

    if edge.requester_id != canceler {
        return Err(AppError::Forbidden("only the requester can cancel this request"));
    }
    if edge.status() != FriendshipStatus::Pending {
        return Err(AppError::invalid_state("can only cancel pending requests"));
    }

    friendship_repo::delete_edge(&mut *tx, request_id).await?;
    tx.commit().await?;
    Ok(())
}

/// Delete an accepted edge. Rejected unless the pair is currently friends.
pub async fn unfriend(pool: &SqlitePool, actor: &str, other: &str) -> Result<(), AppError> {
    if actor == other {
        return Err(AppError::invalid_state("cannot unfriend yourself"));
    }

    let mut tx = pool.begin().await?;

    let edge = friendship_repo::load_pair(&mut *tx, actor, other).await?;
    let Some(edge) = edge.filter(|e| e.status() == FriendshipStatus::Accepted) else {
        return Err(AppError::invalid_state("you are not friends with this user"));
    };

    friendship_repo::delete_edge(&mut *tx, &edge.friendship_id).await?;
    tx.commit().await?;
    tracing::info!(actor = %actor, other = %other, "unfriended");
    Ok(())
}

/// Block a user. An existing edge in any non-blocked state flips to
/// blocked, re-oriented so the blocker is recorded as requester; no edge
/// means a fresh blocked edge is created.
pub async fn block(
    pool: &SqlitePool,
    blocker: &str,
    target: &str,
) -> Result<FriendshipRow, AppError> {
    if blocker == target {
        return Err(AppError::invalid_state("cannot block yourself"));
    }

    let mut tx = pool.begin().await?;

    if user_repo::load_by_id(&mut *tx, target).await?.is_none() {
        return Err(AppError::NotFound("user"));
    }

    let now = Utc::now().to_rfc3339();
    let friendship_id = match friendship_repo::load_pair(&mut *tx, blocker, target).await? {
        Some(edge) => {
            if edge.status() == FriendshipStatus::Blocked {
                return Err(AppError::invalid_state("user is already blocked"));
            }
            friendship_repo::reorient_to_blocked(
                &mut *tx,
                &edge.friendship_id,
                blocker,
                target,
                &now,
            )
            .await?;
            edge.friendship_id
        }
        None => {
            let friendship_id = Uuid::new_v4().to_string();
            let insert = friendship_repo::insert_edge(
                &mut *tx,
                friendship_repo::NewFriendship {
                    friendship_id: &friendship_id,
                    requester_id: blocker,
                    addressee_id: target,
                    status: FriendshipStatus::Blocked.as_str(),
                    created_at: &now,
                },
            )
            .await;
            match insert {
                Ok(()) => {}
                Err(e) if is_unique_violation(&e) => {
                    return Err(AppError::conflict(
                        "a relationship for this pair already exists",
                    ));
                }
                Err(e) => return Err(e.into()),
            }
            friendship_id
        }
    };

    tx.commit().await?;
    tracing::info!(blocker = %blocker, target = %target, "user blocked");

    friendship_repo::load_by_id(pool, &friendship_id)
        .await?
        .ok_or_else(|| AppError::NotFound("friendship"))
}

/// Remove a block. The edge is deleted outright; whatever state preceded
/// the block is not restored.
pub async fn unblock(pool: &SqlitePool, blocker: &str, target: &str) -> Result<(), AppError> {
    if blocker == target {
        return Err(AppError::invalid_state("cannot unblock yourself"));
    }

    let mut tx = pool.begin().await?;

    let edge = friendship_repo::load_pair(&mut *tx, blocker, target).await?;
    let Some(edge) = edge.filter(|e| e.status() == FriendshipStatus::Blocked) else {
        return Err(AppError::invalid_state("user is not blocked"));
    };

    friendship_repo::delete_edge(&mut *tx, &edge.friendship_id).await?;
    tx.commit().await?;
    tracing::info!(blocker = %blocker, target = %target, "user unblocked");
    Ok(())
}

/// Accepted-edge neighbours of `user_id`, resolved to user rows.
pub async fn list_friends(pool: &SqlitePool, user_id: &str) -> Result<Vec<UserRow>, AppError> {
    let friend_ids = friendship_repo::list_friend_ids(pool, user_id).await?;
    Ok(user_repo::load_by_ids(pool, &friend_ids).await?)
}

/// Users who are friends with both `a` and `b`.
pub async fn mutual_friends(
    pool: &SqlitePool,
    a: &str,
    b: &str,
) -> Result<Vec<UserRow>, AppError> {
    let ids_a = friendship_repo::list_friend_ids(pool, a).await?;
    let ids_b: std::collections::HashSet<String> = friendship_repo::list_friend_ids(pool, b)
        .await?
        .into_iter()
        .collect();

    let mutual: Vec<String> = ids_a.into_iter().filter(|id| ids_b.contains(id)).collect();
    Ok(user_repo::load_by_ids(pool, &mutual).await?)
}

/// Privacy gate for a friends list. Owner always sees their own; otherwise
/// the owner's visibility flag decides, with `friends_only` checking the
/// live relationship.
pub async fn can_view_friends_list(
    pool: &SqlitePool,
    viewer: &str,
    owner: &UserRow,
) -> Result<bool, AppError> {
    if viewer == owner.user_id {
        return Ok(true);
    }

    use crate::models::FriendsListVisibility::*;
    match owner.visibility() {
        Public => Ok(true),
        Private => Ok(false),
        FriendsOnly => {
            let (_, relationship) = get_relationship(pool, viewer, &owner.user_id).await?;
            Ok(relationship == RelationshipType::Friend)
        }
    }
}

/// Users `user_id` has blocked, resolved to user rows.
pub async fn list_blocked(pool: &SqlitePool, user_id: &str) -> Result<Vec<UserRow>, AppError> {
    let ids = friendship_repo::list_blocked_ids(pool, user_id).await?;
    Ok(user_repo::load_by_ids(pool, &ids).await?)
}

pub async fn sent_requests(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<FriendshipRow>, AppError> {
    Ok(friendship_repo::list_pending_sent(pool, user_id).await?)
}

pub async fn received_requests(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<FriendshipRow>, AppError> {
    Ok(friendship_repo::list_pending_received(pool, user_id).await?)
}
