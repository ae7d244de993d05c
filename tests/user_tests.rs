mod common;

use chrono::{Duration, Utc};
use common::{create_user, publish_recipe, test_pool};
use tastebook::models::FriendsListVisibility;
use tastebook::services::{friendship_service, post_service, user_service};
use tastebook::AppError;

#[test]
fn username_change_allowed_when_never_changed() {
    let now = Utc::now();
    let (allowed, days) = user_service::can_change_username(None, 3, now);
    assert!(allowed);
    assert_eq!(days, 0);
    assert_eq!(user_service::next_username_change_date(None, 3, now), now);
}

#[test]
fn username_change_cooldown_boundaries() {
    let now = Utc::now();

    // 89 of 90 days served: one day left.
    let last = now - Duration::days(89) - Duration::hours(1);
    let (allowed, days) = user_service::can_change_username(Some(last), 3, now);
    assert!(!allowed);
    assert_eq!(days, 1);

    // 91 days ago: eligible again.
    let last = now - Duration::days(91);
    let (allowed, days) = user_service::can_change_username(Some(last), 3, now);
    assert!(allowed);
    assert_eq!(days, 0);

    // Just changed: the full wait remains, partial day rounds up.
    let last = now - Duration::hours(1);
    let (allowed, days) = user_service::can_change_username(Some(last), 3, now);
    assert!(!allowed);
    assert_eq!(days, 90);
}

#[test]
fn next_change_date_is_last_change_plus_wait() {
    let now = Utc::now();
    let last = now - Duration::days(10);
    let next = user_service::next_username_change_date(Some(last), 3, now);
    assert_eq!(next, last + Duration::days(90));
}

#[tokio::test]
async fn register_rejects_duplicate_email_and_username() {
    let pool = test_pool().await;
    create_user(&pool, "alice").await;

    let err = user_service::register(&pool, "alice@example.com", Some("other"), "hash")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    let err = user_service::register(&pool, "fresh@example.com", Some("alice"), "hash")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn profile_patch_updates_only_provided_fields() {
    let pool = test_pool().await;
    let alice = create_user(&pool, "alice").await;

    let updated = user_service::update_profile(
        &pool,
        &alice.user_id,
        user_service::UserPatch {
            bio: Some("I cook".to_string()),
            friends_list_visibility: Some(FriendsListVisibility::Private),
            ..Default::default()
        },
        3,
    )
    .await
    .unwrap();

    assert_eq!(updated.bio.as_deref(), Some("I cook"));
    assert_eq!(updated.visibility(), FriendsListVisibility::Private);
    // Untouched fields survive.
    assert_eq!(updated.username.as_deref(), Some("alice"));
    assert!(updated.is_discoverable());
    assert!(updated.username_last_changed.is_none());
}

#[tokio::test]
async fn username_change_stamps_cooldown_and_blocks_the_next_one() {
    let pool = test_pool().await;
    let alice = create_user(&pool, "alice").await;

    let updated = user_service::update_profile(
        &pool,
        &alice.user_id,
        user_service::UserPatch {
            username: Some("alice-cooks".to_string()),
            ..Default::default()
        },
        3,
    )
    .await
    .unwrap();
    assert_eq!(updated.username.as_deref(), Some("alice-cooks"));
    assert!(updated.username_last_changed.is_some());

    let err = user_service::update_profile(
        &pool,
        &alice.user_id,
        user_service::UserPatch {
            username: Some("alice-bakes".to_string()),
            ..Default::default()
        },
        3,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    // Re-sending the current username is a no-op, not a change.
    let same = user_service::update_profile(
        &pool,
        &alice.user_id,
        user_service::UserPatch {
            username: Some("alice-cooks".to_string()),
            ..Default::default()
        },
        3,
    )
    .await
    .unwrap();
    assert_eq!(same.username.as_deref(), Some("alice-cooks"));
}

#[tokio::test]
async fn username_change_rejects_taken_name() {
    let pool = test_pool().await;
    let _bob = create_user(&pool, "bob").await;
    let alice = create_user(&pool, "alice").await;

    let err = user_service::update_profile(
        &pool,
        &alice.user_id,
        user_service::UserPatch {
            username: Some("bob".to_string()),
            ..Default::default()
        },
        3,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn delete_user_cascades_posts_and_edges() {
    let pool = test_pool().await;
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;
    let carol = create_user(&pool, "carol").await;

    publish_recipe(&pool, &alice, Some("italian"), None).await;
    let edge = friendship_service::send_request(&pool, &alice.user_id, &bob.user_id)
        .await
        .unwrap();
    friendship_service::respond(&pool, &edge.friendship_id, &bob.user_id, true)
        .await
        .unwrap();
    friendship_service::block(&pool, &carol.user_id, &alice.user_id)
        .await
        .unwrap();

    user_service::delete_user(&pool, &alice.user_id).await.unwrap();

    let err = user_service::get_user(&pool, &alice.user_id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let posts = post_service::list_by_user(&pool, &alice.user_id).await.unwrap();
    assert!(posts.is_empty());

    // No edge may reference the deleted user from either side.
    let orphans: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM friendships WHERE requester_id = ?1 OR addressee_id = ?1",
    )
    .bind(&alice.user_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(orphans, 0);

    // Unrelated state survives.
    assert!(user_service::get_user(&pool, &bob.user_id).await.is_ok());
}

#[tokio::test]
async fn search_matches_email_and_username() {
    let pool = test_pool().await;
    create_user(&pool, "alice").await;
    create_user(&pool, "bob").await;

    let hits = user_service::search_users(&pool, "ali").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].username.as_deref(), Some("alice"));

    let empty = user_service::search_users(&pool, "  ").await.unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn post_lifecycle_stamps_timestamps_and_guards_ownership() {
    let pool = test_pool().await;
    let alice = create_user(&pool, "alice").await;
    let bob = create_user(&pool, "bob").await;

    let draft = post_service::create_draft(
        &pool,
        &alice.user_id,
        post_service::NewPostInput {
            title: "Carbonara".to_string(),
            description: None,
            ingredients: Some(vec!["eggs".to_string(), "guanciale".to_string()]),
            instructions: "whisk, fry, toss".to_string(),
            prep_time: Some(10),
            cook_time: Some(15),
            servings: Some(2),
            difficulty_level: Some("medium".to_string()),
            cuisine_type: Some("italian".to_string()),
            image_url: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(draft.status, "draft");
    assert!(draft.published_at.is_none());

    // Drafts are invisible to everyone but the owner.
    let err = post_service::get_post(&pool, &draft.post_id, &bob.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // Only the owner may publish.
    let err = post_service::publish(&pool, &draft.post_id, &bob.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let published = post_service::publish(&pool, &draft.post_id, &alice.user_id)
        .await
        .unwrap();
    assert_eq!(published.status, "published");
    assert!(published.published_at.is_some());

    // Publishing twice is a state error.
    let err = post_service::publish(&pool, &draft.post_id, &alice.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    // Archive only from published, restore only from archived.
    let archived = post_service::archive(&pool, &draft.post_id, &alice.user_id)
        .await
        .unwrap();
    assert_eq!(archived.status, "archived");
    assert!(archived.archived_at.is_some());

    let restored = post_service::unarchive(&pool, &draft.post_id, &alice.user_id)
        .await
        .unwrap();
    assert_eq!(restored.status, "published");
    assert!(restored.archived_at.is_none());
}

#[tokio::test]
async fn published_signals_ignore_drafts() {
    let pool = test_pool().await;
    let alice = create_user(&pool, "alice").await;

    publish_recipe(&pool, &alice, Some("japanese"), Some("hard")).await;
    // A draft with another cuisine must not leak into signals.
    post_service::create_draft(
        &pool,
        &alice.user_id,
        post_service::NewPostInput {
            title: "wip".to_string(),
            description: None,
            ingredients: None,
            instructions: "tbd".to_string(),
            prep_time: None,
            cook_time: None,
            servings: None,
            difficulty_level: Some("easy".to_string()),
            cuisine_type: Some("fusion".to_string()),
            image_url: None,
        },
    )
    .await
    .unwrap();

    let cuisines = post_service::published_cuisines_of(&pool, &alice.user_id)
        .await
        .unwrap();
    assert_eq!(cuisines, vec!["japanese".to_string()]);

    let difficulties = post_service::published_difficulties_of(&pool, &alice.user_id)
        .await
        .unwrap();
    assert_eq!(difficulties, vec!["hard".to_string()]);

    // The draft still counts as recent activity: recency follows creation
    // time, not publish time.
    assert!(post_service::has_recent_activity(&pool, &alice.user_id, 30)
        .await
        .unwrap());
}
