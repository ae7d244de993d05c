mod common;

use common::{backdate_posts, create_user, publish_recipe, test_pool};
use sqlx::SqlitePool;
use tastebook::models::UserRow;
use tastebook::services::{friendship_service, suggestion_service};

async fn befriend(pool: &SqlitePool, a: &UserRow, b: &UserRow) {
    let edge = friendship_service::send_request(pool, &a.user_id, &b.user_id)
        .await
        .unwrap();
    friendship_service::respond(pool, &edge.friendship_id, &b.user_id, true)
        .await
        .unwrap();
}

#[tokio::test]
async fn score_combines_all_signals() {
    let pool = test_pool().await;
    let user = create_user(&pool, "user").await;
    let candidate = create_user(&pool, "candidate").await;
    let mutual1 = create_user(&pool, "mutual1").await;
    let mutual2 = create_user(&pool, "mutual2").await;

    // 2 mutual friends.
    befriend(&pool, &user, &mutual1).await;
    befriend(&pool, &user, &mutual2).await;
    befriend(&pool, &candidate, &mutual1).await;
    befriend(&pool, &candidate, &mutual2).await;

    // 1 shared cuisine, disjoint difficulties; candidate posted recently.
    publish_recipe(&pool, &user, Some("italian"), Some("easy")).await;
    publish_recipe(&pool, &candidate, Some("italian"), Some("hard")).await;

    let suggestions = suggestion_service::suggest(&pool, &user, 10).await.unwrap();
    let hit = suggestions
        .iter()
        .find(|s| s.user.user_id == candidate.user_id)
        .expect("candidate suggested");

    // 2*10 mutuals + 1*5 cuisine + 0 difficulty + 2 recent activity.
    assert_eq!(hit.suggestion_score, 27);
    assert_eq!(hit.mutual_friends_count, 2);
    assert_eq!(hit.common_cuisines, vec!["italian".to_string()]);
    assert!(hit.reason.contains("2 mutual friends"));
    assert!(hit.reason.contains("italian"));
    assert!(hit.reason.contains("Active user"));
    assert!(!hit.reason.contains("Similar cooking difficulty"));
}

#[tokio::test]
async fn difficulty_overlap_and_stale_activity() {
    let pool = test_pool().await;
    let user = create_user(&pool, "user").await;
    let candidate = create_user(&pool, "candidate").await;

    publish_recipe(&pool, &user, Some("mexican"), Some("easy")).await;
    publish_recipe(&pool, &candidate, Some("mexican"), Some("easy")).await;
    backdate_posts(&pool, &candidate.user_id, 45).await;

    let suggestions = suggestion_service::suggest(&pool, &user, 10).await.unwrap();
    let hit = suggestions
        .iter()
        .find(|s| s.user.user_id == candidate.user_id)
        .expect("candidate suggested");

    // 5 cuisine + 3 difficulty, no mutuals, not recent.
    assert_eq!(hit.suggestion_score, 8);
    assert!(hit.reason.contains("Similar cooking difficulty"));
    assert!(!hit.reason.contains("Active user"));
}

#[tokio::test]
async fn non_discoverable_user_gets_nothing() {
    let pool = test_pool().await;
    let user = create_user(&pool, "user").await;
    let other = create_user(&pool, "other").await;
    publish_recipe(&pool, &user, Some("thai"), None).await;
    publish_recipe(&pool, &other, Some("thai"), None).await;

    sqlx::query("UPDATE users SET discoverable_for_friends = 0 WHERE user_id = ?1")
        .bind(&user.user_id)
        .execute(&pool)
        .await
        .unwrap();
    let user = tastebook::services::user_service::get_user(&pool, &user.user_id)
        .await
        .unwrap();

    let suggestions = suggestion_service::suggest(&pool, &user, 10).await.unwrap();
    assert!(suggestions.is_empty());
}

#[tokio::test]
async fn non_discoverable_candidates_are_excluded() {
    let pool = test_pool().await;
    let user = create_user(&pool, "user").await;
    let hidden = create_user(&pool, "hidden").await;
    publish_recipe(&pool, &user, Some("thai"), None).await;
    publish_recipe(&pool, &hidden, Some("thai"), None).await;

    sqlx::query("UPDATE users SET discoverable_for_friends = 0 WHERE user_id = ?1")
        .bind(&hidden.user_id)
        .execute(&pool)
        .await
        .unwrap();

    let suggestions = suggestion_service::suggest(&pool, &user, 10).await.unwrap();
    assert!(suggestions.iter().all(|s| s.user.user_id != hidden.user_id));
}

#[tokio::test]
async fn any_existing_edge_excludes_a_candidate() {
    let pool = test_pool().await;
    let user = create_user(&pool, "user").await;
    let pending = create_user(&pool, "pending").await;
    let declined = create_user(&pool, "declined").await;
    let blocked = create_user(&pool, "blocked").await;
    let free = create_user(&pool, "free").await;

    for candidate in [&pending, &declined, &blocked, &free] {
        publish_recipe(&pool, candidate, Some("french"), None).await;
    }
    publish_recipe(&pool, &user, Some("french"), None).await;

    friendship_service::send_request(&pool, &user.user_id, &pending.user_id)
        .await
        .unwrap();
    let edge = friendship_service::send_request(&pool, &user.user_id, &declined.user_id)
        .await
        .unwrap();
    friendship_service::respond(&pool, &edge.friendship_id, &declined.user_id, false)
        .await
        .unwrap();
    friendship_service::block(&pool, &user.user_id, &blocked.user_id)
        .await
        .unwrap();

    let suggestions = suggestion_service::suggest(&pool, &user, 10).await.unwrap();
    let ids: Vec<&str> = suggestions.iter().map(|s| s.user.user_id.as_str()).collect();
    assert_eq!(ids, vec![free.user_id.as_str()]);
}

#[tokio::test]
async fn zero_score_candidates_are_dropped() {
    let pool = test_pool().await;
    let user = create_user(&pool, "user").await;
    let quiet = create_user(&pool, "quiet").await;
    // Quiet has never posted and shares no friends: nothing to score.
    backdate_posts(&pool, &quiet.user_id, 60).await;

    let suggestions = suggestion_service::suggest(&pool, &user, 10).await.unwrap();
    assert!(suggestions.iter().all(|s| s.user.user_id != quiet.user_id));
}

#[tokio::test]
async fn ranking_is_deterministic_and_truncated() {
    let pool = test_pool().await;
    let user = create_user(&pool, "user").await;
    publish_recipe(&pool, &user, Some("korean"), None).await;

    // Three candidates with the identical single-cuisine score.
    let mut candidate_ids = Vec::new();
    for name in ["cand-a", "cand-b", "cand-c"] {
        let candidate = create_user(&pool, name).await;
        publish_recipe(&pool, &candidate, Some("korean"), None).await;
        backdate_posts(&pool, &candidate.user_id, 40).await;
        candidate_ids.push(candidate.user_id);
    }
    candidate_ids.sort();

    let suggestions = suggestion_service::suggest(&pool, &user, 10).await.unwrap();
    let got: Vec<&str> = suggestions.iter().map(|s| s.user.user_id.as_str()).collect();
    let expected: Vec<&str> = candidate_ids.iter().map(String::as_str).collect();
    assert_eq!(got, expected, "equal scores order by candidate id");

    let top_two = suggestion_service::suggest(&pool, &user, 2).await.unwrap();
    assert_eq!(top_two.len(), 2);
    assert_eq!(top_two[0].user.user_id, expected[0]);
}

#[tokio::test]
async fn explore_filters_by_common_cuisine_case_insensitively() {
    let pool = test_pool().await;
    let user = create_user(&pool, "user").await;
    let italian = create_user(&pool, "italian-cook").await;
    let mexican = create_user(&pool, "mexican-cook").await;

    publish_recipe(&pool, &user, Some("Italian"), None).await;
    publish_recipe(&pool, &user, Some("mexican"), None).await;
    publish_recipe(&pool, &italian, Some("Italian"), None).await;
    publish_recipe(&pool, &mexican, Some("mexican"), None).await;

    let results = suggestion_service::explore(&pool, &user, Some("ITALIAN"), 10)
        .await
        .unwrap();
    assert!(!results.is_empty());
    assert!(results.iter().all(|s| {
        s.common_cuisines
            .iter()
            .any(|c| c.eq_ignore_ascii_case("italian"))
    }));
    assert!(results.iter().all(|s| s.user.user_id != mexican.user_id));

    // Without a filter explore behaves like plain suggestions.
    let unfiltered = suggestion_service::explore(&pool, &user, None, 10)
        .await
        .unwrap();
    assert_eq!(unfiltered.len(), 2);
}
