use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::models::{FriendshipRow, UserInfo};
use crate::services::{friendship_service, suggestion_service, user_service};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::FriendRequestResponse;
use crate::{AppError, AppState};

async fn request_response(
    pool: &SqlitePool,
    edge: &FriendshipRow,
) -> Result<FriendRequestResponse, AppError> {
    let requester = user_service::get_user(pool, &edge.requester_id).await?;
    let addressee = user_service::get_user(pool, &edge.addressee_id).await?;
    Ok(FriendRequestResponse::new(
        edge,
        UserInfo::from(&requester),
        UserInfo::from(&addressee),
    ))
}

pub async fn send_request_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<FriendRequestResponse>), AppError> {
    let edge = friendship_service::send_request(&state.pool, &auth_user.id, &user_id).await?;
    let response = request_response(&state.pool, &edge).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn sent_requests_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<Vec<FriendRequestResponse>>, AppError> {
    let edges = friendship_service::sent_requests(&state.pool, &auth_user.id).await?;
    let mut out = Vec::with_capacity(edges.len());
    for edge in &edges {
        out.push(request_response(&state.pool, edge).await?);
    }
    Ok(Json(out))
}

pub async fn received_requests_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<Vec<FriendRequestResponse>>, AppError> {
    let edges = friendship_service::received_requests(&state.pool, &auth_user.id).await?;
    let mut out = Vec::with_capacity(edges.len());
    for edge in &edges {
        out.push(request_response(&state.pool, edge).await?);
    }
    Ok(Json(out))
}

pub async fn accept_request_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(request_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<FriendRequestResponse>, AppError> {
    let edge = friendship_service::respond(&state.pool, &request_id, &auth_user.id, true).await?;
    let response = request_response(&state.pool, &edge).await?;
    Ok(Json(response))
}

pub async fn decline_request_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(request_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<FriendRequestResponse>, AppError> {
    let edge = friendship_service::respond(&state.pool, &request_id, &auth_user.id, false).await?;
    let response = request_response(&state.pool, &edge).await?;
    Ok(Json(response))
}

pub async fn cancel_request_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(request_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    friendship_service::cancel(&state.pool, &request_id, &auth_user.id).await?;
    Ok(Json(json!({
        "message": "friend request cancelled",
        "cancelled_at": Utc::now().to_rfc3339(),
    })))
}

#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl PageQuery {
    fn limit(&self) -> usize {
        self.limit.unwrap_or(50).clamp(1, 100)
    }

    fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

#[derive(Debug, Serialize)]
pub struct FriendsListResponse {
    pub friends: Vec<UserInfo>,
    pub total_count: usize,
    pub can_view: bool,
}

pub async fn my_friends_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<FriendsListResponse>, AppError> {
    let friends = friendship_service::list_friends(&state.pool, &auth_user.id).await?;
    Ok(Json(paginate(friends.iter().map(UserInfo::from), &page)))
}

/// Someone else's friends list. A privacy denial is an empty list with
/// `can_view=false`, never an error.
pub async fn user_friends_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<FriendsListResponse>, AppError> {
    let owner = user_service::get_user(&state.pool, &user_id).await?;

    if !friendship_service::can_view_friends_list(&state.pool, &auth_user.id, &owner).await? {
        return Ok(Json(FriendsListResponse {
            friends: Vec::new(),
            total_count: 0,
            can_view: false,
        }));
    }

    let friends = friendship_service::list_friends(&state.pool, &user_id).await?;
    Ok(Json(paginate(friends.iter().map(UserInfo::from), &page)))
}

fn paginate(friends: impl Iterator<Item = UserInfo>, page: &PageQuery) -> FriendsListResponse {
    let all: Vec<UserInfo> = friends.collect();
    let total_count = all.len();
    let friends = all
        .into_iter()
        .skip(page.offset())
        .take(page.limit())
        .collect();
    FriendsListResponse {
        friends,
        total_count,
        can_view: true,
    }
}

pub async fn unfriend_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    friendship_service::unfriend(&state.pool, &auth_user.id, &user_id).await?;
    Ok(Json(json!({
        "message": "friend removed",
        "removed_at": Utc::now().to_rfc3339(),
    })))
}

pub async fn mutual_friends_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserInfo>>, AppError> {
    if user_id == auth_user.id {
        return Err(AppError::invalid_state(
            "cannot get mutual friends with yourself",
        ));
    }
    // Surface a missing target before computing anything.
    user_service::get_user(&state.pool, &user_id).await?;

    let mutual = friendship_service::mutual_friends(&state.pool, &auth_user.id, &user_id).await?;
    Ok(Json(mutual.iter().map(UserInfo::from).collect()))
}

#[derive(Debug, Serialize)]
pub struct FriendshipStatusResponse {
    pub status: Option<String>,
    pub is_friend: bool,
    pub can_send_request: bool,
    pub request_id: Option<String>,
    pub relationship_type: &'static str,
}

pub async fn status_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<FriendshipStatusResponse>, AppError> {
    use crate::models::RelationshipType;

    if user_id != auth_user.id {
        user_service::get_user(&state.pool, &user_id).await?;
    }

    let (edge, relationship) =
        friendship_service::get_relationship(&state.pool, &auth_user.id, &user_id).await?;

    Ok(Json(FriendshipStatusResponse {
        status: edge.as_ref().map(|e| e.status.clone()),
        is_friend: relationship == RelationshipType::Friend,
        can_send_request: relationship == RelationshipType::None,
        request_id: edge.map(|e| e.friendship_id),
        relationship_type: relationship.as_str(),
    }))
}

pub async fn block_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    friendship_service::block(&state.pool, &auth_user.id, &user_id).await?;
    Ok(Json(json!({
        "message": "user blocked",
        "blocked_at": Utc::now().to_rfc3339(),
    })))
}

pub async fn unblock_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    friendship_service::unblock(&state.pool, &auth_user.id, &user_id).await?;
    Ok(Json(json!({
        "message": "user unblocked",
        "unblocked_at": Utc::now().to_rfc3339(),
    })))
}

pub async fn blocked_users_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserInfo>>, AppError> {
    let blocked = friendship_service::list_blocked(&state.pool, &auth_user.id).await?;
    Ok(Json(blocked.iter().map(UserInfo::from).collect()))
}

#[derive(Debug, Deserialize, Default)]
pub struct SuggestionsQuery {
    pub limit: Option<usize>,
}

pub async fn suggestions_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Query(query): Query<SuggestionsQuery>,
) -> Result<Json<Vec<suggestion_service::FriendSuggestion>>, AppError> {
    let user = user_service::get_user(&state.pool, &auth_user.id).await?;
    let limit = query.limit.unwrap_or(10).clamp(1, 20);
    let suggestions = suggestion_service::suggest(&state.pool, &user, limit).await?;
    Ok(Json(suggestions))
}

#[derive(Debug, Deserialize, Default)]
pub struct ExploreQuery {
    pub cuisine_filter: Option<String>,
    pub limit: Option<usize>,
}

pub async fn explore_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Query(query): Query<ExploreQuery>,
) -> Result<Json<Vec<suggestion_service::FriendSuggestion>>, AppError> {
    let user = user_service::get_user(&state.pool, &auth_user.id).await?;
    let limit = query.limit.unwrap_or(20).clamp(1, 50);
    let suggestions = suggestion_service::explore(
        &state.pool,
        &user,
        query.cuisine_filter.as_deref(),
        limit,
    )
    .await?;
    Ok(Json(suggestions))
}
