pub mod auth;
pub mod friends;
pub mod posts;
pub mod users;

use serde::Serialize;

use crate::models::{FriendshipRow, UserInfo};

/// One friend request, with both endpoints resolved to public user info.
#[derive(Debug, Serialize)]
pub struct FriendRequestResponse {
    pub id: String,
    pub requester: UserInfo,
    pub addressee: UserInfo,
    pub status: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl FriendRequestResponse {
    pub fn new(edge: &FriendshipRow, requester: UserInfo, addressee: UserInfo) -> Self {
        Self {
            id: edge.friendship_id.clone(),
            requester,
            addressee,
            status: edge.status.clone(),
            created_at: edge.created_at.clone(),
            updated_at: edge.updated_at.clone(),
        }
    }
}
