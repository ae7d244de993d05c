use serde::Serialize;

/// One edge between two users. Directional in storage (requester sent the
/// request, or placed the block) but symmetric in meaning: `user_lo` and
/// `user_hi` hold the canonicalized unordered pair so at most one row can
/// exist per pair regardless of direction.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FriendshipRow {
    pub friendship_id: String,
    pub requester_id: String,
    pub addressee_id: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl FriendshipRow {
    pub fn status(&self) -> FriendshipStatus {
        FriendshipStatus::parse(&self.status)
    }

    /// The other side of the edge, from `user_id`'s point of view.
    pub fn other_user(&self, user_id: &str) -> &str {
        if self.requester_id == user_id {
            &self.addressee_id
        } else {
            &self.requester_id
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Declined,
    Blocked,
}

impl FriendshipStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "accepted" => Self::Accepted,
            "declined" => Self::Declined,
            "blocked" => Self::Blocked,
            _ => Self::Pending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Blocked => "blocked",
        }
    }
}

/// How two users relate, from the first user's point of view. Blocked is
/// reported identically to both sides: a blocked party sees "blocked"
/// without learning who placed the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    #[serde(rename = "self")]
    Own,
    None,
    Friend,
    PendingSent,
    PendingReceived,
    Blocked,
    Declined,
}

impl RelationshipType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Own => "self",
            Self::None => "none",
            Self::Friend => "friend",
            Self::PendingSent => "pending_sent",
            Self::PendingReceived => "pending_received",
            Self::Blocked => "blocked",
            Self::Declined => "declined",
        }
    }
}
