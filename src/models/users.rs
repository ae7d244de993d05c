use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: String,
    pub email: String,
    pub username: Option<String>,
    pub username_last_changed: Option<String>,
    pub password_hash: String,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub friends_list_visibility: String,
    pub discoverable_for_friends: i64,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl UserRow {
    pub fn visibility(&self) -> FriendsListVisibility {
        FriendsListVisibility::parse(&self.friends_list_visibility)
    }

    pub fn is_discoverable(&self) -> bool {
        self.discoverable_for_friends != 0
    }

    /// Parsed `username_last_changed`, dropping unparseable leftovers.
    pub fn username_changed_at(&self) -> Option<DateTime<Utc>> {
        self.username_last_changed
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Who may see a user's friends list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendsListVisibility {
    Public,
    FriendsOnly,
    Private,
}

impl FriendsListVisibility {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "friends_only" => Self::FriendsOnly,
            "private" => Self::Private,
            _ => Self::Public,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::FriendsOnly => "friends_only",
            Self::Private => "private",
        }
    }

    pub fn try_parse(raw: &str) -> Option<Self> {
        match raw {
            "public" => Some(Self::Public),
            "friends_only" => Some(Self::FriendsOnly),
            "private" => Some(Self::Private),
            _ => None,
        }
    }
}

/// Public projection of a user, embedded in friend/request/suggestion
/// responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub user_id: String,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
}

impl From<&UserRow> for UserInfo {
    fn from(row: &UserRow) -> Self {
        Self {
            user_id: row.user_id.clone(),
            username: row.username.clone(),
            bio: row.bio.clone(),
            profile_image_url: row.profile_image_url.clone(),
        }
    }
}
