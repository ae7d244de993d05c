pub mod friendship;
pub mod posts;
pub mod users;

pub use friendship::{FriendshipRow, FriendshipStatus, RelationshipType};
pub use posts::{PostRow, PostStatus};
pub use users::{FriendsListVisibility, UserInfo, UserRow};
