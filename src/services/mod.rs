pub mod friendship_service;
pub mod post_service;
pub mod suggestion_service;
pub mod user_service;
