pub mod auth_service;
pub mod feed_service;
pub mod message_service;
pub mod profile_service;
pub mod swipe_service;
pub mod token_service;
