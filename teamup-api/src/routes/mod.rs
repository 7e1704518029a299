pub mod auth;
pub mod feed;
pub mod games;
pub mod health;
pub mod matches;
pub mod messages;
pub mod moderation;
pub mod profile;
pub mod swipe;
