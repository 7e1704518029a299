use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{
    availability_windows, blocks, games, matches, messages, profiles, reports, swipes, user_games,
    users,
};

// --- User ---

#[derive(Debug, Queryable, Identifiable, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

// --- Profile ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = profiles)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub nickname: String,
    pub bio: Option<String>,
    pub region: String,
    pub language: String,
    pub platforms: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = profiles)]
pub struct NewProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub nickname: String,
    pub bio: Option<String>,
    pub region: String,
    pub language: String,
    pub platforms: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Game ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = games)]
pub struct Game {
    pub id: Uuid,
    pub name: String,
    pub icon: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = games)]
pub struct NewGame {
    pub id: Uuid,
    pub name: String,
    pub icon: Option<String>,
}

// --- UserGame ---

#[derive(Debug, Queryable, Identifiable, Clone)]
#[diesel(table_name = user_games)]
pub struct UserGame {
    pub id: Uuid,
    pub user_id: Uuid,
    pub game_id: Uuid,
    pub rank: Option<String>,
    pub roles: serde_json::Value,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_games)]
pub struct NewUserGame {
    pub id: Uuid,
    pub user_id: Uuid,
    pub game_id: Uuid,
    pub rank: Option<String>,
    pub roles: serde_json::Value,
}

// --- AvailabilityWindow ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = availability_windows)]
pub struct AvailabilityWindow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = availability_windows)]
pub struct NewAvailabilityWindow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
}

// --- Swipe ---

/// Swipe kinds as stored in `swipes.kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeKind {
    Like,
    Pass,
    Superlike,
}

impl SwipeKind {
    /// Kinds that express interest; `pass` never participates in matching.
    pub fn counts_toward_match(&self) -> bool {
        matches!(self, SwipeKind::Like | SwipeKind::Superlike)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeKind::Like => "like",
            SwipeKind::Pass => "pass",
            SwipeKind::Superlike => "superlike",
        }
    }
}

impl std::fmt::Display for SwipeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SwipeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(SwipeKind::Like),
            "pass" => Ok(SwipeKind::Pass),
            "superlike" => Ok(SwipeKind::Superlike),
            _ => Err(format!("unknown swipe kind: {s}")),
        }
    }
}

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = swipes)]
pub struct Swipe {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = swipes)]
pub struct NewSwipe {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

// --- Match ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = matches)]
pub struct Match {
    pub id: Uuid,
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub matched_at: DateTime<Utc>,
    pub last_message_at: Option<DateTime<Utc>>,
}

impl Match {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user_a == user_id || self.user_b == user_id
    }

    /// The participant on the other side of the match.
    pub fn other_participant(&self, user_id: Uuid) -> Uuid {
        if self.user_a == user_id {
            self.user_b
        } else {
            self.user_a
        }
    }
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = matches)]
pub struct NewMatch {
    pub id: Uuid,
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub matched_at: DateTime<Utc>,
    pub last_message_at: Option<DateTime<Utc>>,
}

// --- Message ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = messages)]
pub struct Message {
    pub id: Uuid,
    pub match_id: Uuid,
    pub sender_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessage {
    pub id: Uuid,
    pub match_id: Uuid,
    pub sender_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

// --- Block ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = blocks)]
#[diesel(primary_key(user_id, blocked_user_id))]
pub struct Block {
    pub user_id: Uuid,
    pub blocked_user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = blocks)]
pub struct NewBlock {
    pub user_id: Uuid,
    pub blocked_user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// --- Report ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = reports)]
pub struct Report {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub reported_user_id: Uuid,
    pub reason: String,
    pub details: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = reports)]
pub struct NewReport {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub reported_user_id: Uuid,
    pub reason: String,
    pub details: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
