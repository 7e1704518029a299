use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use teamup_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{NewProfile, Profile};
use crate::store::{AvailabilitySlot, GameEntry, Store};

/// A profile joined with the user's games and availability, the shape every
/// profile-bearing endpoint returns.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub nickname: String,
    pub bio: Option<String>,
    pub region: String,
    pub language: String,
    pub platforms: Vec<String>,
    pub games: Vec<GameEntry>,
    pub availability: Vec<AvailabilitySlot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full replacement write; the stored games and availability lists are
/// overwritten with the ones given here.
#[derive(Debug)]
pub struct ProfilePut {
    pub nickname: String,
    pub bio: Option<String>,
    pub region: String,
    pub language: String,
    pub platforms: Vec<String>,
    pub games: Vec<GameEntry>,
    pub availability: Vec<AvailabilitySlot>,
}

/// Partial write; `None` fields keep their stored value, and the games and
/// availability lists are only replaced when present (an empty list clears).
#[derive(Debug, Default)]
pub struct ProfilePatch {
    pub nickname: Option<String>,
    pub bio: Option<String>,
    pub region: Option<String>,
    pub language: Option<String>,
    pub platforms: Option<Vec<String>>,
    pub games: Option<Vec<GameEntry>>,
    pub availability: Option<Vec<AvailabilitySlot>>,
}

pub fn get_view(store: &dyn Store, user_id: Uuid) -> AppResult<ProfileView> {
    let profile = store
        .profile_by_user(user_id)?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;
    enrich(store, profile)
}

/// Joins a profile row with its owner's games and availability windows.
pub fn enrich(store: &dyn Store, profile: Profile) -> AppResult<ProfileView> {
    let games = store
        .games_for_user(profile.user_id)?
        .into_iter()
        .map(|(link, game)| GameEntry {
            name: game.name,
            rank: link.rank,
            roles: string_list(&link.roles),
        })
        .collect();
    let availability = store
        .windows_for_user(profile.user_id)?
        .into_iter()
        .map(|w| AvailabilitySlot {
            day_of_week: w.day_of_week,
            start_time: w.start_time,
            end_time: w.end_time,
        })
        .collect();
    Ok(ProfileView {
        id: profile.id,
        user_id: profile.user_id,
        nickname: profile.nickname,
        bio: profile.bio,
        region: profile.region,
        language: profile.language,
        platforms: string_list(&profile.platforms),
        games,
        availability,
        created_at: profile.created_at,
        updated_at: profile.updated_at,
    })
}

/// Creates or fully replaces the caller's profile.
pub fn put_profile(store: &dyn Store, user_id: Uuid, put: ProfilePut) -> AppResult<ProfileView> {
    let now = Utc::now();
    let existing = store.profile_by_user(user_id)?;
    let row = NewProfile {
        id: existing.as_ref().map(|p| p.id).unwrap_or_else(Uuid::now_v7),
        user_id,
        nickname: put.nickname,
        bio: put.bio,
        region: put.region,
        language: put.language,
        platforms: serde_json::json!(put.platforms),
        created_at: existing.as_ref().map(|p| p.created_at).unwrap_or(now),
        updated_at: now,
    };
    let saved = store.save_profile(row, Some(&put.games), Some(&put.availability))?;
    enrich(store, saved)
}

/// Applies a partial update to an existing profile. Fails with
/// `ProfileNotFound` when the caller has no profile yet.
pub fn patch_profile(
    store: &dyn Store,
    user_id: Uuid,
    patch: ProfilePatch,
) -> AppResult<ProfileView> {
    let existing = store
        .profile_by_user(user_id)?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;
    let row = NewProfile {
        id: existing.id,
        user_id,
        nickname: patch.nickname.unwrap_or(existing.nickname),
        bio: patch.bio.or(existing.bio),
        region: patch.region.unwrap_or(existing.region),
        language: patch.language.unwrap_or(existing.language),
        platforms: match patch.platforms {
            Some(platforms) => serde_json::json!(platforms),
            None => existing.platforms,
        },
        created_at: existing.created_at,
        updated_at: Utc::now(),
    };
    let saved = store.save_profile(row, patch.games.as_deref(), patch.availability.as_deref())?;
    enrich(store, saved)
}

fn string_list(value: &serde_json::Value) -> Vec<String> {
    serde_json::from_value(value.clone()).unwrap_or_default()
}
