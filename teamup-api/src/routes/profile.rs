use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use validator::{Validate, ValidationError};

use teamup_shared::errors::{AppError, AppResult, ErrorCode};
use teamup_shared::types::auth::AuthUser;
use teamup_shared::types::ApiResponse;

use crate::services::profile_service::{self, ProfilePatch, ProfilePut, ProfileView};
use crate::store::{AvailabilitySlot, GameEntry};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct GameLinkRequest {
    #[validate(length(min = 1, max = 100, message = "game name must be 1 to 100 characters"))]
    pub name: String,
    #[validate(length(max = 50, message = "rank must be at most 50 characters"))]
    pub rank: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl From<GameLinkRequest> for GameEntry {
    fn from(req: GameLinkRequest) -> Self {
        GameEntry {
            name: req.name,
            rank: req.rank,
            roles: req.roles,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AvailabilityRequest {
    #[validate(range(min = 0, max = 6, message = "day_of_week must be between 0 and 6"))]
    pub day_of_week: i32,
    #[validate(custom = "validate_clock")]
    pub start_time: String,
    #[validate(custom = "validate_clock")]
    pub end_time: String,
}

impl From<AvailabilityRequest> for AvailabilitySlot {
    fn from(req: AvailabilityRequest) -> Self {
        AvailabilitySlot {
            day_of_week: req.day_of_week,
            start_time: req.start_time,
            end_time: req.end_time,
        }
    }
}

fn validate_clock(value: &str) -> Result<(), ValidationError> {
    let b = value.as_bytes();
    if b.len() == 5 && b[2] == b':' && [b[0], b[1], b[3], b[4]].iter().all(|c| c.is_ascii_digit()) {
        let hour = (b[0] - b'0') * 10 + (b[1] - b'0');
        let minute = (b[3] - b'0') * 10 + (b[4] - b'0');
        if hour < 24 && minute < 60 {
            return Ok(());
        }
    }
    Err(ValidationError::new("expected HH:MM"))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProfilePutRequest {
    #[validate(length(min = 1, max = 50, message = "nickname must be 1 to 50 characters"))]
    pub nickname: String,
    #[validate(length(max = 300, message = "bio must be at most 300 characters"))]
    pub bio: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub region: String,
    #[validate(length(min = 1, max = 50))]
    pub language: String,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    #[validate]
    pub games: Vec<GameLinkRequest>,
    #[serde(default)]
    #[validate]
    pub availability: Vec<AvailabilityRequest>,
}

/// Creates or fully replaces the caller's profile; the games and
/// availability lists always end up exactly as sent.
pub async fn put_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<ProfilePutRequest>,
) -> AppResult<Json<ApiResponse<ProfileView>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let put = ProfilePut {
        nickname: req.nickname,
        bio: req.bio,
        region: req.region,
        language: req.language,
        platforms: req.platforms,
        games: req.games.into_iter().map(Into::into).collect(),
        availability: req.availability.into_iter().map(Into::into).collect(),
    };
    let view = profile_service::put_profile(state.store.as_ref(), auth.id, put)?;
    Ok(Json(ApiResponse::ok(view)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProfilePatchRequest {
    #[validate(length(min = 1, max = 50, message = "nickname must be 1 to 50 characters"))]
    pub nickname: Option<String>,
    #[validate(length(max = 300, message = "bio must be at most 300 characters"))]
    pub bio: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub region: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub language: Option<String>,
    pub platforms: Option<Vec<String>>,
    #[validate]
    pub games: Option<Vec<GameLinkRequest>>,
    #[validate]
    pub availability: Option<Vec<AvailabilityRequest>>,
}

/// Partial update; fields left out keep their stored value, and the games
/// and availability lists are only replaced when present.
pub async fn patch_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<ProfilePatchRequest>,
) -> AppResult<Json<ApiResponse<ProfileView>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    let patch = ProfilePatch {
        nickname: req.nickname,
        bio: req.bio,
        region: req.region,
        language: req.language,
        platforms: req.platforms,
        games: req
            .games
            .map(|games| games.into_iter().map(Into::into).collect()),
        availability: req
            .availability
            .map(|slots| slots.into_iter().map(Into::into).collect()),
    };
    let view = profile_service::patch_profile(state.store.as_ref(), auth.id, patch)?;
    Ok(Json(ApiResponse::ok(view)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_format_is_strict() {
        assert!(validate_clock("00:00").is_ok());
        assert!(validate_clock("23:59").is_ok());
        assert!(validate_clock("24:00").is_err());
        assert!(validate_clock("12:60").is_err());
        assert!(validate_clock("9:00").is_err());
        assert!(validate_clock("12-30").is_err());
        assert!(validate_clock("+1:30").is_err());
    }

    #[test]
    fn nested_lists_are_validated() {
        let req = ProfilePutRequest {
            nickname: "Shade".into(),
            bio: None,
            region: "EUW".into(),
            language: "fr".into(),
            platforms: vec![],
            games: vec![],
            availability: vec![AvailabilityRequest {
                day_of_week: 9,
                start_time: "20:00".into(),
                end_time: "22:00".into(),
            }],
        };
        assert!(req.validate().is_err());
    }
}
