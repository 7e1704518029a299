use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use teamup_shared::errors::AppResult;
use teamup_shared::types::auth::AuthUser;
use teamup_shared::types::ApiResponse;

use crate::services::profile_service::{self, ProfileView};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MatchView {
    pub id: Uuid,
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub matched_at: DateTime<Utc>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub other_user: ProfileView,
}

/// The caller's matches, most recent first, each joined with the other
/// participant's profile. A match whose other side never wrote a profile is
/// left out rather than served half-empty.
pub async fn list_matches(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<MatchView>>>> {
    let matches = state.store.matches_for_user(auth.id)?;
    let mut views = Vec::with_capacity(matches.len());
    for matched in matches {
        let other = matched.other_participant(auth.id);
        let Some(profile) = state.store.profile_by_user(other)? else {
            tracing::debug!(match_id = %matched.id, other = %other, "skipping match without a profile");
            continue;
        };
        views.push(MatchView {
            id: matched.id,
            user_a: matched.user_a,
            user_b: matched.user_b,
            matched_at: matched.matched_at,
            last_message_at: matched.last_message_at,
            other_user: profile_service::enrich(state.store.as_ref(), profile)?,
        });
    }
    Ok(Json(ApiResponse::ok(views)))
}
