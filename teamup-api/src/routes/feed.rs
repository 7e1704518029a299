use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use teamup_shared::errors::AppResult;
use teamup_shared::types::auth::AuthUser;
use teamup_shared::types::ApiResponse;

use crate::services::feed_service::{self, FeedPage, RankBounds};
use crate::store::FeedFilter;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub game: String,
    pub region: Option<String>,
    pub language: Option<String>,
    pub platform: Option<String>,
    pub rank_min: Option<String>,
    pub rank_max: Option<String>,
    pub cursor: Option<Uuid>,
    pub limit: Option<i64>,
}

/// Candidate teammates for one game, filtered and cursor-paginated.
pub async fn get_feed(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<ApiResponse<FeedPage>>> {
    let page = feed_service::get_feed(
        state.store.as_ref(),
        auth.id,
        &query.game,
        FeedFilter {
            region: query.region,
            language: query.language,
            platform: query.platform,
        },
        RankBounds {
            min: query.rank_min,
            max: query.rank_max,
        },
        query.cursor,
        query.limit,
    )?;
    Ok(Json(ApiResponse::ok(page)))
}
