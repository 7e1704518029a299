use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use teamup_shared::errors::AppResult;
use teamup_shared::types::ApiResponse;

use crate::models::Game;
use crate::AppState;

/// Every game referenced by at least one profile; the catalog grows lazily
/// as profiles mention new names.
pub async fn list_games(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<Game>>>> {
    let games = state.store.list_games()?;
    Ok(Json(ApiResponse::ok(games)))
}
