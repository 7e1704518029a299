use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use teamup_shared::errors::AppResult;
use teamup_shared::types::auth::AuthUser;
use teamup_shared::types::ApiResponse;

use crate::models::{Swipe, SwipeKind};
use crate::services::swipe_service;
use crate::socket::protocol::ServerEvent;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SwipeRequest {
    pub to_user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: SwipeKind,
}

#[derive(Debug, Serialize)]
pub struct SwipeResponse {
    pub swipe: Swipe,
    pub is_match: bool,
}

/// Records a swipe; when it completes a mutual like, both participants get a
/// `new_match` push on their live sockets.
pub async fn swipe(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<SwipeRequest>,
) -> AppResult<Json<ApiResponse<SwipeResponse>>> {
    let outcome =
        swipe_service::record_swipe(state.store.as_ref(), auth.id, req.to_user_id, req.kind)?;

    if let Some(matched) = &outcome.matched {
        let event = ServerEvent::NewMatch {
            match_id: matched.id,
            user_a: matched.user_a,
            user_b: matched.user_b,
        };
        state.registry.broadcast(matched.user_a, &event);
        state.registry.broadcast(matched.user_b, &event);
    }

    Ok(Json(ApiResponse::ok(SwipeResponse {
        swipe: outcome.swipe,
        is_match: outcome.matched.is_some(),
    })))
}
