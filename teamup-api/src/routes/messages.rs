use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use teamup_shared::errors::AppResult;
use teamup_shared::types::auth::AuthUser;
use teamup_shared::types::pagination::CursorParams;
use teamup_shared::types::ApiResponse;

use crate::models::Message;
use crate::services::message_service::{self, MessagePage};
use crate::socket::protocol::ServerEvent;
use crate::AppState;

/// One page of the match's history, oldest first within the page; the
/// cursor walks toward older messages.
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(match_id): Path<Uuid>,
    Query(params): Query<CursorParams>,
) -> AppResult<Json<ApiResponse<MessagePage>>> {
    let page = message_service::list_messages(
        state.store.as_ref(),
        auth.id,
        match_id,
        params.cursor,
        params.limit,
    )?;
    Ok(Json(ApiResponse::ok(page)))
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

/// Appends a message over REST; the other participant's live sockets get
/// the same `new_message` push as the socket path produces.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(match_id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<Json<ApiResponse<Message>>> {
    let message =
        message_service::append_message(state.store.as_ref(), auth.id, match_id, &req.text)?;
    let matched = message_service::participant_match(state.store.as_ref(), match_id, auth.id)?;

    let recipient = matched.other_participant(auth.id);
    state.registry.broadcast(
        recipient,
        &ServerEvent::NewMessage {
            message: message.clone(),
        },
    );

    Ok(Json(ApiResponse::ok(message)))
}
