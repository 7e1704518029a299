use std::sync::Arc;

use axum::extract::ws::{Message as WsFrame, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use metrics::counter;
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use teamup_shared::errors::AppError;

use crate::services::{message_service, token_service};
use crate::socket::protocol::{ClientEvent, ServerEvent};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: Option<String>,
}

/// Whether the connection loop keeps reading after a frame was handled.
enum Flow {
    Continue,
    Close,
}

pub async fn ws_upgrade(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.token))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, token: Option<String>) {
    let user_id = match authenticate(&state, token.as_deref()) {
        Ok(id) => id,
        Err(message) => {
            tracing::warn!(error = %message, "socket auth failed");
            if let Ok(payload) = serde_json::to_string(&ServerEvent::Error { message }) {
                let _ = socket.send(WsFrame::Text(payload)).await;
            }
            let _ = socket.close().await;
            return;
        }
    };

    counter!("ws_connections_total").increment(1);
    tracing::info!(user_id = %user_id, "socket connected");

    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    // Writer task: everything leaving this connection funnels through one
    // channel, so registry broadcasts and direct replies cannot interleave
    // mid-frame.
    let writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let payload = match serde_json::to_string(&event) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode socket event");
                    continue;
                }
            };
            if sink.send(WsFrame::Text(payload)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    // The guard unregisters on drop, covering clean closes, transport errors
    // and panics alike.
    let guard = state.registry.register(user_id, tx.clone());
    let _ = tx.send(ServerEvent::Connected { user_id });

    while let Some(frame) = stream.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(user_id = %user_id, error = %e, "socket transport error");
                break;
            }
        };
        match frame {
            WsFrame::Text(raw) => {
                if matches!(handle_frame(&state, user_id, &tx, &raw), Flow::Close) {
                    break;
                }
            }
            WsFrame::Close(_) => break,
            // pings are answered by axum; binary frames carry nothing we speak
            _ => {}
        }
    }

    drop(guard);
    drop(tx);
    let _ = writer.await;
    tracing::info!(user_id = %user_id, "socket disconnected");
}

/// Resolves the handshake token to a live user before the connection is
/// registered anywhere.
fn authenticate(state: &AppState, token: Option<&str>) -> Result<Uuid, String> {
    let Some(token) = token else {
        return Err("authentication required".to_string());
    };
    let claims = token_service::decode_access_token(token, &state.config.jwt_secret)
        .map_err(|_| "invalid or expired token".to_string())?;
    match state.store.user_by_id(claims.sub) {
        Ok(Some(user)) => Ok(user.id),
        Ok(None) => Err("invalid or expired token".to_string()),
        Err(e) => {
            tracing::error!(error = %e, "user lookup failed during socket auth");
            Err("authentication failed".to_string())
        }
    }
}

fn handle_frame(
    state: &AppState,
    user_id: Uuid,
    tx: &mpsc::UnboundedSender<ServerEvent>,
    raw: &str,
) -> Flow {
    counter!("ws_messages_total").increment(1);

    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(_) => {
            let _ = tx.send(ServerEvent::Error {
                message: "invalid message payload".to_string(),
            });
            return Flow::Continue;
        }
    };

    match serde_json::from_value::<ClientEvent>(value) {
        Ok(ClientEvent::SendMessage { match_id, text }) => {
            handle_send_message(state, user_id, tx, match_id, text)
        }
        Ok(ClientEvent::Typing { match_id }) => {
            relay_typing(state, user_id, match_id, true);
            Flow::Continue
        }
        Ok(ClientEvent::StopTyping { match_id }) => {
            relay_typing(state, user_id, match_id, false);
            Flow::Continue
        }
        Err(_) => {
            // Unknown event kinds are dropped without an answer so newer
            // clients can speak to older servers.
            tracing::debug!(user_id = %user_id, "ignoring unrecognized socket event");
            Flow::Continue
        }
    }
}

fn handle_send_message(
    state: &AppState,
    sender_id: Uuid,
    tx: &mpsc::UnboundedSender<ServerEvent>,
    match_id: Option<String>,
    text: Option<String>,
) -> Flow {
    let reply_error = |message: &str| {
        let _ = tx.send(ServerEvent::Error {
            message: message.to_string(),
        });
    };

    let (match_id, text) = match (match_id.as_deref(), text.as_deref()) {
        (Some(match_id), Some(text)) if !match_id.is_empty() && !text.is_empty() => {
            (match_id, text)
        }
        _ => {
            reply_error("match_id and text are required");
            return Flow::Continue;
        }
    };

    let Ok(match_uuid) = Uuid::parse_str(match_id) else {
        reply_error("Match not found or unauthorized");
        return Flow::Continue;
    };
    let matched = match state.store.match_by_id(match_uuid) {
        Ok(Some(matched)) if matched.involves(sender_id) => matched,
        Ok(_) => {
            reply_error("Match not found or unauthorized");
            return Flow::Continue;
        }
        Err(e) => {
            tracing::error!(user_id = %sender_id, error = %e, "match lookup failed");
            reply_error("internal error");
            return Flow::Close;
        }
    };

    let message =
        match message_service::append_message(state.store.as_ref(), sender_id, matched.id, text) {
            Ok(message) => message,
            Err(AppError::Validation(message)) => {
                reply_error(&message);
                return Flow::Continue;
            }
            Err(AppError::Known { message, .. }) => {
                reply_error(&message);
                return Flow::Continue;
            }
            Err(e) => {
                tracing::error!(user_id = %sender_id, error = %e, "failed to persist message");
                reply_error("internal error");
                return Flow::Close;
            }
        };

    let recipient = matched.other_participant(sender_id);
    let delivered = state.registry.broadcast(
        recipient,
        &ServerEvent::NewMessage {
            message: message.clone(),
        },
    );
    tracing::debug!(
        match_id = %matched.id,
        recipient = %recipient,
        delivered,
        "message relayed"
    );

    // The ack goes to the sending connection only, not to the sender's other
    // devices.
    let _ = tx.send(ServerEvent::MessageSent { message });
    Flow::Continue
}

/// Relays a typing indicator to the other participant. Indicators are
/// ephemeral, so anything that fails to resolve is dropped silently.
fn relay_typing(state: &AppState, user_id: Uuid, match_id: Option<String>, active: bool) {
    let Some(raw) = match_id else { return };
    let Ok(match_id) = Uuid::parse_str(&raw) else {
        return;
    };
    let Ok(Some(matched)) = state.store.match_by_id(match_id) else {
        return;
    };
    if !matched.involves(user_id) {
        return;
    }
    let event = if active {
        ServerEvent::Typing { match_id, user_id }
    } else {
        ServerEvent::StopTyping { match_id, user_id }
    };
    state
        .registry
        .broadcast(matched.other_participant(user_id), &event);
}
