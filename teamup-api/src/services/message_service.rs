use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use teamup_shared::errors::{AppError, AppResult, ErrorCode};
use teamup_shared::types::pagination;

use crate::models::{Match, Message, NewMessage};
use crate::store::Store;

pub const DEFAULT_MESSAGE_LIMIT: i64 = 50;
pub const MAX_MESSAGE_LIMIT: i64 = 100;
pub const MAX_MESSAGE_CHARS: usize = 1000;

#[derive(Debug, Serialize)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    pub next_cursor: Option<Uuid>,
}

/// One page of a match's history in chronological order.
///
/// Pages are cut from the newest end: the first call returns the most recent
/// `limit` messages, and `next_cursor` (the oldest id in the page) walks
/// toward the beginning of the conversation.
pub fn list_messages(
    store: &dyn Store,
    viewer: Uuid,
    match_id: Uuid,
    cursor: Option<Uuid>,
    limit: Option<i64>,
) -> AppResult<MessagePage> {
    let limit = pagination::bounded_limit(limit, DEFAULT_MESSAGE_LIMIT, MAX_MESSAGE_LIMIT)?;
    participant_match(store, match_id, viewer)?;

    let mut rows = store.messages_before(match_id, cursor, limit + 1)?;
    let has_more = rows.len() as i64 > limit;
    rows.truncate(limit as usize);
    rows.reverse();
    let next_cursor = if has_more {
        rows.first().map(|m| m.id)
    } else {
        None
    };
    Ok(MessagePage {
        messages: rows,
        next_cursor,
    })
}

/// Persists a message from `viewer` into the match, bumping the match's
/// `last_message_at` in the same transaction.
pub fn append_message(
    store: &dyn Store,
    viewer: Uuid,
    match_id: Uuid,
    text: &str,
) -> AppResult<Message> {
    let length = text.chars().count();
    if length == 0 || length > MAX_MESSAGE_CHARS {
        return Err(AppError::Validation(format!(
            "message text must be between 1 and {MAX_MESSAGE_CHARS} characters"
        )));
    }
    participant_match(store, match_id, viewer)?;

    let message = NewMessage {
        id: Uuid::now_v7(),
        match_id,
        sender_id: viewer,
        text: text.to_string(),
        created_at: Utc::now(),
    };
    Ok(store.append_message(message)?)
}

/// Loads the match and checks that `viewer` is one of its two participants.
pub fn participant_match(store: &dyn Store, match_id: Uuid, viewer: Uuid) -> AppResult<Match> {
    let matched = store
        .match_by_id(match_id)?
        .ok_or_else(|| AppError::new(ErrorCode::MatchNotFound, "match not found"))?;
    if !matched.involves(viewer) {
        return Err(AppError::new(
            ErrorCode::NotMatchParticipant,
            "you are not a participant in this match",
        ));
    }
    Ok(matched)
}
