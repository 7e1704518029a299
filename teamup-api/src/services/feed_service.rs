use serde::Serialize;
use uuid::Uuid;

use teamup_shared::errors::AppResult;
use teamup_shared::types::pagination;

use crate::services::profile_service::{self, ProfileView};
use crate::store::{FeedFilter, Store};

pub const DEFAULT_FEED_LIMIT: i64 = 10;
pub const MAX_FEED_LIMIT: i64 = 50;

/// Rank bounds are part of the public query surface but are not applied to
/// the candidate query; ranks are free-form text per game, so there is no
/// total order to compare against.
#[derive(Debug, Default)]
pub struct RankBounds {
    pub min: Option<String>,
    pub max: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FeedPage {
    pub candidates: Vec<ProfileView>,
    pub next_cursor: Option<Uuid>,
}

/// Candidate profiles for `viewer` on one game, oldest profile first.
///
/// Excluded from the page: the viewer, anyone the viewer already swiped on,
/// and anyone with a block in either direction. An unknown game name yields
/// an empty page rather than an error.
pub fn get_feed(
    store: &dyn Store,
    viewer: Uuid,
    game_name: &str,
    filter: FeedFilter,
    ranks: RankBounds,
    cursor: Option<Uuid>,
    limit: Option<i64>,
) -> AppResult<FeedPage> {
    let limit = pagination::bounded_limit(limit, DEFAULT_FEED_LIMIT, MAX_FEED_LIMIT)?;

    let Some(game) = store.game_by_name(game_name)? else {
        return Ok(FeedPage {
            candidates: Vec::new(),
            next_cursor: None,
        });
    };

    if ranks.min.is_some() || ranks.max.is_some() {
        tracing::debug!(
            rank_min = ?ranks.min,
            rank_max = ?ranks.max,
            "rank bounds accepted but not applied"
        );
    }

    let mut excluded: Vec<Uuid> = vec![viewer];
    excluded.extend(store.blocked_either_way(viewer)?);
    excluded.extend(store.swiped_targets(viewer)?);
    excluded.sort_unstable();
    excluded.dedup();

    // One extra row decides whether another page exists.
    let mut profiles = store.feed_page(game.id, &excluded, &filter, cursor, limit + 1)?;
    let has_more = profiles.len() as i64 > limit;
    profiles.truncate(limit as usize);
    let next_cursor = if has_more {
        profiles.last().map(|p| p.id)
    } else {
        None
    };

    let mut candidates = Vec::with_capacity(profiles.len());
    for profile in profiles {
        candidates.push(profile_service::enrich(store, profile)?);
    }
    Ok(FeedPage {
        candidates,
        next_cursor,
    })
}
