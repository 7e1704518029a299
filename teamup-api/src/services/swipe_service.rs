use chrono::Utc;
use uuid::Uuid;

use teamup_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{NewMatch, NewSwipe, SwipeKind};
use crate::store::{MatchAttempt, Store, StoreError, SwipeOutcome};

/// Records a directional swipe and, when it completes a mutual like, the
/// match, in one storage transaction.
///
/// A pass never matches and is never matched against; only `like` and
/// `superlike` count in both directions. The duplicate-pair check is left to
/// the store's unique index so concurrent repeats cannot slip through.
pub fn record_swipe(
    store: &dyn Store,
    from: Uuid,
    to: Uuid,
    kind: SwipeKind,
) -> AppResult<SwipeOutcome> {
    if from == to {
        return Err(AppError::new(
            ErrorCode::CannotSwipeSelf,
            "cannot swipe on yourself",
        ));
    }
    if store.user_by_id(to)?.is_none() {
        return Err(AppError::new(ErrorCode::UserNotFound, "target user not found"));
    }

    let now = Utc::now();
    let swipe = NewSwipe {
        id: Uuid::now_v7(),
        from_user_id: from,
        to_user_id: to,
        kind: kind.as_str().to_string(),
        created_at: now,
    };
    let attempt = kind.counts_toward_match().then(|| {
        let (user_a, user_b) = canonical_pair(from, to);
        MatchAttempt {
            reciprocal_kinds: vec![
                SwipeKind::Like.as_str().to_string(),
                SwipeKind::Superlike.as_str().to_string(),
            ],
            match_row: NewMatch {
                id: Uuid::now_v7(),
                user_a,
                user_b,
                matched_at: now,
                last_message_at: None,
            },
        }
    });

    let outcome = store.create_swipe(swipe, attempt).map_err(|e| match e {
        StoreError::Conflict => AppError::new(
            ErrorCode::AlreadySwiped,
            "you already swiped on this user",
        ),
        other => other.into(),
    })?;

    if let Some(matched) = &outcome.matched {
        tracing::info!(
            match_id = %matched.id,
            user_a = %matched.user_a,
            user_b = %matched.user_b,
            "mutual swipe created a match"
        );
    }
    Ok(outcome)
}

/// Orders a user pair so each pair has exactly one match row regardless of
/// swipe direction.
pub fn canonical_pair(x: Uuid, y: Uuid) -> (Uuid, Uuid) {
    if x < y {
        (x, y)
    } else {
        (y, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::models::NewUser;
    use crate::store::memory::MemStore;

    fn seed_user(store: &MemStore) -> Uuid {
        let id = Uuid::now_v7();
        store
            .create_user(NewUser {
                id,
                email: format!("{id}@example.com"),
                password_hash: "x".into(),
                created_at: Utc::now(),
            })
            .unwrap();
        id
    }

    fn code_of(err: AppError) -> ErrorCode {
        match err {
            AppError::Known { code, .. } => code,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn swiping_yourself_is_rejected() {
        let store = MemStore::new();
        let a = seed_user(&store);
        let err = record_swipe(&store, a, a, SwipeKind::Like).unwrap_err();
        assert_eq!(code_of(err), ErrorCode::CannotSwipeSelf);
    }

    #[test]
    fn unknown_target_is_rejected() {
        let store = MemStore::new();
        let a = seed_user(&store);
        let err = record_swipe(&store, a, Uuid::now_v7(), SwipeKind::Like).unwrap_err();
        assert_eq!(code_of(err), ErrorCode::UserNotFound);
    }

    #[test]
    fn repeat_swipe_on_same_target_conflicts() {
        let store = MemStore::new();
        let a = seed_user(&store);
        let b = seed_user(&store);
        record_swipe(&store, a, b, SwipeKind::Like).unwrap();
        let err = record_swipe(&store, a, b, SwipeKind::Pass).unwrap_err();
        assert_eq!(code_of(err), ErrorCode::AlreadySwiped);
    }

    #[test]
    fn one_sided_like_does_not_match() {
        let store = MemStore::new();
        let a = seed_user(&store);
        let b = seed_user(&store);
        let outcome = record_swipe(&store, a, b, SwipeKind::Like).unwrap();
        assert!(outcome.matched.is_none());
        assert_eq!(outcome.swipe.kind, "like");
    }

    #[test]
    fn mutual_like_matches_once_in_canonical_order() {
        let store = MemStore::new();
        let a = seed_user(&store);
        let b = seed_user(&store);

        let first = record_swipe(&store, a, b, SwipeKind::Like).unwrap();
        assert!(first.matched.is_none());

        let second = record_swipe(&store, b, a, SwipeKind::Like).unwrap();
        let matched = second.matched.expect("reciprocal like must match");
        let (lo, hi) = canonical_pair(a, b);
        assert_eq!((matched.user_a, matched.user_b), (lo, hi));
        assert!(matched.last_message_at.is_none());
    }

    #[test]
    fn superlike_counts_toward_matching() {
        let store = MemStore::new();
        let a = seed_user(&store);
        let b = seed_user(&store);
        record_swipe(&store, a, b, SwipeKind::Superlike).unwrap();
        let second = record_swipe(&store, b, a, SwipeKind::Like).unwrap();
        assert!(second.matched.is_some());
    }

    #[test]
    fn pass_never_matches_in_either_direction() {
        let store = MemStore::new();
        let a = seed_user(&store);
        let b = seed_user(&store);
        record_swipe(&store, a, b, SwipeKind::Pass).unwrap();
        let second = record_swipe(&store, b, a, SwipeKind::Like).unwrap();
        assert!(second.matched.is_none(), "a like answering a pass must not match");

        let c = seed_user(&store);
        let d = seed_user(&store);
        record_swipe(&store, c, d, SwipeKind::Like).unwrap();
        let fourth = record_swipe(&store, d, c, SwipeKind::Pass).unwrap();
        assert!(fourth.matched.is_none(), "a pass never matches");
    }

    #[test]
    fn concurrent_mutual_likes_produce_exactly_one_match() {
        let store = Arc::new(MemStore::new());
        let a = seed_user(&store);
        let b = seed_user(&store);

        let handles: Vec<_> = [(a, b), (b, a)]
            .into_iter()
            .map(|(from, to)| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || record_swipe(&*store, from, to, SwipeKind::Like))
            })
            .collect();
        let outcomes: Vec<SwipeOutcome> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();

        let matched: Vec<_> = outcomes.iter().filter_map(|o| o.matched.as_ref()).collect();
        assert_eq!(matched.len(), 1, "exactly one swipe observes the match");
        let (lo, hi) = canonical_pair(a, b);
        assert_eq!((matched[0].user_a, matched[0].user_b), (lo, hi));
    }
}
