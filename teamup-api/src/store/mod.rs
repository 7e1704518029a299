use serde::{Deserialize, Serialize};
use uuid::Uuid;

use teamup_shared::errors::{AppError, ErrorCode};

use crate::models::{
    AvailabilityWindow, Block, Game, Match, Message, NewBlock, NewMatch, NewMessage, NewProfile,
    NewReport, NewSwipe, NewUser, Profile, Report, Swipe, User, UserGame,
};

pub mod postgres;

#[cfg(test)]
pub mod memory;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    Conflict,
    #[error("connection pool error: {0}")]
    Pool(String),
    #[error(transparent)]
    Database(#[from] diesel::result::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => AppError::new(ErrorCode::Conflict, "resource already exists"),
            StoreError::Pool(msg) => AppError::internal(msg),
            StoreError::Database(diesel::result::Error::NotFound) => {
                AppError::not_found("resource not found")
            }
            StoreError::Database(e) => AppError::Database(e),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A game reference inside a profile write; unknown names create the game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEntry {
    pub name: String,
    pub rank: Option<String>,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
}

/// Equality filters applied by the feed page query. Rank bounds never reach
/// the store; they are accepted upstream but not applied.
#[derive(Debug, Clone, Default)]
pub struct FeedFilter {
    pub region: Option<String>,
    pub language: Option<String>,
    pub platform: Option<String>,
}

/// Match half of the atomic swipe write: if a reciprocal swipe with one of
/// `reciprocal_kinds` exists, `match_row` is inserted (idempotently).
#[derive(Debug, Clone)]
pub struct MatchAttempt {
    pub reciprocal_kinds: Vec<String>,
    pub match_row: NewMatch,
}

#[derive(Debug, Clone)]
pub struct SwipeOutcome {
    pub swipe: Swipe,
    pub matched: Option<Match>,
}

/// Persistence boundary. Uniqueness rules live in the backing store and are
/// the final arbiter under concurrency; callers must treat
/// [`StoreError::Conflict`] as the duplicate signal rather than checking
/// first.
pub trait Store: Send + Sync {
    // users
    fn create_user(&self, user: NewUser) -> StoreResult<User>;
    fn user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    fn user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    // profiles
    fn profile_by_user(&self, user_id: Uuid) -> StoreResult<Option<Profile>>;
    /// Upserts the profile row; when a list is `Some`, the user's stored
    /// games (resp. availability windows) are replaced wholesale in the same
    /// transaction.
    fn save_profile(
        &self,
        profile: NewProfile,
        games: Option<&[GameEntry]>,
        windows: Option<&[AvailabilitySlot]>,
    ) -> StoreResult<Profile>;

    // games
    fn list_games(&self) -> StoreResult<Vec<Game>>;
    fn game_by_name(&self, name: &str) -> StoreResult<Option<Game>>;
    fn games_for_user(&self, user_id: Uuid) -> StoreResult<Vec<(UserGame, Game)>>;
    fn windows_for_user(&self, user_id: Uuid) -> StoreResult<Vec<AvailabilityWindow>>;

    // feed
    /// Users blocked by `user_id` plus users who blocked `user_id`.
    fn blocked_either_way(&self, user_id: Uuid) -> StoreResult<Vec<Uuid>>;
    fn swiped_targets(&self, from_user_id: Uuid) -> StoreResult<Vec<Uuid>>;
    /// Profiles of users playing `game_id`, minus `excluded`, filtered,
    /// ordered by profile id ascending, lower-bounded by `cursor`.
    fn feed_page(
        &self,
        game_id: Uuid,
        excluded: &[Uuid],
        filter: &FeedFilter,
        cursor: Option<Uuid>,
        limit: i64,
    ) -> StoreResult<Vec<Profile>>;

    // swipes and matches
    /// Atomic unit: insert the swipe (duplicate ordered pair -> `Conflict`),
    /// then evaluate `attempt` inside the same transaction.
    fn create_swipe(&self, swipe: NewSwipe, attempt: Option<MatchAttempt>)
        -> StoreResult<SwipeOutcome>;
    fn matches_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Match>>;
    fn match_by_id(&self, id: Uuid) -> StoreResult<Option<Match>>;

    // messages
    /// Newest-first page: messages of the match with id below `before`
    /// (when given), descending by id, at most `limit` rows.
    fn messages_before(
        &self,
        match_id: Uuid,
        before: Option<Uuid>,
        limit: i64,
    ) -> StoreResult<Vec<Message>>;
    /// Atomic unit: insert the message and bump the match's
    /// `last_message_at` to the message's `created_at`.
    fn append_message(&self, message: NewMessage) -> StoreResult<Message>;

    // moderation
    fn create_block(&self, block: NewBlock) -> StoreResult<Block>;
    fn create_report(&self, report: NewReport) -> StoreResult<Report>;
}
