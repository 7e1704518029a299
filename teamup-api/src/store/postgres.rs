use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use uuid::Uuid;

use crate::models::{
    AvailabilityWindow, Block, Game, Match, Message, NewAvailabilityWindow, NewBlock, NewGame,
    NewMessage, NewProfile, NewReport, NewSwipe, NewUser, NewUserGame, Profile, Report, Swipe,
    User, UserGame,
};
use crate::schema::{
    availability_windows, blocks, games, matches, messages, profiles, reports, swipes, user_games,
    users,
};

use super::{
    AvailabilitySlot, FeedFilter, GameEntry, MatchAttempt, Store, StoreError, StoreResult,
    SwipeOutcome,
};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> StoreResult<PooledConnection<ConnectionManager<PgConnection>>> {
        self.pool.get().map_err(|e| StoreError::Pool(e.to_string()))
    }
}

fn map_db_err(err: diesel::result::Error) -> StoreError {
    match err {
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        ) => StoreError::Conflict,
        other => StoreError::Database(other),
    }
}

fn get_or_create_game(conn: &mut PgConnection, name: &str) -> diesel::QueryResult<Game> {
    if let Some(game) = games::table
        .filter(games::name.eq(name))
        .first::<Game>(conn)
        .optional()?
    {
        return Ok(game);
    }

    // Racing writers both reach the insert; do_nothing makes it idempotent.
    diesel::insert_into(games::table)
        .values(&NewGame {
            id: Uuid::now_v7(),
            name: name.to_string(),
            icon: None,
        })
        .on_conflict(games::name)
        .do_nothing()
        .execute(conn)?;

    games::table.filter(games::name.eq(name)).first(conn)
}

impl Store for PgStore {
    fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut conn = self.conn()?;
        diesel::insert_into(users::table)
            .values(&user)
            .get_result(&mut conn)
            .map_err(map_db_err)
    }

    fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let mut conn = self.conn()?;
        Ok(users::table
            .filter(users::email.eq(email))
            .first(&mut conn)
            .optional()?)
    }

    fn user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let mut conn = self.conn()?;
        Ok(users::table.find(id).first(&mut conn).optional()?)
    }

    fn profile_by_user(&self, user_id: Uuid) -> StoreResult<Option<Profile>> {
        let mut conn = self.conn()?;
        Ok(profiles::table
            .filter(profiles::user_id.eq(user_id))
            .first(&mut conn)
            .optional()?)
    }

    fn save_profile(
        &self,
        profile: NewProfile,
        games_list: Option<&[GameEntry]>,
        windows: Option<&[AvailabilitySlot]>,
    ) -> StoreResult<Profile> {
        let mut conn = self.conn()?;
        conn.transaction(|conn| {
            let saved: Profile = diesel::insert_into(profiles::table)
                .values(&profile)
                .on_conflict(profiles::user_id)
                .do_update()
                .set((
                    profiles::nickname.eq(profile.nickname.clone()),
                    profiles::bio.eq(profile.bio.clone()),
                    profiles::region.eq(profile.region.clone()),
                    profiles::language.eq(profile.language.clone()),
                    profiles::platforms.eq(profile.platforms.clone()),
                    profiles::updated_at.eq(profile.updated_at),
                ))
                .get_result(conn)?;

            if let Some(entries) = games_list {
                diesel::delete(user_games::table.filter(user_games::user_id.eq(saved.user_id)))
                    .execute(conn)?;
                for entry in entries {
                    let game = get_or_create_game(conn, &entry.name)?;
                    diesel::insert_into(user_games::table)
                        .values(&NewUserGame {
                            id: Uuid::now_v7(),
                            user_id: saved.user_id,
                            game_id: game.id,
                            rank: entry.rank.clone(),
                            roles: serde_json::json!(entry.roles),
                        })
                        .execute(conn)?;
                }
            }

            if let Some(slots) = windows {
                diesel::delete(
                    availability_windows::table
                        .filter(availability_windows::user_id.eq(saved.user_id)),
                )
                .execute(conn)?;
                for slot in slots {
                    diesel::insert_into(availability_windows::table)
                        .values(&NewAvailabilityWindow {
                            id: Uuid::now_v7(),
                            user_id: saved.user_id,
                            day_of_week: slot.day_of_week,
                            start_time: slot.start_time.clone(),
                            end_time: slot.end_time.clone(),
                        })
                        .execute(conn)?;
                }
            }

            Ok(saved)
        })
    }

    fn list_games(&self) -> StoreResult<Vec<Game>> {
        let mut conn = self.conn()?;
        Ok(games::table.order(games::name.asc()).load(&mut conn)?)
    }

    fn game_by_name(&self, name: &str) -> StoreResult<Option<Game>> {
        let mut conn = self.conn()?;
        Ok(games::table
            .filter(games::name.eq(name))
            .first(&mut conn)
            .optional()?)
    }

    fn games_for_user(&self, user_id: Uuid) -> StoreResult<Vec<(UserGame, Game)>> {
        let mut conn = self.conn()?;
        Ok(user_games::table
            .inner_join(games::table)
            .filter(user_games::user_id.eq(user_id))
            .load(&mut conn)?)
    }

    fn windows_for_user(&self, user_id: Uuid) -> StoreResult<Vec<AvailabilityWindow>> {
        let mut conn = self.conn()?;
        Ok(availability_windows::table
            .filter(availability_windows::user_id.eq(user_id))
            .order(availability_windows::day_of_week.asc())
            .load(&mut conn)?)
    }

    fn blocked_either_way(&self, user_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let mut conn = self.conn()?;
        let outgoing: Vec<Uuid> = blocks::table
            .filter(blocks::user_id.eq(user_id))
            .select(blocks::blocked_user_id)
            .load(&mut conn)?;
        let incoming: Vec<Uuid> = blocks::table
            .filter(blocks::blocked_user_id.eq(user_id))
            .select(blocks::user_id)
            .load(&mut conn)?;
        Ok(outgoing.into_iter().chain(incoming).collect())
    }

    fn swiped_targets(&self, from_user_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let mut conn = self.conn()?;
        Ok(swipes::table
            .filter(swipes::from_user_id.eq(from_user_id))
            .select(swipes::to_user_id)
            .load(&mut conn)?)
    }

    fn feed_page(
        &self,
        game_id: Uuid,
        excluded: &[Uuid],
        filter: &FeedFilter,
        cursor: Option<Uuid>,
        limit: i64,
    ) -> StoreResult<Vec<Profile>> {
        let mut conn = self.conn()?;

        let players = user_games::table
            .filter(user_games::game_id.eq(game_id))
            .select(user_games::user_id)
            .distinct();

        let mut query = profiles::table
            .filter(profiles::user_id.eq_any(players))
            .into_boxed();

        if !excluded.is_empty() {
            query = query.filter(profiles::user_id.ne_all(excluded.to_vec()));
        }
        if let Some(region) = &filter.region {
            query = query.filter(profiles::region.eq(region.clone()));
        }
        if let Some(language) = &filter.language {
            query = query.filter(profiles::language.eq(language.clone()));
        }
        if let Some(platform) = &filter.platform {
            query = query.filter(profiles::platforms.contains(serde_json::json!([platform])));
        }
        if let Some(cursor) = cursor {
            query = query.filter(profiles::id.gt(cursor));
        }

        Ok(query
            .order(profiles::id.asc())
            .limit(limit)
            .load(&mut conn)?)
    }

    fn create_swipe(
        &self,
        swipe: NewSwipe,
        attempt: Option<MatchAttempt>,
    ) -> StoreResult<SwipeOutcome> {
        let mut conn = self.conn()?;
        conn.transaction(|conn| {
            let inserted: Swipe = diesel::insert_into(swipes::table)
                .values(&swipe)
                .get_result(conn)
                .map_err(map_db_err)?;

            let matched = match attempt {
                Some(attempt) => {
                    let reciprocal: Option<Swipe> = swipes::table
                        .filter(swipes::from_user_id.eq(inserted.to_user_id))
                        .filter(swipes::to_user_id.eq(inserted.from_user_id))
                        .filter(swipes::kind.eq_any(attempt.reciprocal_kinds.clone()))
                        .first(conn)
                        .optional()?;

                    match reciprocal {
                        Some(_) => {
                            // Concurrent mutual swipes both land here; the
                            // unique (user_a, user_b) index dedupes.
                            diesel::insert_into(matches::table)
                                .values(&attempt.match_row)
                                .on_conflict((matches::user_a, matches::user_b))
                                .do_nothing()
                                .execute(conn)?;
                            let row: Match = matches::table
                                .filter(matches::user_a.eq(attempt.match_row.user_a))
                                .filter(matches::user_b.eq(attempt.match_row.user_b))
                                .first(conn)?;
                            Some(row)
                        }
                        None => None,
                    }
                }
                None => None,
            };

            Ok(SwipeOutcome {
                swipe: inserted,
                matched,
            })
        })
    }

    fn matches_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Match>> {
        let mut conn = self.conn()?;
        Ok(matches::table
            .filter(matches::user_a.eq(user_id).or(matches::user_b.eq(user_id)))
            .order(matches::matched_at.desc())
            .load(&mut conn)?)
    }

    fn match_by_id(&self, id: Uuid) -> StoreResult<Option<Match>> {
        let mut conn = self.conn()?;
        Ok(matches::table.find(id).first(&mut conn).optional()?)
    }

    fn messages_before(
        &self,
        match_id: Uuid,
        before: Option<Uuid>,
        limit: i64,
    ) -> StoreResult<Vec<Message>> {
        let mut conn = self.conn()?;
        let mut query = messages::table
            .filter(messages::match_id.eq(match_id))
            .into_boxed();
        if let Some(before) = before {
            query = query.filter(messages::id.lt(before));
        }
        Ok(query
            .order(messages::id.desc())
            .limit(limit)
            .load(&mut conn)?)
    }

    fn append_message(&self, message: NewMessage) -> StoreResult<Message> {
        let mut conn = self.conn()?;
        conn.transaction(|conn| {
            let saved: Message = diesel::insert_into(messages::table)
                .values(&message)
                .get_result(conn)?;
            diesel::update(matches::table.find(saved.match_id))
                .set(matches::last_message_at.eq(saved.created_at))
                .execute(conn)?;
            Ok(saved)
        })
    }

    fn create_block(&self, block: NewBlock) -> StoreResult<Block> {
        let mut conn = self.conn()?;
        diesel::insert_into(blocks::table)
            .values(&block)
            .get_result(&mut conn)
            .map_err(map_db_err)
    }

    fn create_report(&self, report: NewReport) -> StoreResult<Report> {
        let mut conn = self.conn()?;
        Ok(diesel::insert_into(reports::table)
            .values(&report)
            .get_result(&mut conn)?)
    }
}
