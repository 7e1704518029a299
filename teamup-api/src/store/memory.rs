use std::sync::Mutex;

use uuid::Uuid;

use crate::models::{
    AvailabilityWindow, Block, Game, Match, Message, NewBlock, NewMatch, NewMessage, NewProfile,
    NewReport, NewSwipe, NewUser, Profile, Report, Swipe, User, UserGame,
};

use super::{
    AvailabilitySlot, FeedFilter, GameEntry, MatchAttempt, Store, StoreError, StoreResult,
    SwipeOutcome,
};

/// Test double with the same uniqueness rules as the Postgres schema, all
/// enforced under one lock so compound writes stay atomic.
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    profiles: Vec<Profile>,
    games: Vec<Game>,
    user_games: Vec<UserGame>,
    windows: Vec<AvailabilityWindow>,
    swipes: Vec<Swipe>,
    matches: Vec<Match>,
    messages: Vec<Message>,
    blocks: Vec<Block>,
    reports: Vec<Report>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn get_or_create_game(&mut self, name: &str) -> Game {
        if let Some(game) = self.games.iter().find(|g| g.name == name) {
            return game.clone();
        }
        let game = Game {
            id: Uuid::now_v7(),
            name: name.to_string(),
            icon: None,
        };
        self.games.push(game.clone());
        game
    }
}

fn platforms_contain(platforms: &serde_json::Value, platform: &str) -> bool {
    platforms
        .as_array()
        .map(|arr| arr.iter().any(|v| v.as_str() == Some(platform)))
        .unwrap_or(false)
}

impl Store for MemStore {
    fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict);
        }
        let row = User {
            id: user.id,
            email: user.email,
            password_hash: user.password_hash,
            created_at: user.created_at,
        };
        inner.users.push(row.clone());
        Ok(row)
    }

    fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    fn user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    fn profile_by_user(&self, user_id: Uuid) -> StoreResult<Option<Profile>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    fn save_profile(
        &self,
        profile: NewProfile,
        games_list: Option<&[GameEntry]>,
        windows: Option<&[AvailabilitySlot]>,
    ) -> StoreResult<Profile> {
        let mut inner = self.inner.lock().unwrap();

        let existing = inner
            .profiles
            .iter()
            .position(|p| p.user_id == profile.user_id);
        let saved = match existing {
            Some(pos) => {
                let row = &mut inner.profiles[pos];
                row.nickname = profile.nickname;
                row.bio = profile.bio;
                row.region = profile.region;
                row.language = profile.language;
                row.platforms = profile.platforms;
                row.updated_at = profile.updated_at;
                row.clone()
            }
            None => {
                let row = Profile {
                    id: profile.id,
                    user_id: profile.user_id,
                    nickname: profile.nickname,
                    bio: profile.bio,
                    region: profile.region,
                    language: profile.language,
                    platforms: profile.platforms,
                    created_at: profile.created_at,
                    updated_at: profile.updated_at,
                };
                inner.profiles.push(row.clone());
                row
            }
        };

        if let Some(entries) = games_list {
            inner.user_games.retain(|ug| ug.user_id != saved.user_id);
            for entry in entries {
                let game = inner.get_or_create_game(&entry.name);
                inner.user_games.push(UserGame {
                    id: Uuid::now_v7(),
                    user_id: saved.user_id,
                    game_id: game.id,
                    rank: entry.rank.clone(),
                    roles: serde_json::json!(entry.roles),
                });
            }
        }

        if let Some(slots) = windows {
            inner.windows.retain(|w| w.user_id != saved.user_id);
            for slot in slots {
                inner.windows.push(AvailabilityWindow {
                    id: Uuid::now_v7(),
                    user_id: saved.user_id,
                    day_of_week: slot.day_of_week,
                    start_time: slot.start_time.clone(),
                    end_time: slot.end_time.clone(),
                });
            }
        }

        Ok(saved)
    }

    fn list_games(&self) -> StoreResult<Vec<Game>> {
        let inner = self.inner.lock().unwrap();
        let mut games = inner.games.clone();
        games.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(games)
    }

    fn game_by_name(&self, name: &str) -> StoreResult<Option<Game>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.games.iter().find(|g| g.name == name).cloned())
    }

    fn games_for_user(&self, user_id: Uuid) -> StoreResult<Vec<(UserGame, Game)>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .user_games
            .iter()
            .filter(|ug| ug.user_id == user_id)
            .filter_map(|ug| {
                inner
                    .games
                    .iter()
                    .find(|g| g.id == ug.game_id)
                    .map(|g| (ug.clone(), g.clone()))
            })
            .collect())
    }

    fn windows_for_user(&self, user_id: Uuid) -> StoreResult<Vec<AvailabilityWindow>> {
        let inner = self.inner.lock().unwrap();
        let mut windows: Vec<_> = inner
            .windows
            .iter()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        windows.sort_by_key(|w| w.day_of_week);
        Ok(windows)
    }

    fn blocked_either_way(&self, user_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .blocks
            .iter()
            .filter_map(|b| {
                if b.user_id == user_id {
                    Some(b.blocked_user_id)
                } else if b.blocked_user_id == user_id {
                    Some(b.user_id)
                } else {
                    None
                }
            })
            .collect())
    }

    fn swiped_targets(&self, from_user_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .swipes
            .iter()
            .filter(|s| s.from_user_id == from_user_id)
            .map(|s| s.to_user_id)
            .collect())
    }

    fn feed_page(
        &self,
        game_id: Uuid,
        excluded: &[Uuid],
        filter: &FeedFilter,
        cursor: Option<Uuid>,
        limit: i64,
    ) -> StoreResult<Vec<Profile>> {
        let inner = self.inner.lock().unwrap();
        let mut page: Vec<Profile> = inner
            .profiles
            .iter()
            .filter(|p| {
                inner
                    .user_games
                    .iter()
                    .any(|ug| ug.user_id == p.user_id && ug.game_id == game_id)
            })
            .filter(|p| !excluded.contains(&p.user_id))
            .filter(|p| filter.region.as_deref().map_or(true, |r| p.region == r))
            .filter(|p| filter.language.as_deref().map_or(true, |l| p.language == l))
            .filter(|p| {
                filter
                    .platform
                    .as_deref()
                    .map_or(true, |pl| platforms_contain(&p.platforms, pl))
            })
            .filter(|p| cursor.map_or(true, |c| p.id > c))
            .cloned()
            .collect();
        page.sort_by_key(|p| p.id);
        page.truncate(limit as usize);
        Ok(page)
    }

    fn create_swipe(
        &self,
        swipe: NewSwipe,
        attempt: Option<MatchAttempt>,
    ) -> StoreResult<SwipeOutcome> {
        let mut inner = self.inner.lock().unwrap();

        if inner
            .swipes
            .iter()
            .any(|s| s.from_user_id == swipe.from_user_id && s.to_user_id == swipe.to_user_id)
        {
            return Err(StoreError::Conflict);
        }

        let inserted = Swipe {
            id: swipe.id,
            from_user_id: swipe.from_user_id,
            to_user_id: swipe.to_user_id,
            kind: swipe.kind,
            created_at: swipe.created_at,
        };
        inner.swipes.push(inserted.clone());

        let matched = attempt.and_then(|attempt| {
            let reciprocal = inner.swipes.iter().any(|s| {
                s.from_user_id == inserted.to_user_id
                    && s.to_user_id == inserted.from_user_id
                    && attempt.reciprocal_kinds.contains(&s.kind)
            });
            if !reciprocal {
                return None;
            }
            let NewMatch {
                id,
                user_a,
                user_b,
                matched_at,
                last_message_at,
            } = attempt.match_row;
            if let Some(existing) = inner
                .matches
                .iter()
                .find(|m| m.user_a == user_a && m.user_b == user_b)
            {
                return Some(existing.clone());
            }
            let row = Match {
                id,
                user_a,
                user_b,
                matched_at,
                last_message_at,
            };
            inner.matches.push(row.clone());
            Some(row)
        });

        Ok(SwipeOutcome {
            swipe: inserted,
            matched,
        })
    }

    fn matches_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Match>> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<_> = inner
            .matches
            .iter()
            .filter(|m| m.involves(user_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.matched_at.cmp(&a.matched_at));
        Ok(rows)
    }

    fn match_by_id(&self, id: Uuid) -> StoreResult<Option<Match>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.matches.iter().find(|m| m.id == id).cloned())
    }

    fn messages_before(
        &self,
        match_id: Uuid,
        before: Option<Uuid>,
        limit: i64,
    ) -> StoreResult<Vec<Message>> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<_> = inner
            .messages
            .iter()
            .filter(|m| m.match_id == match_id)
            .filter(|m| before.map_or(true, |b| m.id < b))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        rows.truncate(limit as usize);
        Ok(rows)
    }

    fn append_message(&self, message: NewMessage) -> StoreResult<Message> {
        let mut inner = self.inner.lock().unwrap();
        let saved = Message {
            id: message.id,
            match_id: message.match_id,
            sender_id: message.sender_id,
            text: message.text,
            created_at: message.created_at,
        };
        inner.messages.push(saved.clone());
        if let Some(row) = inner.matches.iter_mut().find(|m| m.id == saved.match_id) {
            row.last_message_at = Some(saved.created_at);
        }
        Ok(saved)
    }

    fn create_block(&self, block: NewBlock) -> StoreResult<Block> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .blocks
            .iter()
            .any(|b| b.user_id == block.user_id && b.blocked_user_id == block.blocked_user_id)
        {
            return Err(StoreError::Conflict);
        }
        let row = Block {
            user_id: block.user_id,
            blocked_user_id: block.blocked_user_id,
            created_at: block.created_at,
        };
        inner.blocks.push(row.clone());
        Ok(row)
    }

    fn create_report(&self, report: NewReport) -> StoreResult<Report> {
        let mut inner = self.inner.lock().unwrap();
        let row = Report {
            id: report.id,
            reporter_id: report.reporter_id,
            reported_user_id: report.reported_user_id,
            reason: report.reason,
            details: report.details,
            status: report.status,
            created_at: report.created_at,
        };
        inner.reports.push(row.clone());
        Ok(row)
    }
}
