//! In-memory stores and a settable clock for unit tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use time::{macros::datetime, Duration, OffsetDateTime};

use crate::auth::{
    repo::{TokenStore, UserStore},
    repo_types::{NewUser, User},
    tokens::{Clock, Token},
};
use crate::error::StoreError;
use crate::workouts::{repo::WorkoutStore, repo_types::Workout};

pub struct ManualClock {
    now: Mutex<OffsetDateTime>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Mutex::new(datetime!(2024-01-01 08:00 UTC)),
        }
    }
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().unwrap()
    }
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    tokens: Vec<Token>,
    workouts: BTreeMap<i64, Workout>,
    next_user_id: i64,
    next_workout_id: i64,
    next_entry_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_user_lookups: AtomicBool,
    fail_token_inserts: AtomicBool,
}

fn injected() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

impl MemoryStore {
    pub fn fail_user_lookups(&self, on: bool) {
        self.fail_user_lookups.store(on, Ordering::SeqCst);
    }

    pub fn fail_token_inserts(&self, on: bool) {
        self.fail_token_inserts.store(on, Ordering::SeqCst);
    }

    pub fn token_count(&self) -> usize {
        self.inner.lock().unwrap().tokens.len()
    }

    pub fn workout_count(&self) -> usize {
        self.inner.lock().unwrap().workouts.len()
    }

    /// A user whose password hash is not a real hash; for token tests only.
    pub async fn seed_user(&self, username: &str) -> User {
        self.create_user(NewUser {
            username: username.into(),
            email: format!("{username}@example.com"),
            password_hash: "unused".into(),
            bio: String::new(),
        })
        .await
        .unwrap()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict("username"));
        }
        inner.next_user_id += 1;
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: inner.next_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            bio: user.bio,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_name(&self, username: &str) -> Result<Option<User>, StoreError> {
        if self.fail_user_lookups.load(Ordering::SeqCst) {
            return Err(injected());
        }
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }

    async fn get_user_for_token(
        &self,
        scope: &str,
        token_hash: &[u8],
        now: OffsetDateTime,
    ) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let owner = inner
            .tokens
            .iter()
            .find(|t| t.hash == token_hash && t.scope == scope && t.is_valid_at(now))
            .map(|t| t.user_id);
        Ok(owner.and_then(|id| inner.users.iter().find(|u| u.id == id).cloned()))
    }

    async fn update_user(&self, user: &mut User) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .users
            .iter()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(StoreError::Conflict("username"));
        }
        let stored = inner
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(StoreError::NotFound)?;
        user.updated_at = OffsetDateTime::now_utc();
        *stored = user.clone();
        Ok(())
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn insert_token(&self, token: &Token) -> Result<(), StoreError> {
        if self.fail_token_inserts.load(Ordering::SeqCst) {
            return Err(injected());
        }
        let mut inner = self.inner.lock().unwrap();
        if inner.tokens.iter().any(|t| t.hash == token.hash) {
            return Err(StoreError::Conflict("token"));
        }
        // keep only what the tokens table holds
        inner.tokens.push(Token {
            plaintext: String::new(),
            ..token.clone()
        });
        Ok(())
    }

    async fn delete_all_tokens_for_user(
        &self,
        user_id: i64,
        scope: &str,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.tokens.len();
        inner
            .tokens
            .retain(|t| !(t.user_id == user_id && t.scope == scope));
        Ok((before - inner.tokens.len()) as u64)
    }
}

#[async_trait]
impl WorkoutStore for MemoryStore {
    async fn create_workout(&self, mut workout: Workout) -> Result<Workout, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_workout_id += 1;
        let now = OffsetDateTime::now_utc();
        workout.id = inner.next_workout_id;
        workout.created_at = now;
        workout.updated_at = now;
        for entry in workout.entries.iter_mut() {
            inner.next_entry_id += 1;
            entry.id = inner.next_entry_id;
            entry.workout_id = workout.id;
            entry.created_at = now;
        }
        inner.workouts.insert(workout.id, workout.clone());
        Ok(workout)
    }

    async fn get_workout_by_id(&self, id: i64) -> Result<Workout, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut workout = inner.workouts.get(&id).cloned().ok_or(StoreError::NotFound)?;
        workout.entries.sort_by_key(|e| (e.order_index, e.id));
        Ok(workout)
    }

    async fn update_workout(&self, workout: &mut Workout) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let existing_entries = inner
            .workouts
            .get(&workout.id)
            .map(|w| w.entries.clone())
            .ok_or(StoreError::NotFound)?;

        let now = OffsetDateTime::now_utc();
        workout.updated_at = now;
        let entries = if workout.entries.is_empty() {
            existing_entries
        } else {
            for entry in workout.entries.iter_mut() {
                inner.next_entry_id += 1;
                entry.id = inner.next_entry_id;
                entry.workout_id = workout.id;
                entry.created_at = now;
            }
            workout.entries.clone()
        };

        let mut stored = workout.clone();
        stored.entries = entries;
        inner.workouts.insert(workout.id, stored);
        Ok(())
    }

    async fn delete_workout(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.workouts.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}
