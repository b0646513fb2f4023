use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::auth::{
    repo::{PgTokenStore, PgUserStore, TokenStore, UserStore},
    services::{AuthService, TokenService},
    tokens::{Clock, SystemClock},
};
use crate::config::AppConfig;
use crate::workouts::repo::{PgWorkoutStore, WorkoutStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
    pub workouts: Arc<dyn WorkoutStore>,
}

impl AppState {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
        PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&config.database.url)
            .await
            .context("connect to database")
    }

    /// Wires the Postgres adapters onto `db`.
    pub fn from_pool(config: Arc<AppConfig>, db: PgPool) -> Self {
        Self::from_parts(
            config,
            Arc::new(PgUserStore::new(db.clone())),
            Arc::new(PgTokenStore::new(db.clone())),
            Arc::new(PgWorkoutStore::new(db)),
            Arc::new(SystemClock),
        )
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenStore>,
        workouts: Arc<dyn WorkoutStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let token_service = TokenService::new(users.clone(), tokens, clock);
        Self {
            config,
            auth: AuthService::new(users, token_service),
            workouts,
        }
    }
}
