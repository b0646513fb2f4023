use std::time::Duration;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let database = DatabaseConfig {
            url,
            max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT_SECS", 5),
        };
        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("APP_PORT", 8080),
            database,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.database.acquire_timeout_secs)
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_on_missing_or_garbage() {
        assert_eq!(env_or::<u32>("WORKOUT_TRACKER_SURELY_UNSET", 7), 7);

        std::env::set_var("WORKOUT_TRACKER_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_or::<u64>("WORKOUT_TRACKER_TEST_GARBAGE", 30), 30);

        std::env::set_var("WORKOUT_TRACKER_TEST_PORT", "9090");
        assert_eq!(env_or::<u16>("WORKOUT_TRACKER_TEST_PORT", 8080), 9090);
    }
}
