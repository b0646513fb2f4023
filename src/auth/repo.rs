use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::auth::repo_types::{NewUser, User};
use crate::auth::tokens::Token;
use crate::error::StoreError;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn get_user_by_name(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Owner of the unexpired token with this hash and scope, if any.
    async fn get_user_for_token(
        &self,
        scope: &str,
        token_hash: &[u8],
        now: OffsetDateTime,
    ) -> Result<Option<User>, StoreError>;

    /// Overwrites username, email, password hash and bio; refreshes `updated_at`.
    async fn update_user(&self, user: &mut User) -> Result<(), StoreError>;
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn insert_token(&self, token: &Token) -> Result<(), StoreError>;

    async fn delete_all_tokens_for_user(&self, user_id: i64, scope: &str)
        -> Result<u64, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, bio)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, bio, created_at, updated_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.bio)
        .fetch_one(&self.db)
        .await
        .map_err(|e| StoreError::unique_as(e, "username"))
    }

    async fn get_user_by_name(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, bio, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn get_user_for_token(
        &self,
        scope: &str,
        token_hash: &[u8],
        now: OffsetDateTime,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.password_hash, u.bio, u.created_at, u.updated_at
            FROM users u
            INNER JOIN tokens t ON t.user_id = u.id
            WHERE t.hash = $1 AND t.scope = $2 AND t.expiry > $3
            "#,
        )
        .bind(token_hash)
        .bind(scope)
        .bind(now)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn update_user(&self, user: &mut User) -> Result<(), StoreError> {
        let updated_at = sqlx::query_scalar::<_, OffsetDateTime>(
            r#"
            UPDATE users
            SET username = $1, email = $2, password_hash = $3, bio = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING updated_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.bio)
        .bind(user.id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| StoreError::unique_as(e, "username"))?
        .ok_or(StoreError::NotFound)?;

        user.updated_at = updated_at;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgTokenStore {
    db: PgPool,
}

impl PgTokenStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn insert_token(&self, token: &Token) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO tokens (hash, user_id, expiry, scope)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&token.hash)
        .bind(token.user_id)
        .bind(token.expiry)
        .bind(&token.scope)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn delete_all_tokens_for_user(
        &self,
        user_id: i64,
        scope: &str,
    ) -> Result<u64, StoreError> {
        let res = sqlx::query(
            r#"
            DELETE FROM tokens
            WHERE user_id = $1 AND scope = $2
            "#,
        )
        .bind(user_id)
        .bind(scope)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected())
    }
}
