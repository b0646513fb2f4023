use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use time::Duration;
use tokio::task::JoinError;
use tracing::{debug, error, warn};

use crate::auth::{
    password::{self, PasswordError},
    repo::{TokenStore, UserStore},
    repo_types::{NewUser, User},
    tokens::{hash_token, Clock, Token, AUTH_TOKEN_TTL, SCOPE_AUTHENTICATION},
};
use crate::error::StoreError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user or wrong password; callers must not tell them apart.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("password task failed: {0}")]
    Task(#[from] JoinError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// bcrypt is CPU bound; keep it off the async workers.
pub async fn hash_password(plain: String) -> Result<String, AuthError> {
    let hash = tokio::task::spawn_blocking(move || password::hash_password(&plain)).await??;
    Ok(hash)
}

pub async fn verify_password(plain: String, hash: String) -> Result<bool, AuthError> {
    let ok = tokio::task::spawn_blocking(move || password::verify_password(&plain, &hash)).await??;
    Ok(ok)
}

/// Issues, resolves and revokes opaque tokens.
#[derive(Clone)]
pub struct TokenService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            tokens,
            clock,
        }
    }

    /// The returned token is the only place its plaintext ever exists.
    pub async fn create_token(
        &self,
        user_id: i64,
        ttl: Duration,
        scope: &str,
    ) -> Result<Token, StoreError> {
        let token = Token::generate(user_id, ttl, scope, self.clock.now());
        self.tokens.insert_token(&token).await?;
        debug!(user_id, scope, expiry = %token.expiry, "token issued");
        Ok(token)
    }

    /// `Ok(None)` for unknown, expired or wrong-scope tokens.
    pub async fn resolve_token(
        &self,
        plaintext: &str,
        scope: &str,
    ) -> Result<Option<User>, StoreError> {
        let hash = hash_token(plaintext);
        self.users
            .get_user_for_token(scope, &hash, self.clock.now())
            .await
    }

    pub async fn delete_all_tokens_for_user(
        &self,
        user_id: i64,
        scope: &str,
    ) -> Result<(), StoreError> {
        let removed = self.tokens.delete_all_tokens_for_user(user_id, scope).await?;
        debug!(user_id, scope, removed, "tokens revoked");
        Ok(())
    }
}

/// Registration, login and profile changes on top of the stores.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub async fn register(
        &self,
        username: String,
        email: String,
        password: String,
        bio: String,
    ) -> Result<User, AuthError> {
        let password_hash = hash_password(password).await?;
        let user = self
            .users
            .create_user(NewUser {
                username,
                email,
                password_hash,
                bio,
            })
            .await?;
        Ok(user)
    }

    /// Checks the credentials and issues a 24h authentication token.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Token, AuthError> {
        let user = match self.users.get_user_by_name(username).await {
            Ok(Some(u)) => u,
            Ok(None) => {
                warn!(%username, "login unknown username");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                // reported the same way as an unknown user
                error!(error = %e, %username, "get_user_by_name failed");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            warn!(%username, user_id = user.id, "login invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .tokens
            .create_token(user.id, AUTH_TOKEN_TTL, SCOPE_AUTHENTICATION)
            .await?;
        Ok(token)
    }

    /// Applies the supplied profile fields to `user` and persists the result.
    pub async fn update_profile(
        &self,
        mut user: User,
        username: Option<String>,
        email: Option<String>,
        bio: Option<String>,
        password: Option<String>,
    ) -> Result<User, AuthError> {
        if let Some(username) = username {
            user.username = username;
        }
        if let Some(email) = email {
            user.email = email;
        }
        if let Some(bio) = bio {
            user.bio = bio;
        }
        if let Some(password) = password {
            user.password_hash = hash_password(password).await?;
        }

        self.users.update_user(&mut user).await?;
        Ok(user)
    }
}
