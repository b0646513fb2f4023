use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::{error, warn};

use super::repo_types::{Identity, User};
use super::tokens::SCOPE_AUTHENTICATION;
use crate::error::AppError;
use crate::state::AppState;

/// Resolves the bearer token, if any, into an [`Identity`].
///
/// No `Authorization` header means anonymous; a header that is present but
/// malformed, or names an unknown or expired token, is rejected.
#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Identity::Anonymous);
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Unauthorized("invalid authorization header"))?;

        match state
            .auth
            .tokens()
            .resolve_token(token, SCOPE_AUTHENTICATION)
            .await
        {
            Ok(Some(user)) => Ok(Identity::Authenticated(user)),
            Ok(None) => {
                warn!("invalid or expired token");
                Err(AppError::Unauthorized("invalid or expired token"))
            }
            Err(e) => {
                error!(error = %e, "resolve_token failed");
                Err(AppError::Persistence(e))
            }
        }
    }
}

/// An authenticated user; anonymous requests are rejected with 401.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match Identity::from_request_parts(parts, state).await? {
            Identity::Authenticated(user) => Ok(AuthUser(user)),
            Identity::Anonymous => Err(AppError::Unauthorized("you must be logged in")),
        }
    }
}
