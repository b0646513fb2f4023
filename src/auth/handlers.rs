use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{CreateTokenRequest, RegisterRequest, TokenResponse, UpdateUserRequest, UserEnvelope},
        extractors::AuthUser,
        tokens::SCOPE_AUTHENTICATION,
    },
    error::AppResult,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/me", put(update_me))
}

pub fn token_routes() -> Router<AppState> {
    Router::new().route(
        "/tokens/authentication",
        post(create_token).delete(revoke_tokens),
    )
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<UserEnvelope>)> {
    let Json(mut payload) = payload?;
    payload.normalize()?;

    let user = state
        .auth
        .register(payload.username, payload.email, payload.password, payload.bio)
        .await?;

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(UserEnvelope { user })))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> AppResult<Json<UserEnvelope>> {
    let Json(mut payload) = payload?;
    payload.normalize()?;

    let user = state
        .auth
        .update_profile(
            user,
            payload.username,
            payload.email,
            payload.bio,
            payload.password,
        )
        .await?;

    info!(user_id = user.id, "profile updated");
    Ok(Json(UserEnvelope { user }))
}

#[instrument(skip(state, payload))]
pub async fn create_token(
    State(state): State<AppState>,
    payload: Result<Json<CreateTokenRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {
    let Json(payload) = payload?;

    let token = state
        .auth
        .authenticate(payload.username.trim(), &payload.password)
        .await?;

    info!(user_id = token.user_id, "user logged in");
    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            auth_token: token.plaintext,
        }),
    ))
}

/// Logs the caller out everywhere by revoking all of their login tokens.
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn revoke_tokens(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<StatusCode> {
    state
        .auth
        .tokens()
        .delete_all_tokens_for_user(user.id, SCOPE_AUTHENTICATION)
        .await?;

    info!(user_id = user.id, "tokens revoked");
    Ok(StatusCode::NO_CONTENT)
}
