use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppResult, StoreError},
    state::AppState,
    workouts::{
        dto::{CreateWorkoutRequest, UpdateWorkoutRequest, WorkoutEnvelope},
        repo_types::Workout,
        services,
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/workouts", post(create_workout))
        .route(
            "/workouts/:id",
            get(get_workout).put(update_workout).delete(delete_workout),
        )
}

fn read_id_param(raw: &str) -> AppResult<i64> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::Validation("invalid workout id parameter".into())),
    }
}

fn workout_not_found(e: StoreError) -> AppError {
    match e {
        StoreError::NotFound => AppError::NotFound("workout"),
        other => other.into(),
    }
}

#[instrument(skip(state, _user, payload))]
pub async fn create_workout(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    payload: Result<Json<CreateWorkoutRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<WorkoutEnvelope>)> {
    let Json(payload) = payload?;
    services::validate_create(&payload)?;

    let workout = state.workouts.create_workout(Workout::from(payload)).await?;

    info!(workout_id = workout.id, entries = workout.entries.len(), "workout created");
    Ok((StatusCode::CREATED, Json(WorkoutEnvelope { workout })))
}

#[instrument(skip(state, _user))]
pub async fn get_workout(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<WorkoutEnvelope>> {
    let id = read_id_param(&id)?;
    let workout = state
        .workouts
        .get_workout_by_id(id)
        .await
        .map_err(workout_not_found)?;
    Ok(Json(WorkoutEnvelope { workout }))
}

#[instrument(skip(state, _user, payload))]
pub async fn update_workout(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateWorkoutRequest>, JsonRejection>,
) -> AppResult<Json<WorkoutEnvelope>> {
    let id = read_id_param(&id)?;
    let Json(payload) = payload?;
    services::validate_update(&payload)?;

    let workout = services::update_workout(state.workouts.as_ref(), id, payload)
        .await
        .map_err(workout_not_found)?;

    info!(workout_id = workout.id, "workout updated");
    Ok(Json(WorkoutEnvelope { workout }))
}

#[instrument(skip(state, _user))]
pub async fn delete_workout(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = read_id_param(&id)?;
    state
        .workouts
        .delete_workout(id)
        .await
        .map_err(workout_not_found)?;

    info!(workout_id = id, "workout deleted");
    Ok(StatusCode::NO_CONTENT)
}
