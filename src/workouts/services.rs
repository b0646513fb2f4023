use tracing::debug;

use crate::error::{StoreError, ValidationError};
use crate::workouts::{
    dto::{into_entries, CreateWorkoutRequest, EntryRequest, UpdateWorkoutRequest},
    repo::WorkoutStore,
    repo_types::{Workout, WorkoutEntry},
};

const MAX_TITLE_LEN: usize = 255;
const MAX_EXERCISE_NAME_LEN: usize = 255;

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::new("title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::new("title must not exceed 255 characters"));
    }
    Ok(())
}

fn validate_non_negative(field: &str, value: Option<i32>) -> Result<(), ValidationError> {
    match value {
        Some(v) if v < 0 => Err(ValidationError::new(format!("{field} must not be negative"))),
        _ => Ok(()),
    }
}

fn validate_entries(entries: &[EntryRequest]) -> Result<(), ValidationError> {
    for (i, e) in entries.iter().enumerate() {
        if e.exercise_name.trim().is_empty() {
            return Err(ValidationError::new(format!(
                "entries[{i}].exercise_name is required"
            )));
        }
        if e.exercise_name.chars().count() > MAX_EXERCISE_NAME_LEN {
            return Err(ValidationError::new(format!(
                "entries[{i}].exercise_name must not exceed 255 characters"
            )));
        }
        validate_non_negative(&format!("entries[{i}].sets"), Some(e.sets))?;
        validate_non_negative(&format!("entries[{i}].reps"), e.reps)?;
        validate_non_negative(&format!("entries[{i}].duration_seconds"), e.duration_seconds)?;
        if matches!(e.weight, Some(w) if !(w >= 0.0 && w.is_finite())) {
            return Err(ValidationError::new(format!(
                "entries[{i}].weight must be a non-negative number"
            )));
        }
    }
    Ok(())
}

pub fn validate_create(req: &CreateWorkoutRequest) -> Result<(), ValidationError> {
    validate_title(&req.title)?;
    validate_non_negative("duration_minutes", Some(req.duration_minutes))?;
    validate_non_negative("calories_burned", Some(req.calories_burned))?;
    validate_entries(&req.entries)
}

pub fn validate_update(req: &UpdateWorkoutRequest) -> Result<(), ValidationError> {
    if let Some(title) = &req.title {
        validate_title(title)?;
    }
    validate_non_negative("duration_minutes", req.duration_minutes)?;
    validate_non_negative("calories_burned", req.calories_burned)?;
    if let Some(entries) = &req.entries {
        validate_entries(entries)?;
    }
    Ok(())
}

/// Copies the requested fields onto `workout`.
///
/// When the request brings no entries, the current ones are taken out of
/// `workout` and handed back so the store leaves the stored list untouched.
fn merge_update(workout: &mut Workout, req: UpdateWorkoutRequest) -> Option<Vec<WorkoutEntry>> {
    if let Some(title) = req.title {
        workout.title = title;
    }
    if let Some(description) = req.description {
        workout.description = description;
    }
    if let Some(duration_minutes) = req.duration_minutes {
        workout.duration_minutes = duration_minutes;
    }
    if let Some(calories_burned) = req.calories_burned {
        workout.calories_burned = calories_burned;
    }

    match req.entries {
        Some(entries) if !entries.is_empty() => {
            workout.entries = into_entries(entries);
            None
        }
        _ => Some(std::mem::take(&mut workout.entries)),
    }
}

/// Partial update on top of the store's full-replace `update_workout`.
pub async fn update_workout(
    store: &dyn WorkoutStore,
    id: i64,
    req: UpdateWorkoutRequest,
) -> Result<Workout, StoreError> {
    let mut workout = store.get_workout_by_id(id).await?;
    let kept = merge_update(&mut workout, req);
    let replacing = kept.is_none();

    store.update_workout(&mut workout).await?;

    match kept {
        Some(entries) => workout.entries = entries,
        // same order a later read returns
        None => workout.entries.sort_by_key(|e| (e.order_index, e.id)),
    }
    debug!(workout_id = id, replaced_entries = replacing, "workout updated");
    Ok(workout)
}
