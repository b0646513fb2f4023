use serde::{Deserialize, Serialize};

use crate::workouts::repo_types::{Workout, WorkoutEntry};

#[derive(Debug, Clone, Deserialize)]
pub struct EntryRequest {
    pub exercise_name: String,
    pub sets: i32,
    #[serde(default)]
    pub reps: Option<i32>,
    #[serde(default)]
    pub duration_seconds: Option<i32>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub order_index: Option<i32>, // defaults to position in the list
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkoutRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration_minutes: i32,
    #[serde(default)]
    pub calories_burned: i32,
    #[serde(default)]
    pub entries: Vec<EntryRequest>,
}

/// Only the fields present in the body are applied.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateWorkoutRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub calories_burned: Option<i32>,
    pub entries: Option<Vec<EntryRequest>>,
}

#[derive(Debug, Serialize)]
pub struct WorkoutEnvelope {
    pub workout: Workout,
}

pub fn into_entries(entries: Vec<EntryRequest>) -> Vec<WorkoutEntry> {
    entries
        .into_iter()
        .enumerate()
        .map(|(pos, e)| {
            let order_index = e.order_index.unwrap_or(pos as i32);
            WorkoutEntry::draft(
                e.exercise_name,
                e.sets,
                e.reps,
                e.duration_seconds,
                e.weight,
                e.notes,
                order_index,
            )
        })
        .collect()
}

impl From<CreateWorkoutRequest> for Workout {
    fn from(req: CreateWorkoutRequest) -> Self {
        Workout::draft(
            req.title,
            req.description,
            req.duration_minutes,
            req.calories_burned,
            into_entries(req.entries),
        )
    }
}
