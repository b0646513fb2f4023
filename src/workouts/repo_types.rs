use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, FromRow)]
pub struct WorkoutRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration_minutes: i32,
    pub calories_burned: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Aggregate root; owns its entries.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Workout {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration_minutes: i32,
    pub calories_burned: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub entries: Vec<WorkoutEntry>,
}

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct WorkoutEntry {
    pub id: i64,
    pub workout_id: i64,
    pub exercise_name: String,
    pub sets: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reps: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
    pub order_index: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<WorkoutRow> for Workout {
    fn from(r: WorkoutRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            duration_minutes: r.duration_minutes,
            calories_burned: r.calories_burned,
            created_at: r.created_at,
            updated_at: r.updated_at,
            entries: Vec::new(),
        }
    }
}

impl Workout {
    /// A not-yet-persisted workout; id and timestamps are placeholders until
    /// the store fills them in.
    pub fn draft(
        title: String,
        description: String,
        duration_minutes: i32,
        calories_burned: i32,
        entries: Vec<WorkoutEntry>,
    ) -> Self {
        Self {
            id: 0,
            title,
            description,
            duration_minutes,
            calories_burned,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
            entries,
        }
    }
}

impl WorkoutEntry {
    pub fn draft(
        exercise_name: String,
        sets: i32,
        reps: Option<i32>,
        duration_seconds: Option<i32>,
        weight: Option<f64>,
        notes: String,
        order_index: i32,
    ) -> Self {
        Self {
            id: 0,
            workout_id: 0,
            exercise_name,
            sets,
            reps,
            duration_seconds,
            weight,
            notes,
            order_index,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }
}
