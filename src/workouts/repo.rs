use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::StoreError;
use crate::workouts::repo_types::{Workout, WorkoutEntry, WorkoutRow};

#[async_trait]
pub trait WorkoutStore: Send + Sync {
    /// Inserts the workout and all of its entries atomically, filling in
    /// generated ids and timestamps.
    async fn create_workout(&self, workout: Workout) -> Result<Workout, StoreError>;

    /// Entries come back ordered by `order_index`.
    async fn get_workout_by_id(&self, id: i64) -> Result<Workout, StoreError>;

    /// Replaces the parent fields. A non-empty `entries` list replaces the
    /// stored entries wholesale; an empty one leaves them alone.
    async fn update_workout(&self, workout: &mut Workout) -> Result<(), StoreError>;

    async fn delete_workout(&self, id: i64) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgWorkoutStore {
    db: PgPool,
}

impl PgWorkoutStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Insert entries for `workout_id` within a transaction.
async fn insert_entries_tx(
    tx: &mut Transaction<'_, Postgres>,
    workout_id: i64,
    entries: &mut [WorkoutEntry],
) -> Result<(), StoreError> {
    for entry in entries.iter_mut() {
        let (id, created_at) = sqlx::query_as::<_, (i64, time::OffsetDateTime)>(
            r#"
            INSERT INTO workout_entries (
                workout_id, exercise_name, sets, reps,
                duration_seconds, weight, notes, order_index
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, created_at
            "#,
        )
        .bind(workout_id)
        .bind(&entry.exercise_name)
        .bind(entry.sets)
        .bind(entry.reps) // Option → NULL allowed
        .bind(entry.duration_seconds)
        .bind(entry.weight)
        .bind(&entry.notes)
        .bind(entry.order_index)
        .fetch_one(&mut **tx)
        .await?;

        entry.id = id;
        entry.workout_id = workout_id;
        entry.created_at = created_at;
    }
    Ok(())
}

#[async_trait]
impl WorkoutStore for PgWorkoutStore {
    async fn create_workout(&self, mut workout: Workout) -> Result<Workout, StoreError> {
        // dropping `tx` without commit rolls everything back
        let mut tx = self.db.begin().await?;

        let (id, created_at, updated_at) = sqlx::query_as::<
            _,
            (i64, time::OffsetDateTime, time::OffsetDateTime),
        >(
            r#"
            INSERT INTO workouts (title, description, duration_minutes, calories_burned)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at, updated_at
            "#,
        )
        .bind(&workout.title)
        .bind(&workout.description)
        .bind(workout.duration_minutes)
        .bind(workout.calories_burned)
        .fetch_one(&mut *tx)
        .await?;

        workout.id = id;
        workout.created_at = created_at;
        workout.updated_at = updated_at;

        insert_entries_tx(&mut tx, id, &mut workout.entries).await?;

        tx.commit().await?;
        Ok(workout)
    }

    async fn get_workout_by_id(&self, id: i64) -> Result<Workout, StoreError> {
        let row = sqlx::query_as::<_, WorkoutRow>(
            r#"
            SELECT id, title, description, duration_minutes,
                   calories_burned, created_at, updated_at
            FROM workouts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(StoreError::NotFound)?;

        let entries = sqlx::query_as::<_, WorkoutEntry>(
            r#"
            SELECT id, workout_id, exercise_name, sets, reps,
                   duration_seconds, weight, notes, order_index, created_at
            FROM workout_entries
            WHERE workout_id = $1
            ORDER BY order_index ASC, id ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        let mut workout = Workout::from(row);
        workout.entries = entries;
        Ok(workout)
    }

    async fn update_workout(&self, workout: &mut Workout) -> Result<(), StoreError> {
        let mut tx = self.db.begin().await?;

        let updated_at = sqlx::query_scalar::<_, time::OffsetDateTime>(
            r#"
            UPDATE workouts
            SET title = $1, description = $2, duration_minutes = $3,
                calories_burned = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING updated_at
            "#,
        )
        .bind(&workout.title)
        .bind(&workout.description)
        .bind(workout.duration_minutes)
        .bind(workout.calories_burned)
        .bind(workout.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;

        workout.updated_at = updated_at;

        if !workout.entries.is_empty() {
            sqlx::query("DELETE FROM workout_entries WHERE workout_id = $1")
                .bind(workout.id)
                .execute(&mut *tx)
                .await?;
            insert_entries_tx(&mut tx, workout.id, &mut workout.entries).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_workout(&self, id: i64) -> Result<(), StoreError> {
        // workout_entries rows go with ON DELETE CASCADE
        let res = sqlx::query("DELETE FROM workouts WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
