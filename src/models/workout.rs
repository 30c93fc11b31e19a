use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "exercise_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    Strength,
    Cardio,
    Flexibility,
    Balance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "workout_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkoutType {
    Strength,
    Cardio,
    Hiit,
    Flexibility,
    Mixed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub muscle_groups: Vec<String>,
    pub exercise_type: ExerciseType,
    pub created_at: DateTime<Utc>,
}

/// One completed set of a session, joined to its exercise. The exercise side
/// of the join is optional: sets whose session exercise lost its exercise
/// reference still come back, with the linkage fields unset.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionSetRow {
    pub exercise_id: Option<Uuid>,
    pub exercise_name: Option<String>,
    pub exercise_kind: Option<ExerciseType>,
    pub reps: Option<i32>,
    pub weight_kg: Option<f64>,
    pub duration_seconds: Option<i32>,
    pub distance_meters: Option<f64>,
}
