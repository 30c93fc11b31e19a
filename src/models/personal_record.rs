use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::collections::HashMap;
use uuid::Uuid;

use super::workout::{ExerciseType, SessionSetRow};

/// The four kinds of personal record, each with its own source measurement
/// and comparison direction. Time records improve downward, everything else
/// improves upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "record_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    MaxWeight,
    MaxReps,
    MaxDistance,
    BestTime,
}

impl RecordType {
    /// Record types applicable to an exercise. Flexibility and balance work
    /// carries no comparable measurement, so it produces no records.
    pub fn for_exercise(exercise_type: ExerciseType) -> &'static [RecordType] {
        match exercise_type {
            ExerciseType::Strength => &[RecordType::MaxWeight, RecordType::MaxReps],
            ExerciseType::Cardio => &[RecordType::BestTime, RecordType::MaxDistance],
            ExerciseType::Flexibility | ExerciseType::Balance => &[],
        }
    }

    /// Best value for this record type across a session's completed sets.
    /// Sets without a usable positive measurement are ignored; `None` means
    /// the session produced nothing comparable for this type.
    pub fn session_best(&self, sets: &[SessionSetRow]) -> Option<f64> {
        match self {
            RecordType::MaxWeight => positive_max(sets.iter().filter_map(|s| s.weight_kg)),
            RecordType::MaxReps => {
                positive_max(sets.iter().filter_map(|s| s.reps.map(f64::from)))
            }
            RecordType::MaxDistance => {
                positive_max(sets.iter().filter_map(|s| s.distance_meters))
            }
            RecordType::BestTime => {
                positive_min(sets.iter().filter_map(|s| s.duration_seconds.map(f64::from)))
            }
        }
    }

    /// Strict improvement test against the stored record. An absent record
    /// counts as zero for the max types and as no lower bound for best time,
    /// so any positive candidate beats an absent record. Equality never
    /// improves.
    pub fn improves(&self, candidate: f64, previous: Option<f64>) -> bool {
        match self {
            RecordType::BestTime => match previous {
                Some(prev) => candidate < prev,
                None => true,
            },
            _ => candidate > previous.unwrap_or(0.0),
        }
    }

    /// Margin of improvement for reporting. With no prior record the full
    /// value is the improvement.
    pub fn improvement(&self, value: f64, previous: Option<f64>) -> f64 {
        match previous {
            None => value,
            Some(prev) => match self {
                RecordType::BestTime => prev - value,
                _ => value - prev,
            },
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            RecordType::MaxWeight => "kg",
            RecordType::MaxReps => "reps",
            RecordType::MaxDistance => "meters",
            RecordType::BestTime => "seconds",
        }
    }

    /// Human-readable rendering of a record value, e.g. "62.5 kg",
    /// "12 reps", "1.5 km", "4:05".
    pub fn format_value(&self, value: f64) -> String {
        match self {
            RecordType::MaxWeight => format!("{} kg", value),
            RecordType::MaxReps => format!("{} reps", value),
            RecordType::BestTime => format_duration(value),
            RecordType::MaxDistance => {
                if value >= 1000.0 {
                    format!("{:.1} km", value / 1000.0)
                } else {
                    format!("{} m", value)
                }
            }
        }
    }
}

/// Renders a duration in seconds as `h:mm:ss`, `m:ss`, or `Ns` for
/// sub-minute times.
pub fn format_duration(total_seconds: f64) -> String {
    let total = total_seconds.max(0.0) as i64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}:{:02}", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

fn positive_max(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.filter(|v| *v > 0.0).reduce(f64::max)
}

fn positive_min(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.filter(|v| *v > 0.0).reduce(f64::min)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PersonalRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub exercise_id: Uuid,
    pub record_type: RecordType,
    pub value: f64,
    pub unit: String,
    pub session_id: Option<Uuid>,
    pub achieved_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPersonalRecord {
    pub user_id: Uuid,
    pub exercise_id: Uuid,
    pub record_type: RecordType,
    pub value: f64,
    pub unit: String,
    pub session_id: Option<Uuid>,
    pub achieved_at: DateTime<Utc>,
}

/// Emitted once per record the store actually accepted, for celebration UI
/// and notifications. `previous_value` is zero when no record existed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalRecordEvent {
    pub exercise_id: Uuid,
    pub exercise_name: String,
    pub record_type: RecordType,
    pub value: f64,
    pub unit: String,
    pub previous_value: f64,
    pub improvement: f64,
    pub achieved_at: DateTime<Utc>,
    pub session_id: Uuid,
}

/// A personal record joined with its exercise, for record-list views.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecordWithExercise {
    pub id: Uuid,
    pub user_id: Uuid,
    pub exercise_id: Uuid,
    pub record_type: RecordType,
    pub value: f64,
    pub unit: String,
    pub session_id: Option<Uuid>,
    pub achieved_at: DateTime<Utc>,
    pub exercise_name: String,
    pub muscle_groups: Vec<String>,
    pub exercise_kind: ExerciseType,
}

/// Compact per-record facts used to derive [`PersonalRecordStats`] without
/// shipping whole rows.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecordSummary {
    pub record_type: RecordType,
    pub achieved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalRecordStats {
    pub total_records: i64,
    pub recent_records: i64,
    pub records_by_type: HashMap<RecordType, i64>,
}

impl PersonalRecordStats {
    /// Derives the stats from per-record summaries. Recent means achieved in
    /// the thirty days before `now`.
    pub fn from_summaries(summaries: &[RecordSummary], now: DateTime<Utc>) -> Self {
        let cutoff = now - chrono::Duration::days(30);
        let mut records_by_type: HashMap<RecordType, i64> = HashMap::new();
        let mut recent_records = 0;
        for summary in summaries {
            *records_by_type.entry(summary.record_type).or_insert(0) += 1;
            if summary.achieved_at > cutoff {
                recent_records += 1;
            }
        }
        PersonalRecordStats {
            total_records: summaries.len() as i64,
            recent_records,
            records_by_type,
        }
    }
}
