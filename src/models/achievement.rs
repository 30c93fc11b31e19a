use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
use uuid::Uuid;

/// Catalogue grouping. Variant order matches the database enum so that
/// in-memory sorting agrees with `ORDER BY category`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Type,
)]
#[sqlx(type_name = "achievement_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    Workout,
    Strength,
    Endurance,
    Consistency,
    Social,
}

/// Closed set of unlock rule kinds. Adding a variant means teaching both the
/// rule engine and the statistics snapshot about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaKind {
    WorkoutCount,
    Streak,
    WeeklyWorkouts,
    MonthlyWorkouts,
    PersonalRecords,
    CardioWorkouts,
}

impl CriteriaKind {
    pub const ALL: [CriteriaKind; 6] = [
        CriteriaKind::WorkoutCount,
        CriteriaKind::Streak,
        CriteriaKind::WeeklyWorkouts,
        CriteriaKind::MonthlyWorkouts,
        CriteriaKind::PersonalRecords,
        CriteriaKind::CardioWorkouts,
    ];

    /// The catalogue category whose achievements carry this criteria kind.
    /// Unlock checks fetch candidates by this category before filtering on
    /// the kind itself.
    pub fn category(&self) -> AchievementCategory {
        match self {
            CriteriaKind::WorkoutCount => AchievementCategory::Workout,
            CriteriaKind::Streak => AchievementCategory::Consistency,
            CriteriaKind::WeeklyWorkouts => AchievementCategory::Consistency,
            CriteriaKind::MonthlyWorkouts => AchievementCategory::Consistency,
            CriteriaKind::PersonalRecords => AchievementCategory::Strength,
            CriteriaKind::CardioWorkouts => AchievementCategory::Workout,
        }
    }
}

#[derive(Debug, Error)]
pub enum CriteriaError {
    #[error("criteria payload is not a {{type, target}} object: {0}")]
    Malformed(String),
    #[error("unknown criteria type '{0}'")]
    UnknownKind(String),
    #[error("criteria target must be positive, got {0}")]
    NonPositiveTarget(i64),
}

/// Declarative unlock rule: "statistic for `kind` reached `target`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementCriteria {
    #[serde(rename = "type")]
    pub kind: CriteriaKind,
    pub target: i64,
}

#[derive(Deserialize)]
struct RawCriteria {
    #[serde(rename = "type")]
    kind: String,
    target: i64,
}

impl AchievementCriteria {
    /// Validates a stored criteria payload. Unknown kinds are reported
    /// separately from shape problems so quarantine logs stay actionable.
    pub fn parse(payload: &serde_json::Value) -> Result<Self, CriteriaError> {
        let raw: RawCriteria = serde_json::from_value(payload.clone())
            .map_err(|_| CriteriaError::Malformed(payload.to_string()))?;
        let kind: CriteriaKind =
            serde_json::from_value(serde_json::Value::String(raw.kind.clone()))
                .map_err(|_| CriteriaError::UnknownKind(raw.kind))?;
        if raw.target <= 0 {
            return Err(CriteriaError::NonPositiveTarget(raw.target));
        }
        Ok(AchievementCriteria {
            kind,
            target: raw.target,
        })
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({ "type": self.kind, "target": self.target })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: Option<String>,
    pub category: AchievementCategory,
    pub criteria: AchievementCriteria,
    pub points: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Catalogue row as stored, criteria still raw JSON. Conversion into
/// [`Achievement`] is where criteria validation happens.
#[derive(Debug, Clone, FromRow)]
pub struct AchievementRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: Option<String>,
    pub category: AchievementCategory,
    pub criteria: serde_json::Value,
    pub points: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl AchievementRow {
    pub fn into_achievement(self) -> Result<Achievement, CriteriaError> {
        let criteria = AchievementCriteria::parse(&self.criteria)?;
        Ok(Achievement {
            id: self.id,
            name: self.name,
            description: self.description,
            icon: self.icon,
            category: self.category,
            criteria,
            points: self.points,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AchievementUnlock {
    pub id: Uuid,
    pub user_id: Uuid,
    pub achievement_id: Uuid,
    pub unlocked_at: DateTime<Utc>,
}

/// An unlock joined with its achievement, for trophy-case views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    pub achievement: Achievement,
    pub unlocked_at: DateTime<Utc>,
}

/// Progress of one user toward one achievement. Derived on demand, never
/// stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementProgress {
    pub achievement_id: Uuid,
    pub current_value: i64,
    pub target_value: i64,
    pub percentage: f64,
    pub unlocked: bool,
    pub achievement: Achievement,
}

impl AchievementProgress {
    /// Builds a progress entry from the current statistic value. The
    /// percentage is clamped to [0, 100]; an unlocked achievement past its
    /// target still reads 100, never more.
    pub fn evaluate(achievement: Achievement, current_value: i64, unlocked: bool) -> Self {
        let target_value = achievement.criteria.target;
        let percentage =
            ((current_value as f64 / target_value as f64) * 100.0).clamp(0.0, 100.0);
        AchievementProgress {
            achievement_id: achievement.id,
            current_value,
            target_value,
            percentage,
            unlocked,
            achievement,
        }
    }
}
