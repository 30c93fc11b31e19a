use serde::{Deserialize, Serialize};

use super::achievement::CriteriaKind;

/// Point-in-time snapshot of the aggregate counters the progress view is
/// built from. Assembled by one reader pass, then evaluated purely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatistics {
    pub total_workouts: i64,
    pub current_streak: i64,
    pub weekly_workouts: i64,
    pub monthly_workouts: i64,
    pub personal_records: i64,
}

impl UserStatistics {
    /// Snapshot counter backing a criteria kind. The snapshot carries no
    /// cardio workout count, so `CardioWorkouts` has none and its progress
    /// reads as zero even though the unlock path counts it for real.
    pub fn value_for(&self, kind: CriteriaKind) -> Option<i64> {
        match kind {
            CriteriaKind::WorkoutCount => Some(self.total_workouts),
            CriteriaKind::Streak => Some(self.current_streak),
            CriteriaKind::WeeklyWorkouts => Some(self.weekly_workouts),
            CriteriaKind::MonthlyWorkouts => Some(self.monthly_workouts),
            CriteriaKind::PersonalRecords => Some(self.personal_records),
            CriteriaKind::CardioWorkouts => None,
        }
    }
}
