use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{UserStatistics, WorkoutType};

/// Read interface over the aggregate counters the rule engine consumes.
/// Kept narrow so the statistics computation can live elsewhere and so
/// tests can substitute a mock.
#[async_trait]
pub trait StatisticsReader: Send + Sync {
    /// Number of completed sessions, optionally bounded by when the session
    /// started.
    async fn completed_session_count(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<i64>;

    /// The user's current workout streak, zero when no streak is tracked.
    async fn current_streak(&self, user_id: Uuid) -> Result<i64>;

    async fn personal_record_count(&self, user_id: Uuid) -> Result<i64>;

    /// Completed sessions belonging to a cardio workout.
    async fn cardio_session_count(&self, user_id: Uuid) -> Result<i64>;

    /// Assembles the snapshot behind the progress view. One failed counter
    /// fails the whole snapshot; progress is all-or-nothing.
    async fn load_statistics(&self, user_id: Uuid) -> Result<UserStatistics> {
        let now = Utc::now();
        let total_workouts = self.completed_session_count(user_id, None, None).await?;
        let current_streak = self.current_streak(user_id).await?;
        let weekly_workouts = self
            .completed_session_count(user_id, Some(now - Duration::days(7)), None)
            .await?;
        let monthly_workouts = self
            .completed_session_count(user_id, Some(now - Duration::days(30)), None)
            .await?;
        let personal_records = self.personal_record_count(user_id).await?;

        Ok(UserStatistics {
            total_workouts,
            current_streak,
            weekly_workouts,
            monthly_workouts,
            personal_records,
        })
    }
}

#[derive(Debug, Clone)]
pub struct StatisticsService {
    db: PgPool,
}

impl StatisticsService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StatisticsReader for StatisticsService {
    async fn completed_session_count(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM workout_sessions
            WHERE user_id = $1
              AND completed_at IS NOT NULL
              AND ($2::timestamptz IS NULL OR started_at >= $2)
              AND ($3::timestamptz IS NULL OR started_at <= $3)
            "#,
        )
        .bind(user_id)
        .bind(since)
        .bind(until)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    async fn current_streak(&self, user_id: Uuid) -> Result<i64> {
        let streak = sqlx::query_scalar::<_, i32>(
            "SELECT current_streak FROM workout_streaks WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(streak.map(i64::from).unwrap_or(0))
    }

    async fn personal_record_count(&self, user_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM personal_records WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    async fn cardio_session_count(&self, user_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM workout_sessions ws
            JOIN workouts w ON w.id = ws.workout_id
            WHERE ws.user_id = $1
              AND ws.completed_at IS NOT NULL
              AND w.workout_type = $2
            "#,
        )
        .bind(user_id)
        .bind(WorkoutType::Cardio)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }
}
