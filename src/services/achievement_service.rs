use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Achievement, AchievementProgress, CriteriaKind, UnlockedAchievement};
use crate::services::statistics_service::{StatisticsReader, StatisticsService};
use crate::storage::{AchievementStore, PgAchievementStore};

pub struct AchievementService {
    achievements: Arc<dyn AchievementStore>,
    statistics: Arc<dyn StatisticsReader>,
}

impl AchievementService {
    pub fn new(db: PgPool) -> Self {
        Self {
            achievements: Arc::new(PgAchievementStore::new(db.clone())),
            statistics: Arc::new(StatisticsService::new(db)),
        }
    }

    pub fn with_sources(
        achievements: Arc<dyn AchievementStore>,
        statistics: Arc<dyn StatisticsReader>,
    ) -> Self {
        Self {
            achievements,
            statistics,
        }
    }

    /// Evaluates every criteria kind for the user and unlocks whatever is
    /// due, returning only achievements this call actually unlocked. A
    /// failure in one kind is logged and costs that kind's unlocks at most;
    /// the other kinds still run.
    pub async fn evaluate_and_unlock(&self, user_id: Uuid) -> Result<Vec<Achievement>> {
        let mut unlocked = Vec::new();
        for kind in CriteriaKind::ALL {
            match self.check_criteria_kind(user_id, kind).await {
                Ok(mut newly) => unlocked.append(&mut newly),
                Err(e) => {
                    tracing::warn!(
                        "Achievement check {:?} failed for user {}: {}",
                        kind,
                        user_id,
                        e
                    );
                }
            }
        }
        Ok(unlocked)
    }

    /// One criteria kind: fetch the category's candidates and the one
    /// statistic that kind needs, then unlock everything at or past its
    /// target. The unlocked set is re-read on every check; the unique
    /// constraint on the unlock table is the real duplicate guard, this
    /// read just avoids pointless inserts.
    async fn check_criteria_kind(
        &self,
        user_id: Uuid,
        kind: CriteriaKind,
    ) -> Result<Vec<Achievement>> {
        let unlocked_ids = self.achievements.unlocked_ids(user_id).await?;
        let candidates = self
            .achievements
            .active_by_category(kind.category())
            .await?;
        let statistic = self.statistic_for(user_id, kind).await?;

        let mut newly_unlocked = Vec::new();
        for achievement in candidates {
            if achievement.criteria.kind != kind {
                continue;
            }
            if unlocked_ids.contains(&achievement.id) {
                continue;
            }
            if statistic < achievement.criteria.target {
                continue;
            }
            if self
                .achievements
                .insert_unlock(user_id, achievement.id)
                .await?
            {
                tracing::info!(
                    "User {} unlocked achievement '{}' ({} points)",
                    user_id,
                    achievement.name,
                    achievement.points
                );
                newly_unlocked.push(achievement);
            }
        }
        Ok(newly_unlocked)
    }

    /// The single statistic backing a criteria kind's unlock check.
    async fn statistic_for(&self, user_id: Uuid, kind: CriteriaKind) -> Result<i64> {
        let now = Utc::now();
        match kind {
            CriteriaKind::WorkoutCount => {
                self.statistics
                    .completed_session_count(user_id, None, None)
                    .await
            }
            CriteriaKind::Streak => self.statistics.current_streak(user_id).await,
            CriteriaKind::WeeklyWorkouts => {
                self.statistics
                    .completed_session_count(user_id, Some(now - Duration::days(7)), None)
                    .await
            }
            CriteriaKind::MonthlyWorkouts => {
                self.statistics
                    .completed_session_count(user_id, Some(now - Duration::days(30)), None)
                    .await
            }
            CriteriaKind::PersonalRecords => {
                self.statistics.personal_record_count(user_id).await
            }
            CriteriaKind::CardioWorkouts => self.statistics.cardio_session_count(user_id).await,
        }
    }

    /// Progress toward every active achievement, ordered by category then
    /// points. Unlike the unlock checks this is all-or-nothing: a failed
    /// fetch is an error and the caller retries the whole call rather than
    /// rendering a partial progress view.
    pub async fn compute_progress(&self, user_id: Uuid) -> Result<Vec<AchievementProgress>> {
        let achievements = self.achievements.all_active().await?;
        let unlocked_ids = self.achievements.unlocked_ids(user_id).await?;
        let statistics = self.statistics.load_statistics(user_id).await?;

        let progress = achievements
            .into_iter()
            .map(|achievement| {
                let current = statistics.value_for(achievement.criteria.kind).unwrap_or(0);
                let unlocked = unlocked_ids.contains(&achievement.id);
                AchievementProgress::evaluate(achievement, current, unlocked)
            })
            .collect();

        Ok(progress)
    }

    /// Achievements the user has unlocked, newest first.
    pub async fn unlocked_achievements(&self, user_id: Uuid) -> Result<Vec<UnlockedAchievement>> {
        self.achievements.unlocks_with_achievements(user_id).await
    }
}
