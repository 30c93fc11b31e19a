use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{RefreshOutcome, SessionOutcome};
use crate::services::{AchievementService, PersonalRecordService};

/// The two entry points of the engine, composing record detection and
/// achievement evaluation into fixed pipelines. Callers that need a
/// deadline wrap these in `tokio::time::timeout`; a timeout error is
/// always distinguishable from an empty outcome.
pub struct EvaluationService {
    records: PersonalRecordService,
    achievements: AchievementService,
}

impl EvaluationService {
    pub fn new(db: PgPool) -> Self {
        Self {
            records: PersonalRecordService::new(db.clone()),
            achievements: AchievementService::new(db),
        }
    }

    pub fn with_services(
        records: PersonalRecordService,
        achievements: AchievementService,
    ) -> Self {
        Self {
            records,
            achievements,
        }
    }

    /// Runs after a session is completed: detect personal records first,
    /// then re-evaluate achievements, so a record set in this session can
    /// satisfy a record-count rule in the same pass.
    pub async fn on_session_completed(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<SessionOutcome> {
        let records = self.records.process_session(user_id, session_id).await?;
        let unlocks = self.achievements.evaluate_and_unlock(user_id).await?;

        if !records.is_empty() || !unlocks.is_empty() {
            tracing::info!(
                "Session {} for user {}: {} new records, {} achievements unlocked",
                session_id,
                user_id,
                records.len(),
                unlocks.len()
            );
        }

        Ok(SessionOutcome { records, unlocks })
    }

    /// Runs when a profile or achievements screen is opened: catch up any
    /// unlocks that are due, then return the full progress list.
    pub async fn on_demand_refresh(&self, user_id: Uuid) -> Result<RefreshOutcome> {
        let unlocks = self.achievements.evaluate_and_unlock(user_id).await?;
        let progress = self.achievements.compute_progress(user_id).await?;

        Ok(RefreshOutcome { unlocks, progress })
    }

    pub fn records(&self) -> &PersonalRecordService {
        &self.records
    }

    pub fn achievements(&self) -> &AchievementService {
        &self.achievements
    }
}
