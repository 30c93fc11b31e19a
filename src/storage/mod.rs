// Store boundaries for the evaluation engine. Services depend on these
// traits so tests can swap the Postgres implementations for in-memory fakes.

pub mod postgres;

pub use postgres::{PgAchievementStore, PgPersonalRecordStore, PgSessionSetSource};

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    Achievement, AchievementCategory, NewPersonalRecord, PersonalRecord, RecordSummary,
    RecordType, RecordWithExercise, SessionSetRow, UnlockedAchievement,
};

/// Read side of the achievement catalogue plus the unlock log.
#[async_trait]
pub trait AchievementStore: Send + Sync {
    /// Active achievements in one category. Rows with invalid criteria are
    /// quarantined by the implementation and never returned.
    async fn active_by_category(
        &self,
        category: AchievementCategory,
    ) -> Result<Vec<Achievement>>;

    /// All active achievements, ordered by category then points ascending.
    async fn all_active(&self) -> Result<Vec<Achievement>>;

    /// Ids of achievements the user has already unlocked.
    async fn unlocked_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>>;

    /// Records an unlock. Returns true when this call created the row,
    /// false when the user already had it.
    async fn insert_unlock(&self, user_id: Uuid, achievement_id: Uuid) -> Result<bool>;

    /// The user's unlocks joined with their achievements, newest first.
    async fn unlocks_with_achievements(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<UnlockedAchievement>>;
}

/// Personal record persistence keyed on (user, exercise, record type).
#[async_trait]
pub trait PersonalRecordStore: Send + Sync {
    /// Current record for one key, if any.
    async fn find(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
        record_type: RecordType,
    ) -> Result<Option<PersonalRecord>>;

    /// Writes the record only if it beats the stored value in the record
    /// type's direction (or no record exists). Returns true when the write
    /// was accepted.
    async fn upsert_if_better(&self, record: &NewPersonalRecord) -> Result<bool>;

    /// All of the user's records with exercise details, newest first.
    async fn list_with_exercises(&self, user_id: Uuid) -> Result<Vec<RecordWithExercise>>;

    /// The user's records for one exercise, newest first.
    async fn list_for_exercise(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
    ) -> Result<Vec<PersonalRecord>>;

    /// Per-record summaries used to derive record statistics.
    async fn record_summaries(&self, user_id: Uuid) -> Result<Vec<RecordSummary>>;
}

/// Boundary to the workout log: the completed sets of one session, joined
/// to their exercises.
#[async_trait]
pub trait SessionSetSource: Send + Sync {
    async fn completed_sets(&self, session_id: Uuid) -> Result<Vec<SessionSetRow>>;
}
