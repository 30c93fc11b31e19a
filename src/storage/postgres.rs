use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::{
    Achievement, AchievementCategory, AchievementRow, NewPersonalRecord, PersonalRecord,
    RecordSummary, RecordType, RecordWithExercise, SessionSetRow, UnlockedAchievement,
};
use crate::storage::{AchievementStore, PersonalRecordStore, SessionSetSource};

#[derive(Debug, Clone)]
pub struct PgAchievementStore {
    db: PgPool,
}

impl PgAchievementStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Converts stored rows into typed achievements, quarantining any row
    /// whose criteria payload fails validation.
    fn validate_rows(rows: Vec<AchievementRow>) -> Vec<Achievement> {
        let mut achievements = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id;
            let name = row.name.clone();
            match row.into_achievement() {
                Ok(achievement) => achievements.push(achievement),
                Err(e) => {
                    tracing::warn!("Quarantined achievement {} ('{}'): {}", id, name, e);
                }
            }
        }
        achievements
    }
}

#[derive(Debug, FromRow)]
struct UnlockJoinRow {
    #[sqlx(flatten)]
    achievement: AchievementRow,
    unlocked_at: DateTime<Utc>,
}

#[async_trait]
impl AchievementStore for PgAchievementStore {
    async fn active_by_category(
        &self,
        category: AchievementCategory,
    ) -> Result<Vec<Achievement>> {
        let rows = sqlx::query_as::<_, AchievementRow>(
            r#"
            SELECT id, name, description, icon, category, criteria, points, is_active, created_at
            FROM achievements
            WHERE is_active = TRUE AND category = $1
            ORDER BY points ASC
            "#,
        )
        .bind(category)
        .fetch_all(&self.db)
        .await?;

        Ok(Self::validate_rows(rows))
    }

    async fn all_active(&self) -> Result<Vec<Achievement>> {
        let rows = sqlx::query_as::<_, AchievementRow>(
            r#"
            SELECT id, name, description, icon, category, criteria, points, is_active, created_at
            FROM achievements
            WHERE is_active = TRUE
            ORDER BY category ASC, points ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(Self::validate_rows(rows))
    }

    async fn unlocked_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT achievement_id FROM user_achievements WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(ids.into_iter().collect())
    }

    async fn insert_unlock(&self, user_id: Uuid, achievement_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_achievements (user_id, achievement_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, achievement_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(achievement_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn unlocks_with_achievements(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<UnlockedAchievement>> {
        let rows = sqlx::query_as::<_, UnlockJoinRow>(
            r#"
            SELECT a.id, a.name, a.description, a.icon, a.category, a.criteria,
                   a.points, a.is_active, a.created_at, ua.unlocked_at
            FROM user_achievements ua
            JOIN achievements a ON a.id = ua.achievement_id
            WHERE ua.user_id = $1
            ORDER BY ua.unlocked_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        let mut unlocks = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.achievement.id;
            let name = row.achievement.name.clone();
            match row.achievement.into_achievement() {
                Ok(achievement) => unlocks.push(UnlockedAchievement {
                    achievement,
                    unlocked_at: row.unlocked_at,
                }),
                Err(e) => {
                    tracing::warn!("Quarantined achievement {} ('{}'): {}", id, name, e);
                }
            }
        }
        Ok(unlocks)
    }
}

#[derive(Debug, Clone)]
pub struct PgPersonalRecordStore {
    db: PgPool,
}

impl PgPersonalRecordStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PersonalRecordStore for PgPersonalRecordStore {
    async fn find(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
        record_type: RecordType,
    ) -> Result<Option<PersonalRecord>> {
        let record = sqlx::query_as::<_, PersonalRecord>(
            r#"
            SELECT id, user_id, exercise_id, record_type, value, unit, session_id,
                   achieved_at, created_at
            FROM personal_records
            WHERE user_id = $1 AND exercise_id = $2 AND record_type = $3
            "#,
        )
        .bind(user_id)
        .bind(exercise_id)
        .bind(record_type)
        .fetch_optional(&self.db)
        .await?;

        Ok(record)
    }

    async fn upsert_if_better(&self, record: &NewPersonalRecord) -> Result<bool> {
        // The WHERE clause repeats the improvement direction inside the
        // statement, so a concurrent writer can never replace a stored value
        // with a worse one. rows_affected is 0 when the guard rejects the
        // update, which callers treat as "not a record after all".
        let result = sqlx::query(
            r#"
            INSERT INTO personal_records
                (user_id, exercise_id, record_type, value, unit, session_id, achieved_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id, exercise_id, record_type) DO UPDATE
            SET value = EXCLUDED.value,
                unit = EXCLUDED.unit,
                session_id = EXCLUDED.session_id,
                achieved_at = EXCLUDED.achieved_at
            WHERE (personal_records.record_type <> 'best_time'
                   AND EXCLUDED.value > personal_records.value)
               OR (personal_records.record_type = 'best_time'
                   AND EXCLUDED.value < personal_records.value)
            "#,
        )
        .bind(record.user_id)
        .bind(record.exercise_id)
        .bind(record.record_type)
        .bind(record.value)
        .bind(&record.unit)
        .bind(record.session_id)
        .bind(record.achieved_at)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_with_exercises(&self, user_id: Uuid) -> Result<Vec<RecordWithExercise>> {
        let records = sqlx::query_as::<_, RecordWithExercise>(
            r#"
            SELECT pr.id, pr.user_id, pr.exercise_id, pr.record_type, pr.value, pr.unit,
                   pr.session_id, pr.achieved_at,
                   e.name AS exercise_name, e.muscle_groups, e.exercise_type AS exercise_kind
            FROM personal_records pr
            JOIN exercises e ON e.id = pr.exercise_id
            WHERE pr.user_id = $1
            ORDER BY pr.achieved_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(records)
    }

    async fn list_for_exercise(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
    ) -> Result<Vec<PersonalRecord>> {
        let records = sqlx::query_as::<_, PersonalRecord>(
            r#"
            SELECT id, user_id, exercise_id, record_type, value, unit, session_id,
                   achieved_at, created_at
            FROM personal_records
            WHERE user_id = $1 AND exercise_id = $2
            ORDER BY achieved_at DESC
            "#,
        )
        .bind(user_id)
        .bind(exercise_id)
        .fetch_all(&self.db)
        .await?;

        Ok(records)
    }

    async fn record_summaries(&self, user_id: Uuid) -> Result<Vec<RecordSummary>> {
        let summaries = sqlx::query_as::<_, RecordSummary>(
            "SELECT record_type, achieved_at FROM personal_records WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(summaries)
    }
}

#[derive(Debug, Clone)]
pub struct PgSessionSetSource {
    db: PgPool,
}

impl PgSessionSetSource {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionSetSource for PgSessionSetSource {
    async fn completed_sets(&self, session_id: Uuid) -> Result<Vec<SessionSetRow>> {
        // LEFT JOIN keeps sets whose exercise reference was cleared; the
        // detector skips those rows with a warning instead of failing the
        // whole session.
        let sets = sqlx::query_as::<_, SessionSetRow>(
            r#"
            SELECT se.exercise_id, e.name AS exercise_name,
                   e.exercise_type AS exercise_kind,
                   es.reps, es.weight_kg, es.duration_seconds, es.distance_meters
            FROM exercise_sets es
            JOIN session_exercises se ON se.id = es.session_exercise_id
            LEFT JOIN exercises e ON e.id = se.exercise_id
            WHERE se.session_id = $1 AND es.completed = TRUE
            ORDER BY se.position ASC, es.set_number ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.db)
        .await?;

        Ok(sets)
    }
}
