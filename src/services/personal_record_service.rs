use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    ExerciseType, NewPersonalRecord, PersonalRecord, PersonalRecordEvent, PersonalRecordStats,
    RecordType, RecordWithExercise, SessionSetRow,
};
use crate::storage::{
    PersonalRecordStore, PgPersonalRecordStore, PgSessionSetSource, SessionSetSource,
};

pub struct PersonalRecordService {
    sets: Arc<dyn SessionSetSource>,
    records: Arc<dyn PersonalRecordStore>,
}

impl PersonalRecordService {
    pub fn new(db: PgPool) -> Self {
        Self {
            sets: Arc::new(PgSessionSetSource::new(db.clone())),
            records: Arc::new(PgPersonalRecordStore::new(db)),
        }
    }

    pub fn with_sources(
        sets: Arc<dyn SessionSetSource>,
        records: Arc<dyn PersonalRecordStore>,
    ) -> Self {
        Self { sets, records }
    }

    /// Examines a completed session and persists every new personal record
    /// it produced, one event per record the store accepted. Running this
    /// twice for the same session is harmless: the second pass finds no
    /// strict improvement and writes nothing.
    pub async fn process_session(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<Vec<PersonalRecordEvent>> {
        let sets = self.sets.completed_sets(session_id).await?;
        let groups = group_sets_by_exercise(session_id, sets);

        let mut events = Vec::new();
        for group in groups {
            for &record_type in RecordType::for_exercise(group.exercise_kind) {
                match self
                    .check_record(user_id, session_id, &group, record_type)
                    .await
                {
                    Ok(Some(event)) => events.push(event),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(
                            "Failed to check {:?} record for exercise {} in session {}: {}",
                            record_type,
                            group.exercise_id,
                            session_id,
                            e
                        );
                    }
                }
            }
        }

        Ok(events)
    }

    /// One record type for one exercise: aggregate the session, compare
    /// against the stored record, and attempt the guarded write. `None`
    /// means nothing to report, either no usable measurement, no
    /// improvement, or a concurrent writer got there with a better value.
    async fn check_record(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        group: &ExerciseGroup,
        record_type: RecordType,
    ) -> Result<Option<PersonalRecordEvent>> {
        let candidate = match record_type.session_best(&group.sets) {
            Some(value) => value,
            None => return Ok(None),
        };

        let current = self
            .records
            .find(user_id, group.exercise_id, record_type)
            .await?;
        let previous = current.as_ref().map(|r| r.value);

        if !record_type.improves(candidate, previous) {
            return Ok(None);
        }

        let achieved_at = Utc::now();
        let new_record = NewPersonalRecord {
            user_id,
            exercise_id: group.exercise_id,
            record_type,
            value: candidate,
            unit: record_type.unit().to_string(),
            session_id: Some(session_id),
            achieved_at,
        };

        if !self.records.upsert_if_better(&new_record).await? {
            return Ok(None);
        }

        Ok(Some(PersonalRecordEvent {
            exercise_id: group.exercise_id,
            exercise_name: group.exercise_name.clone(),
            record_type,
            value: candidate,
            unit: record_type.unit().to_string(),
            previous_value: previous.unwrap_or(0.0),
            improvement: record_type.improvement(candidate, previous),
            achieved_at,
            session_id,
        }))
    }

    /// All of the user's records with exercise details, newest first.
    pub async fn records_with_exercises(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<RecordWithExercise>> {
        self.records.list_with_exercises(user_id).await
    }

    /// The user's records for one exercise, newest first.
    pub async fn records_for_exercise(
        &self,
        user_id: Uuid,
        exercise_id: Uuid,
    ) -> Result<Vec<PersonalRecord>> {
        self.records.list_for_exercise(user_id, exercise_id).await
    }

    /// Record counts overall, over the last thirty days, and per type.
    pub async fn record_stats(&self, user_id: Uuid) -> Result<PersonalRecordStats> {
        let summaries = self.records.record_summaries(user_id).await?;
        Ok(PersonalRecordStats::from_summaries(&summaries, Utc::now()))
    }
}

struct ExerciseGroup {
    exercise_id: Uuid,
    exercise_name: String,
    exercise_kind: ExerciseType,
    sets: Vec<SessionSetRow>,
}

/// Groups a session's sets by exercise, in a stable order. Sets whose
/// exercise linkage is gone cannot be attributed to anything, so they are
/// skipped with a warning rather than failing the session.
fn group_sets_by_exercise(session_id: Uuid, sets: Vec<SessionSetRow>) -> Vec<ExerciseGroup> {
    let mut groups: BTreeMap<Uuid, ExerciseGroup> = BTreeMap::new();
    for set in sets {
        let (exercise_id, exercise_name, exercise_kind) =
            match (set.exercise_id, &set.exercise_name, set.exercise_kind) {
                (Some(id), Some(name), Some(kind)) => (id, name.clone(), kind),
                _ => {
                    tracing::warn!(
                        "Skipping set with missing exercise linkage in session {}",
                        session_id
                    );
                    continue;
                }
            };

        groups
            .entry(exercise_id)
            .or_insert_with(|| ExerciseGroup {
                exercise_id,
                exercise_name,
                exercise_kind,
                sets: Vec::new(),
            })
            .sets
            .push(set);
    }
    groups.into_values().collect()
}
