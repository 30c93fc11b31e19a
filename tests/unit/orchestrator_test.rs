use std::sync::Arc;

use fit_progress::models::*;
use fit_progress::services::{AchievementService, EvaluationService, PersonalRecordService};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use crate::common::{
    init_test_logging, MemoryAchievementStore, MemoryRecordStore, MemorySessionSource,
    MockStatisticsReader, TestData,
};

struct Pipeline {
    service: EvaluationService,
    sessions: Arc<MemorySessionSource>,
    records: Arc<MemoryRecordStore>,
    achievements: Arc<MemoryAchievementStore>,
}

/// Full engine against in-memory stores. The personal record counter reads
/// the live record store, so achievement evaluation sees what the detector
/// just wrote.
fn pipeline() -> Pipeline {
    let sessions = Arc::new(MemorySessionSource::new());
    let records = Arc::new(MemoryRecordStore::new());
    let achievements = Arc::new(MemoryAchievementStore::new());

    let mut reader = MockStatisticsReader::new();
    reader
        .expect_completed_session_count()
        .returning(|_, _, _| Ok(1));
    reader.expect_current_streak().returning(|_| Ok(0));
    let counted = records.clone();
    reader
        .expect_personal_record_count()
        .returning(move |user_id| Ok(counted.count_for(user_id)));
    reader.expect_cardio_session_count().returning(|_| Ok(0));

    let record_service =
        PersonalRecordService::with_sources(sessions.clone(), records.clone());
    let achievement_service =
        AchievementService::with_sources(achievements.clone(), Arc::new(reader));
    let service = EvaluationService::with_services(record_service, achievement_service);

    Pipeline {
        service,
        sessions,
        records,
        achievements,
    }
}

#[cfg(test)]
mod orchestrator_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_records_detected_in_a_session_count_toward_unlocks_in_the_same_pass() {
        init_test_logging();
        let pipeline = pipeline();
        let record_breaker = TestData::achievement(CriteriaKind::PersonalRecords, 1, 15);
        pipeline.achievements.push_achievement(record_breaker.clone());

        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let bench = TestData::strength_exercise();
        pipeline
            .sessions
            .put_session(session_id, vec![TestData::strength_set(&bench, 8, 60.0)]);

        let outcome = pipeline
            .service
            .on_session_completed(user_id, session_id)
            .await
            .unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.unlocks.len(), 1);
        assert_eq!(outcome.unlocks[0].id, record_breaker.id);
    }

    #[tokio::test]
    async fn test_quiet_sessions_produce_an_empty_outcome() {
        init_test_logging();
        let pipeline = pipeline();
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();

        let outcome = pipeline
            .service
            .on_session_completed(user_id, session_id)
            .await
            .unwrap();

        assert!(outcome.records.is_empty());
        assert!(outcome.unlocks.is_empty());
    }

    #[tokio::test]
    async fn test_session_fetch_failure_fails_the_whole_entry_point() {
        init_test_logging();
        let pipeline = pipeline();
        pipeline.sessions.fail_next();

        let result = pipeline
            .service
            .on_session_completed(Uuid::new_v4(), Uuid::new_v4())
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_refresh_catches_up_unlocks_and_returns_progress() {
        init_test_logging();
        let pipeline = pipeline();
        let first_workout = TestData::achievement(CriteriaKind::WorkoutCount, 1, 10);
        let marathon_club = TestData::achievement(CriteriaKind::WorkoutCount, 100, 100);
        pipeline.achievements.push_achievement(first_workout.clone());
        pipeline.achievements.push_achievement(marathon_club.clone());

        let user_id = Uuid::new_v4();
        let outcome = pipeline.service.on_demand_refresh(user_id).await.unwrap();

        assert_eq!(outcome.unlocks.len(), 1);
        assert_eq!(outcome.unlocks[0].id, first_workout.id);

        assert_eq!(outcome.progress.len(), 2);
        let by_id = |id: Uuid| outcome.progress.iter().find(|p| p.achievement_id == id);
        let first_progress = by_id(first_workout.id).unwrap();
        assert!(first_progress.unlocked);
        assert_eq!(first_progress.percentage, 100.0);
        let marathon_progress = by_id(marathon_club.id).unwrap();
        assert!(!marathon_progress.unlocked);
        assert_eq!(marathon_progress.percentage, 1.0);
    }

    #[tokio::test]
    async fn test_refreshing_twice_reports_each_unlock_once() {
        init_test_logging();
        let pipeline = pipeline();
        pipeline
            .achievements
            .push_achievement(TestData::achievement(CriteriaKind::WorkoutCount, 1, 10));

        let user_id = Uuid::new_v4();
        let first = pipeline.service.on_demand_refresh(user_id).await.unwrap();
        assert_eq!(first.unlocks.len(), 1);

        let second = pipeline.service.on_demand_refresh(user_id).await.unwrap();
        assert!(second.unlocks.is_empty());
        assert_eq!(second.progress.len(), 1);
        assert!(second.progress[0].unlocked);
    }

    #[tokio::test]
    async fn test_record_events_survive_into_the_record_store() {
        init_test_logging();
        let pipeline = pipeline();
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let run = TestData::cardio_exercise();
        pipeline
            .sessions
            .put_session(session_id, vec![TestData::cardio_set(&run, 1800, 5000.0)]);

        let outcome = pipeline
            .service
            .on_session_completed(user_id, session_id)
            .await
            .unwrap();

        assert_eq!(outcome.records.len(), 2);
        let stored_time = pipeline
            .records
            .get(user_id, run.id, RecordType::BestTime)
            .unwrap();
        assert_eq!(stored_time.value, 1800.0);
        let stored_distance = pipeline
            .records
            .get(user_id, run.id, RecordType::MaxDistance)
            .unwrap();
        assert_eq!(stored_distance.value, 5000.0);
    }
}
