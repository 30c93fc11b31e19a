use fit_progress::models::*;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use crate::common::{init_test_logging, record_harness, TestData};

#[cfg(test)]
mod record_detector_tests {
    use super::*;

    #[tokio::test]
    async fn test_first_strength_session_sets_weight_and_rep_records() {
        init_test_logging();
        let harness = record_harness();
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let bench = TestData::strength_exercise();

        harness.sessions.put_session(
            session_id,
            vec![
                TestData::strength_set(&bench, 8, 60.0),
                TestData::strength_set(&bench, 6, 62.5),
                TestData::strength_set(&bench, 4, 65.0),
            ],
        );

        let events = harness
            .service
            .process_session(user_id, session_id)
            .await
            .unwrap();

        assert_eq!(events.len(), 2);

        let weight = events
            .iter()
            .find(|e| e.record_type == RecordType::MaxWeight)
            .unwrap();
        assert_eq!(weight.value, 65.0);
        assert_eq!(weight.previous_value, 0.0);
        assert_eq!(weight.improvement, 65.0);
        assert_eq!(weight.unit, "kg");
        assert_eq!(weight.exercise_name, bench.name);
        assert_eq!(weight.session_id, session_id);

        let reps = events
            .iter()
            .find(|e| e.record_type == RecordType::MaxReps)
            .unwrap();
        assert_eq!(reps.value, 8.0);

        let stored = harness
            .store
            .get(user_id, bench.id, RecordType::MaxWeight)
            .unwrap();
        assert_eq!(stored.value, 65.0);
        assert_eq!(stored.session_id, Some(session_id));
    }

    #[tokio::test]
    async fn test_reprocessing_the_same_session_changes_nothing() {
        init_test_logging();
        let harness = record_harness();
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let bench = TestData::strength_exercise();

        harness
            .sessions
            .put_session(session_id, vec![TestData::strength_set(&bench, 8, 60.0)]);

        let first = harness
            .service
            .process_session(user_id, session_id)
            .await
            .unwrap();
        assert_eq!(first.len(), 2);
        let stored_after_first = harness
            .store
            .get(user_id, bench.id, RecordType::MaxWeight)
            .unwrap();

        let second = harness
            .service
            .process_session(user_id, session_id)
            .await
            .unwrap();
        assert!(second.is_empty());

        let stored_after_second = harness
            .store
            .get(user_id, bench.id, RecordType::MaxWeight)
            .unwrap();
        assert_eq!(stored_after_second.value, stored_after_first.value);
        assert_eq!(stored_after_second.achieved_at, stored_after_first.achieved_at);
    }

    #[tokio::test]
    async fn test_only_improved_types_produce_events() {
        init_test_logging();
        let harness = record_harness();
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let bench = TestData::strength_exercise();

        // Weight record already beyond this session, rep record within reach.
        harness.store.seed_record(TestData::record(
            user_id,
            bench.id,
            RecordType::MaxWeight,
            70.0,
        ));
        harness
            .store
            .seed_record(TestData::record(user_id, bench.id, RecordType::MaxReps, 6.0));

        harness
            .sessions
            .put_session(session_id, vec![TestData::strength_set(&bench, 8, 65.0)]);

        let events = harness
            .service
            .process_session(user_id, session_id)
            .await
            .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].record_type, RecordType::MaxReps);
        assert_eq!(events[0].value, 8.0);
        assert_eq!(events[0].previous_value, 6.0);
        assert_eq!(events[0].improvement, 2.0);

        let weight = harness
            .store
            .get(user_id, bench.id, RecordType::MaxWeight)
            .unwrap();
        assert_eq!(weight.value, 70.0);
    }

    #[tokio::test]
    async fn test_cardio_time_improves_downward() {
        init_test_logging();
        let harness = record_harness();
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let run = TestData::cardio_exercise();

        harness.store.seed_record(TestData::record(
            user_id,
            run.id,
            RecordType::BestTime,
            1900.0,
        ));
        harness.store.seed_record(TestData::record(
            user_id,
            run.id,
            RecordType::MaxDistance,
            6000.0,
        ));

        harness
            .sessions
            .put_session(session_id, vec![TestData::cardio_set(&run, 1800, 5000.0)]);

        let events = harness
            .service
            .process_session(user_id, session_id)
            .await
            .unwrap();

        // 1800s beats 1900s; 5000m does not beat 6000m.
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].record_type, RecordType::BestTime);
        assert_eq!(events[0].value, 1800.0);
        assert_eq!(events[0].previous_value, 1900.0);
        assert_eq!(events[0].improvement, 100.0);

        let distance = harness
            .store
            .get(user_id, run.id, RecordType::MaxDistance)
            .unwrap();
        assert_eq!(distance.value, 6000.0);
    }

    #[tokio::test]
    async fn test_sessions_without_usable_measurements_set_nothing() {
        init_test_logging();
        let harness = record_harness();
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let bench = TestData::strength_exercise();

        let bodyweight = TestData::strength_set(&bench, 12, 0.0);
        harness.sessions.put_session(session_id, vec![bodyweight]);

        let events = harness
            .service
            .process_session(user_id, session_id)
            .await
            .unwrap();

        // No weight event from the zero weight, but the reps still count.
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].record_type, RecordType::MaxReps);
        assert!(harness
            .store
            .get(user_id, bench.id, RecordType::MaxWeight)
            .is_none());
    }

    #[tokio::test]
    async fn test_flexibility_exercises_produce_no_records() {
        init_test_logging();
        let harness = record_harness();
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let stretch = TestData::exercise(ExerciseType::Flexibility);

        let mut set = TestData::strength_set(&stretch, 1, 0.0);
        set.weight_kg = None;
        set.duration_seconds = Some(120);
        harness.sessions.put_session(session_id, vec![set]);

        let events = harness
            .service
            .process_session(user_id, session_id)
            .await
            .unwrap();

        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_sets_with_missing_linkage_are_skipped() {
        init_test_logging();
        let harness = record_harness();
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let bench = TestData::strength_exercise();

        harness.sessions.put_session(
            session_id,
            vec![TestData::orphan_set(), TestData::strength_set(&bench, 8, 60.0)],
        );

        let events = harness
            .service
            .process_session(user_id, session_id)
            .await
            .unwrap();

        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.exercise_id == bench.id));
    }

    #[tokio::test]
    async fn test_set_fetch_failure_is_an_error() {
        init_test_logging();
        let harness = record_harness();
        harness.sessions.fail_next();

        let result = harness
            .service
            .process_session(Uuid::new_v4(), Uuid::new_v4())
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_store_failure_on_one_exercise_spares_the_others() {
        init_test_logging();
        let harness = record_harness();
        let user_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        let bench = TestData::strength_exercise();
        let squat = TestData::strength_exercise();

        harness.sessions.put_session(
            session_id,
            vec![
                TestData::strength_set(&bench, 8, 60.0),
                TestData::strength_set(&squat, 5, 100.0),
            ],
        );
        harness.store.fail_for_exercise(bench.id);

        let events = harness
            .service
            .process_session(user_id, session_id)
            .await
            .unwrap();

        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.exercise_id == squat.id));
        assert!(harness
            .store
            .get(user_id, squat.id, RecordType::MaxWeight)
            .is_some());
        assert!(harness
            .store
            .get(user_id, bench.id, RecordType::MaxWeight)
            .is_none());
    }

    #[tokio::test]
    async fn test_record_listings_and_stats_come_from_the_store() {
        init_test_logging();
        let harness = record_harness();
        let user_id = Uuid::new_v4();
        let bench = TestData::strength_exercise();
        harness.store.register_exercise(bench.clone());

        let mut old_record = TestData::record(user_id, bench.id, RecordType::MaxReps, 10.0);
        old_record.achieved_at = chrono::Utc::now() - chrono::Duration::days(60);
        harness.store.seed_record(old_record);
        harness.store.seed_record(TestData::record(
            user_id,
            bench.id,
            RecordType::MaxWeight,
            80.0,
        ));

        let listed = harness.service.records_with_exercises(user_id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].record_type, RecordType::MaxWeight);
        assert_eq!(listed[0].exercise_name, bench.name);
        assert!(listed[0].achieved_at >= listed[1].achieved_at);

        let per_exercise = harness
            .service
            .records_for_exercise(user_id, bench.id)
            .await
            .unwrap();
        assert_eq!(per_exercise.len(), 2);

        let stats = harness.service.record_stats(user_id).await.unwrap();
        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.recent_records, 1);
        assert_eq!(stats.records_by_type.get(&RecordType::MaxWeight), Some(&1));
        assert_eq!(stats.records_by_type.get(&RecordType::MaxReps), Some(&1));
    }
}
