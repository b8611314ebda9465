use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use duo_core::clock::FixedClock;
use duo_core::db::establish_connection;
use duo_core::engine::{EngineConfig, OccurrenceEngine};
use duo_core::error::{CoreError, ErrorKind};
use duo_core::models::*;
use duo_core::repository::{
    CompletionRepository, CoupleRepository, EventRepository, ExceptionRepository,
    SqliteRepository, TaskRepository,
};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

struct TestContext {
    engine: OccurrenceEngine<SqliteRepository>,
    clock: Arc<FixedClock>,
    couple: Couple,
    alex: Member,
    sam: Member,
    _temp_dir: TempDir,
}

impl TestContext {
    fn repo(&self) -> &SqliteRepository {
        self.engine.repository()
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Helper function to create a test database with one couple of two members
async fn setup_test_db() -> TestContext {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");

    let pool = establish_connection(&db_path.to_string_lossy())
        .await
        .expect("Failed to establish test database connection");

    let clock = Arc::new(FixedClock::new(utc(2025, 1, 1, 8, 0)));
    let repo = SqliteRepository::with_clock(pool, clock.clone());

    let couple = repo.create_couple("Alex & Sam".to_string()).await.unwrap();
    let alex = repo.add_member(couple.id, "Alex".to_string()).await.unwrap();
    let sam = repo.add_member(couple.id, "Sam".to_string()).await.unwrap();

    TestContext {
        engine: OccurrenceEngine::with_config(repo, EngineConfig::default()),
        clock,
        couple,
        alex,
        sam,
        _temp_dir: temp_dir,
    }
}

async fn create_test_task(ctx: &TestContext, title: &str, start: NaiveDate, rrule: Option<&str>) -> Task {
    ctx.repo()
        .add_task(NewTaskData {
            couple_id: ctx.couple.id,
            author_id: ctx.alex.id,
            title: title.to_string(),
            description: None,
            start_date: start,
            rrule: rrule.map(str::to_string),
        })
        .await
        .expect("Failed to create test task")
}

async fn create_test_event(
    ctx: &TestContext,
    title: &str,
    starts_at: DateTime<Utc>,
    minutes: i64,
    rrule: Option<&str>,
) -> CalendarEvent {
    ctx.repo()
        .add_event(NewEventData {
            couple_id: ctx.couple.id,
            author_id: ctx.alex.id,
            title: title.to_string(),
            description: None,
            starts_at,
            ends_at: starts_at + Duration::minutes(minutes),
            is_all_day: false,
            category_id: None,
            rrule: rrule.map(str::to_string),
        })
        .await
        .expect("Failed to create test event")
}

mod day_query_tests {
    use super::*;

    #[tokio::test]
    async fn test_daily_task_is_due_from_its_anchor() {
        let ctx = setup_test_db().await;
        let t1 = create_test_task(&ctx, "T1", date(2025, 11, 18), Some("FREQ=DAILY")).await;

        let on_19 = ctx.engine.get_tasks_for_day(ctx.couple.id, date(2025, 11, 19)).await.unwrap();
        assert_eq!(on_19.len(), 1);
        assert_eq!(on_19[0].task.id, t1.id);
        assert_eq!(on_19[0].overlay, Overlay::None);

        let on_18 = ctx.engine.get_tasks_for_day(ctx.couple.id, date(2025, 11, 18)).await.unwrap();
        assert_eq!(on_18.len(), 1);

        let on_17 = ctx.engine.get_tasks_for_day(ctx.couple.id, date(2025, 11, 17)).await.unwrap();
        assert!(on_17.is_empty());
    }

    #[tokio::test]
    async fn test_completion_belongs_to_one_due_date() {
        let ctx = setup_test_db().await;
        let t1 = create_test_task(&ctx, "T1", date(2025, 11, 18), Some("FREQ=DAILY")).await;

        ctx.engine
            .complete_task(ctx.couple.id, ctx.sam.id, t1.id, date(2025, 11, 18), None)
            .await
            .unwrap();

        let on_18 = ctx.engine.get_tasks_for_day(ctx.couple.id, date(2025, 11, 18)).await.unwrap();
        let completion = on_18[0].overlay.completion().expect("completion attached");
        assert_eq!(completion.completed_by, ctx.sam.id);
        assert_eq!(completion.completed_by_name, "Sam");

        let on_19 = ctx.engine.get_tasks_for_day(ctx.couple.id, date(2025, 11, 19)).await.unwrap();
        assert_eq!(on_19[0].overlay, Overlay::None);
    }

    #[tokio::test]
    async fn test_one_off_task_has_one_occurrence() {
        let ctx = setup_test_db().await;
        create_test_task(&ctx, "Renew passport", date(2025, 3, 4), None).await;

        let mut due_days = 0;
        let mut day = date(2025, 3, 1);
        while day <= date(2025, 3, 10) {
            due_days += ctx.engine.get_tasks_for_day(ctx.couple.id, day).await.unwrap().len();
            day = day.succ_opt().unwrap();
        }
        assert_eq!(due_days, 1);
    }

    #[tokio::test]
    async fn test_reads_are_idempotent() {
        let ctx = setup_test_db().await;
        let t1 = create_test_task(&ctx, "T1", date(2025, 11, 1), Some("FREQ=DAILY")).await;
        create_test_task(&ctx, "T2", date(2025, 11, 3), Some("FREQ=WEEKLY;BYDAY=WE")).await;
        ctx.engine
            .complete_task(ctx.couple.id, ctx.alex.id, t1.id, date(2025, 11, 5), None)
            .await
            .unwrap();

        let first = ctx.engine.get_tasks_for_day(ctx.couple.id, date(2025, 11, 5)).await.unwrap();
        let second = ctx.engine.get_tasks_for_day(ctx.couple.id, date(2025, 11, 5)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_couple_is_not_found() {
        let ctx = setup_test_db().await;
        let err = ctx.engine.get_tasks_for_day(Uuid::now_v7(), date(2025, 1, 1)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}

mod calendar_tests {
    use super::*;

    #[tokio::test]
    async fn test_weekly_event_in_january() {
        let ctx = setup_test_db().await;
        let event = create_test_event(&ctx, "Team sync", utc(2025, 1, 15, 10, 0), 45, Some("FREQ=WEEKLY;BYDAY=MO")).await;

        let occurrences = ctx
            .engine
            .get_occurrences(ctx.couple.id, date(2025, 1, 1), date(2025, 1, 31))
            .await
            .unwrap();

        let starts: Vec<_> = occurrences.iter().map(|o| o.occurrence_start).collect();
        assert_eq!(starts, vec![utc(2025, 1, 20, 10, 0), utc(2025, 1, 27, 10, 0)]);
        assert!(occurrences.iter().all(|o| o.event.id == event.id));
        assert_eq!(occurrences[0].occurrence_end, utc(2025, 1, 20, 10, 45));
    }

    #[tokio::test]
    async fn test_cancelled_occurrence_never_appears() {
        let ctx = setup_test_db().await;
        let event = create_test_event(&ctx, "Team sync", utc(2025, 1, 15, 10, 0), 45, Some("FREQ=WEEKLY;BYDAY=MO")).await;

        // Seconds are dropped when the exception is stored
        let exception = ctx
            .engine
            .skip_event_occurrence(ctx.couple.id, ctx.sam.id, event.id, utc(2025, 1, 20, 10, 0) + Duration::seconds(20))
            .await
            .unwrap();
        assert_eq!(exception.exception_at, utc(2025, 1, 20, 10, 0));

        let occurrences = ctx
            .engine
            .get_occurrences(ctx.couple.id, date(2025, 1, 1), date(2025, 1, 31))
            .await
            .unwrap();
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].occurrence_start, utc(2025, 1, 27, 10, 0));

        ctx.engine
            .restore_event_occurrence(ctx.couple.id, ctx.sam.id, exception.id)
            .await
            .unwrap();
        let restored = ctx
            .engine
            .get_occurrences(ctx.couple.id, date(2025, 1, 1), date(2025, 1, 31))
            .await
            .unwrap();
        assert_eq!(restored.len(), 2);
    }

    #[tokio::test]
    async fn test_range_bounds_are_inclusive_days() {
        let ctx = setup_test_db().await;
        create_test_event(&ctx, "Late call", utc(2025, 1, 31, 23, 59), 1, None).await;
        create_test_event(&ctx, "Early run", utc(2025, 1, 1, 0, 0), 30, None).await;

        let occurrences = ctx
            .engine
            .get_occurrences(ctx.couple.id, date(2025, 1, 1), date(2025, 1, 31))
            .await
            .unwrap();
        let titles: Vec<_> = occurrences.iter().map(|o| o.event.title.as_str()).collect();
        assert_eq!(titles, vec!["Early run", "Late call"]);

        let single_day = ctx
            .engine
            .get_occurrences(ctx.couple.id, date(2025, 1, 31), date(2025, 1, 31))
            .await
            .unwrap();
        assert_eq!(single_day.len(), 1);
    }

    #[tokio::test]
    async fn test_reversed_range_is_invalid() {
        let ctx = setup_test_db().await;
        let err = ctx
            .engine
            .get_occurrences(ctx.couple.id, date(2025, 2, 1), date(2025, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_deleting_event_removes_occurrences_and_exceptions() {
        let ctx = setup_test_db().await;
        let event = create_test_event(&ctx, "Yoga", utc(2025, 1, 6, 18, 0), 60, Some("FREQ=WEEKLY")).await;
        ctx.engine
            .skip_event_occurrence(ctx.couple.id, ctx.alex.id, event.id, utc(2025, 1, 13, 18, 0))
            .await
            .unwrap();

        ctx.repo().delete_event(event.id).await.unwrap();

        let occurrences = ctx
            .engine
            .get_occurrences(ctx.couple.id, date(2025, 1, 1), date(2025, 1, 31))
            .await
            .unwrap();
        assert!(occurrences.is_empty());
        assert!(!ctx.repo().event_exception_exists(event.id, utc(2025, 1, 13, 18, 0)).await.unwrap());
        assert!(matches!(ctx.repo().delete_event(event.id).await, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_event_must_not_end_before_it_starts() {
        let ctx = setup_test_db().await;
        let result = ctx
            .repo()
            .add_event(NewEventData {
                couple_id: ctx.couple.id,
                author_id: ctx.alex.id,
                title: "Backwards".to_string(),
                description: None,
                starts_at: utc(2025, 1, 6, 18, 0),
                ends_at: utc(2025, 1, 6, 17, 0),
                is_all_day: false,
                category_id: None,
                rrule: None,
            })
            .await;
        assert!(matches!(result, Err(CoreError::InvalidInput(_))));
    }
}

mod overlay_tests {
    use super::*;

    #[tokio::test]
    async fn test_skip_removes_existing_completion() {
        let ctx = setup_test_db().await;
        let task = create_test_task(&ctx, "Vacuum", date(2025, 1, 1), Some("FREQ=DAILY")).await;

        ctx.engine
            .complete_task(ctx.couple.id, ctx.alex.id, task.id, date(2025, 1, 2), None)
            .await
            .unwrap();
        ctx.engine
            .skip_task_occurrence(ctx.couple.id, ctx.sam.id, task.id, date(2025, 1, 2))
            .await
            .unwrap();

        assert!(ctx.repo().find_completion(task.id, date(2025, 1, 2)).await.unwrap().is_none());

        let due = ctx.engine.get_tasks_for_day(ctx.couple.id, date(2025, 1, 2)).await.unwrap();
        assert_eq!(due.len(), 1);
        assert!(due[0].is_skipped());
        assert!(due[0].overlay.completion().is_none());
    }

    #[tokio::test]
    async fn test_exception_wins_when_completed_after_skip() {
        let ctx = setup_test_db().await;
        let task = create_test_task(&ctx, "Vacuum", date(2025, 1, 1), Some("FREQ=DAILY")).await;

        ctx.engine
            .skip_task_occurrence(ctx.couple.id, ctx.sam.id, task.id, date(2025, 1, 3))
            .await
            .unwrap();
        ctx.engine
            .complete_task(ctx.couple.id, ctx.alex.id, task.id, date(2025, 1, 3), None)
            .await
            .unwrap();

        let due = ctx.engine.get_tasks_for_day(ctx.couple.id, date(2025, 1, 3)).await.unwrap();
        assert!(due[0].is_skipped());
        assert!(!due[0].is_completed());
    }

    #[tokio::test]
    async fn test_restoring_a_skipped_occurrence() {
        let ctx = setup_test_db().await;
        let task = create_test_task(&ctx, "Vacuum", date(2025, 1, 1), Some("FREQ=DAILY")).await;

        let exception = ctx
            .engine
            .skip_task_occurrence(ctx.couple.id, ctx.sam.id, task.id, date(2025, 1, 4))
            .await
            .unwrap();
        assert!(ctx.repo().task_exception_exists(task.id, date(2025, 1, 4)).await.unwrap());

        ctx.engine
            .restore_task_occurrence(ctx.couple.id, ctx.sam.id, exception.id)
            .await
            .unwrap();

        let due = ctx.engine.get_tasks_for_day(ctx.couple.id, date(2025, 1, 4)).await.unwrap();
        assert_eq!(due[0].overlay, Overlay::None);

        let again = ctx.engine.restore_task_occurrence(ctx.couple.id, ctx.sam.id, exception.id).await;
        assert!(matches!(again, Err(CoreError::NotFound(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_completions_only_one_succeeds() {
        let ctx = Arc::new(setup_test_db().await);
        let task_id = create_test_task(&ctx, "Vacuum", date(2025, 1, 1), Some("FREQ=DAILY")).await.id;

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ctx = Arc::clone(&ctx);
                tokio::spawn(async move {
                    let actor = if i % 2 == 0 { ctx.alex.id } else { ctx.sam.id };
                    ctx.engine
                        .complete_task(ctx.couple.id, actor, task_id, date(2025, 1, 7), None)
                        .await
                })
            })
            .collect();

        let mut succeeded = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(CoreError::TaskAlreadyCompleted(_)) => rejected += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(succeeded, 1);
        assert_eq!(rejected, 7);
        assert!(ctx.repo().find_completion(task_id, date(2025, 1, 7)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicates_are_rejected() {
        let ctx = setup_test_db().await;
        let task = create_test_task(&ctx, "Vacuum", date(2025, 1, 1), Some("FREQ=DAILY")).await;
        let event = create_test_event(&ctx, "Yoga", utc(2025, 1, 6, 18, 0), 60, Some("FREQ=WEEKLY")).await;

        ctx.engine
            .complete_task(ctx.couple.id, ctx.alex.id, task.id, date(2025, 1, 5), None)
            .await
            .unwrap();
        let err = ctx
            .engine
            .complete_task(ctx.couple.id, ctx.sam.id, task.id, date(2025, 1, 5), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TaskAlreadyCompleted);

        ctx.engine
            .skip_task_occurrence(ctx.couple.id, ctx.alex.id, task.id, date(2025, 1, 6))
            .await
            .unwrap();
        let err = ctx
            .engine
            .skip_task_occurrence(ctx.couple.id, ctx.alex.id, task.id, date(2025, 1, 6))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        ctx.engine
            .skip_event_occurrence(ctx.couple.id, ctx.alex.id, event.id, utc(2025, 1, 13, 18, 0))
            .await
            .unwrap();
        let err = ctx
            .engine
            .skip_event_occurrence(ctx.couple.id, ctx.sam.id, event.id, utc(2025, 1, 13, 18, 0))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn test_completed_at_comes_from_clock() {
        let ctx = setup_test_db().await;
        let task = create_test_task(&ctx, "Vacuum", date(2025, 1, 1), Some("FREQ=DAILY")).await;
        ctx.clock.set(utc(2025, 1, 2, 21, 30));

        let completion = ctx
            .engine
            .complete_task(ctx.couple.id, ctx.alex.id, task.id, date(2025, 1, 1), None)
            .await
            .unwrap();
        assert_eq!(completion.completed_at, utc(2025, 1, 2, 21, 30));
        assert_eq!(completion.due_date, date(2025, 1, 1));

        let explicit = utc(2025, 1, 2, 7, 0);
        let backdated = ctx
            .engine
            .complete_task(ctx.couple.id, ctx.alex.id, task.id, date(2025, 1, 2), Some(explicit))
            .await
            .unwrap();
        assert_eq!(backdated.completed_at, explicit);
    }

    #[tokio::test]
    async fn test_undo_completion() {
        let ctx = setup_test_db().await;
        let task = create_test_task(&ctx, "Vacuum", date(2025, 1, 1), Some("FREQ=DAILY")).await;
        let completion = ctx
            .engine
            .complete_task(ctx.couple.id, ctx.alex.id, task.id, date(2025, 1, 1), None)
            .await
            .unwrap();

        let other = ctx.repo().create_couple("Neighbours".to_string()).await.unwrap();
        let neighbour = ctx.repo().add_member(other.id, "Jo".to_string()).await.unwrap();
        let foreign = ctx.engine.undo_completion(other.id, neighbour.id, completion.id).await;
        assert!(matches!(foreign, Err(CoreError::NotFound(_))));

        ctx.engine.undo_completion(ctx.couple.id, ctx.sam.id, completion.id).await.unwrap();
        assert!(ctx.repo().find_completion(task.id, date(2025, 1, 1)).await.unwrap().is_none());

        // Completing again after an undo is allowed
        ctx.engine
            .complete_task(ctx.couple.id, ctx.sam.id, task.id, date(2025, 1, 1), None)
            .await
            .unwrap();
    }
}

mod ownership_tests {
    use super::*;

    #[tokio::test]
    async fn test_actor_from_another_couple_is_unauthorized() {
        let ctx = setup_test_db().await;
        let task = create_test_task(&ctx, "Vacuum", date(2025, 1, 1), Some("FREQ=DAILY")).await;
        let other = ctx.repo().create_couple("Neighbours".to_string()).await.unwrap();
        let neighbour = ctx.repo().add_member(other.id, "Jo".to_string()).await.unwrap();

        let err = ctx
            .engine
            .complete_task(ctx.couple.id, neighbour.id, task.id, date(2025, 1, 1), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn test_definition_from_another_couple_is_unauthorized() {
        let ctx = setup_test_db().await;
        let task = create_test_task(&ctx, "Vacuum", date(2025, 1, 1), Some("FREQ=DAILY")).await;
        let other = ctx.repo().create_couple("Neighbours".to_string()).await.unwrap();
        let neighbour = ctx.repo().add_member(other.id, "Jo".to_string()).await.unwrap();

        let err = ctx
            .engine
            .skip_task_occurrence(other.id, neighbour.id, task.id, date(2025, 1, 1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let missing = ctx
            .engine
            .skip_task_occurrence(ctx.couple.id, ctx.alex.id, Uuid::now_v7(), date(2025, 1, 1))
            .await
            .unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_author_must_be_member() {
        let ctx = setup_test_db().await;
        let other = ctx.repo().create_couple("Neighbours".to_string()).await.unwrap();
        let neighbour = ctx.repo().add_member(other.id, "Jo".to_string()).await.unwrap();

        let result = ctx
            .repo()
            .add_task(NewTaskData {
                couple_id: ctx.couple.id,
                author_id: neighbour.id,
                title: "Sneaky".to_string(),
                description: None,
                start_date: date(2025, 1, 1),
                rrule: None,
            })
            .await;
        assert!(matches!(result, Err(CoreError::Unauthorized(_))));
    }
}

mod definition_tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_rule_rejected_at_creation() {
        let ctx = setup_test_db().await;
        let result = ctx
            .repo()
            .add_task(NewTaskData {
                couple_id: ctx.couple.id,
                author_id: ctx.alex.id,
                title: "Broken".to_string(),
                description: None,
                start_date: date(2025, 1, 1),
                rrule: Some("FREQ=FORTNIGHTLY".to_string()),
            })
            .await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidRRule);
    }

    #[tokio::test]
    async fn test_update_revalidates_and_changes_schedule() {
        let ctx = setup_test_db().await;
        let task = create_test_task(&ctx, "Plants", date(2025, 1, 1), Some("FREQ=DAILY")).await;

        let err = ctx
            .repo()
            .update_task(task.id, UpdateTaskData { rrule: Some(Some("BOGUS".to_string())), ..Default::default() })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRRule);

        ctx.clock.advance(Duration::hours(2));
        let updated = ctx
            .repo()
            .update_task(
                task.id,
                UpdateTaskData {
                    title: Some("Water plants".to_string()),
                    rrule: Some(Some("FREQ=WEEKLY;BYDAY=SA".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Water plants");
        assert_eq!(updated.updated_at, utc(2025, 1, 1, 10, 0));

        // 2025-01-06 is a Monday, 2025-01-04 a Saturday
        assert!(ctx.engine.get_tasks_for_day(ctx.couple.id, date(2025, 1, 6)).await.unwrap().is_empty());
        assert_eq!(ctx.engine.get_tasks_for_day(ctx.couple.id, date(2025, 1, 4)).await.unwrap().len(), 1);

        let one_off = ctx
            .repo()
            .update_task(task.id, UpdateTaskData { rrule: Some(None), ..Default::default() })
            .await
            .unwrap();
        assert!(!one_off.is_recurring());
    }

    #[tokio::test]
    async fn test_soft_deletion_cutoff() {
        let ctx = setup_test_db().await;
        let task = create_test_task(&ctx, "Laundry", date(2025, 1, 1), Some("FREQ=DAILY")).await;
        ctx.engine
            .complete_task(ctx.couple.id, ctx.alex.id, task.id, date(2025, 1, 4), None)
            .await
            .unwrap();

        ctx.clock.set(utc(2025, 1, 10, 12, 0));
        let deleted = ctx.repo().soft_delete_task(task.id).await.unwrap();
        assert_eq!(deleted.deleted_at, Some(utc(2025, 1, 10, 12, 0)));

        assert_eq!(ctx.engine.get_tasks_for_day(ctx.couple.id, date(2025, 1, 10)).await.unwrap().len(), 1);
        assert!(ctx.engine.get_tasks_for_day(ctx.couple.id, date(2025, 1, 11)).await.unwrap().is_empty());

        let january = ctx.engine.get_monthly_summary(ctx.couple.id, 2025, 1).await.unwrap();
        assert_eq!(january.total_planned, 10);
        assert_eq!(january.total_completed, 1);

        let february = ctx.engine.get_monthly_summary(ctx.couple.id, 2025, 2).await.unwrap();
        assert_eq!(february.total_planned, 0);

        let stats = ctx.engine.get_member_stats(ctx.couple.id).await.unwrap();
        let alex = stats.iter().find(|m| m.member_id == ctx.alex.id).unwrap();
        assert_eq!(alex.completed, 1);

        assert!(matches!(ctx.repo().soft_delete_task(task.id).await, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_deletion_at_midnight_ends_that_day() {
        let ctx = setup_test_db().await;
        let task = create_test_task(&ctx, "Laundry", date(2025, 1, 1), Some("FREQ=DAILY")).await;

        ctx.clock.set(utc(2025, 2, 1, 0, 0));
        ctx.repo().soft_delete_task(task.id).await.unwrap();

        assert!(ctx.engine.get_tasks_for_day(ctx.couple.id, date(2025, 2, 1)).await.unwrap().is_empty());
        assert_eq!(ctx.engine.get_tasks_for_day(ctx.couple.id, date(2025, 1, 31)).await.unwrap().len(), 1);

        let january = ctx.engine.get_monthly_summary(ctx.couple.id, 2025, 1).await.unwrap();
        assert_eq!(january.total_planned, 31);
        let february = ctx.engine.get_monthly_summary(ctx.couple.id, 2025, 2).await.unwrap();
        assert_eq!(february.total_planned, 0);
    }
}

mod summary_tests {
    use super::*;

    #[tokio::test]
    async fn test_monthly_summary_per_member() {
        let ctx = setup_test_db().await;
        let task = create_test_task(&ctx, "Dishes", date(2025, 1, 1), Some("FREQ=DAILY")).await;

        ctx.engine
            .complete_task(ctx.couple.id, ctx.alex.id, task.id, date(2025, 1, 3), None)
            .await
            .unwrap();
        ctx.engine
            .complete_task(ctx.couple.id, ctx.sam.id, task.id, date(2025, 1, 5), None)
            .await
            .unwrap();
        // Outside the month
        ctx.engine
            .complete_task(ctx.couple.id, ctx.sam.id, task.id, date(2025, 2, 1), None)
            .await
            .unwrap();

        let summary = ctx.engine.get_monthly_summary(ctx.couple.id, 2025, 1).await.unwrap();
        assert_eq!(summary.total_planned, 31);
        assert_eq!(summary.total_completed, 2);
        assert_eq!(summary.members.len(), 2);
        assert!(summary.members.iter().all(|m| m.completed == 1));

        let names: Vec<_> = summary.members.iter().map(|m| m.display_name.as_str()).collect();
        assert_eq!(names, vec!["Alex", "Sam"]);
    }

    #[tokio::test]
    async fn test_monthly_summary_starting_mid_month() {
        let ctx = setup_test_db().await;
        create_test_task(&ctx, "Dishes", date(2025, 4, 11), Some("FREQ=DAILY")).await;
        create_test_task(&ctx, "Dentist", date(2025, 4, 2), None).await;

        let summary = ctx.engine.get_monthly_summary(ctx.couple.id, 2025, 4).await.unwrap();
        assert_eq!(summary.total_planned, 21);
        assert_eq!(summary.total_completed, 0);
        assert!(summary.members.iter().all(|m| m.completed == 0));
    }

    #[tokio::test]
    async fn test_monthly_summary_rejects_bad_arguments() {
        let ctx = setup_test_db().await;
        for (year, month) in [(1999, 5), (2101, 5), (2025, 0), (2025, 13)] {
            let err = ctx.engine.get_monthly_summary(ctx.couple.id, year, month).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
    }
}
