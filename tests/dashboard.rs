//! End-to-end scenarios through the store and query engine.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, FixedOffset};

use taskflow::AppState;
use taskflow::categories::Category;
use taskflow::clock::FixedClock;
use taskflow::logic::{StatusFilter, TaskQuery};
use taskflow::models::{NewTask, Priority, Seed, Task, TaskPatch};

fn now() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2026-10-18T10:00:00+02:00").unwrap()
}

fn category(id: u64, name: &str) -> Category {
    Category {
        id,
        name: name.into(),
        color: "#000000".into(),
    }
}

fn state(tasks: Vec<Task>) -> (AppState, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(now()));
    let seed = Seed {
        categories: vec![category(1, "Work"), category(2, "Shopping")],
        tasks,
    };
    let state = AppState::from_seed(seed, clock.clone(), Duration::ZERO);
    (state, clock)
}

fn open_task(id: u64, category: &str, due: Option<DateTime<FixedOffset>>) -> Task {
    Task {
        id,
        title: format!("task {id}"),
        description: String::new(),
        category: category.into(),
        priority: Priority::Medium,
        due_date: due,
        completed: false,
        completed_at: None,
        created_at: now() - ChronoDuration::days(7),
        time_entries: Vec::new(),
        total_time_spent: 0,
    }
}

#[tokio::test]
async fn overdue_task_moves_to_completed_when_toggled() {
    let yesterday = now() - ChronoDuration::days(1);
    let (state, _) = state(vec![open_task(1, "Work", Some(yesterday))]);

    let overdue = state.query.by_status(StatusFilter::Overdue).await;
    assert_eq!(overdue.iter().map(|t| t.id).collect::<Vec<_>>(), [1]);

    state.store.toggle_complete(1).await.unwrap();

    assert!(state.query.by_status(StatusFilter::Overdue).await.is_empty());
    let completed = state.query.by_status(StatusFilter::Completed).await;
    assert_eq!(completed.iter().map(|t| t.id).collect::<Vec<_>>(), [1]);
}

#[tokio::test]
async fn first_task_in_empty_store() {
    let (state, _) = state(Vec::new());
    let task = state
        .store
        .create(NewTask::new("Buy milk", "Shopping"))
        .await
        .unwrap();

    assert_eq!(task.id, 1);
    assert!(!task.completed);
    assert_eq!(task.created_at, now());
    assert_eq!(task.total_time_spent, 0);
}

#[tokio::test]
async fn time_tracking_totals() {
    let (state, clock) = state(vec![open_task(1, "Work", None)]);
    let start = now();

    let task = state
        .store
        .add_time_entry(1, start, start + ChronoDuration::milliseconds(600_000))
        .await
        .unwrap()
        .unwrap();
    let first = task.time_entries[0].id;

    clock.advance(ChronoDuration::seconds(1));
    let task = state
        .store
        .add_time_entry(1, start, start + ChronoDuration::milliseconds(300_000))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(task.total_time_spent, 900_000);

    let task = state.store.remove_time_entry(1, first).await.unwrap();
    assert_eq!(task.total_time_spent, 300_000);
    let sum: u64 = task.time_entries.iter().map(|e| e.duration).sum();
    assert_eq!(task.total_time_spent, sum);
}

#[tokio::test]
async fn search_matches_category_only() {
    let mut task = open_task(1, "Work", None);
    task.title = "Prepare slides".into();
    task.description = "for the offsite".into();
    let (state, _) = state(vec![task, open_task(2, "Shopping", None)]);

    let found = state.query.search("work").await;
    assert_eq!(found.iter().map(|t| t.id).collect::<Vec<_>>(), [1]);
}

#[tokio::test]
async fn totals_on_update_ignore_supplied_value_without_entries() {
    let (state, _) = state(vec![open_task(1, "Work", None)]);
    // a JSON body carrying only totalTimeSpent has no effect on the total
    let patch: TaskPatch = serde_json::from_str(r#"{"totalTimeSpent": 5000}"#).unwrap();
    let task = state.store.update(1, patch).await.unwrap().unwrap();
    assert_eq!(task.total_time_spent, 0);
}

#[tokio::test]
async fn dashboard_view_combines_category_and_status() {
    let past = now() - ChronoDuration::hours(3);
    let future = now() + ChronoDuration::days(2);
    let (state, _) = state(vec![
        open_task(1, "Work", Some(past)),
        open_task(2, "Work", Some(future)),
        open_task(3, "Shopping", Some(past)),
    ]);

    let query = TaskQuery {
        search: None,
        category: Some("Work".into()),
        status: Some(StatusFilter::Overdue),
    };
    let view = state.query.view(&query).await;
    assert_eq!(view.iter().map(|t| t.id).collect::<Vec<_>>(), [1]);

    let direct = state
        .query
        .combined_filter("Work", StatusFilter::Upcoming)
        .await;
    assert_eq!(direct.iter().map(|t| t.id).collect::<Vec<_>>(), [2]);
}

#[tokio::test]
async fn deleting_updates_counts_and_stats() {
    let (state, _) = state(vec![
        open_task(1, "Work", None),
        open_task(2, "Work", None),
        open_task(3, "Shopping", None),
    ]);
    state.store.toggle_complete(3).await.unwrap();
    assert_eq!(state.query.progress_summary().await.completion_rate(), 33);

    let removed = state.store.delete(1).await.unwrap();
    assert_eq!(removed.id, 1);
    assert!(state.store.get_by_id(1).await.is_none());

    let counts = state.query.category_counts().await;
    assert_eq!(counts.get("Work"), Some(&1));
    assert_eq!(counts.get("Shopping"), Some(&1));
    assert_eq!(state.query.progress_summary().await.completion_rate(), 50);
}

#[tokio::test]
async fn orphaned_category_is_tolerated() {
    let (state, _) = state(vec![open_task(1, "Gardening", None)]);
    assert_eq!(state.query.by_category("Gardening").await.len(), 1);
    assert_eq!(state.query.categories().color_of("Gardening"), "#6b7280");
    let resolved = state.query.resolve_category("Gardening").await;
    assert_eq!((resolved.id, resolved.task_count), (0, 1));
    let counts = state.query.category_counts().await;
    assert_eq!(counts.values().sum::<usize>(), 0);
}

#[tokio::test(start_paused = true)]
async fn operations_wait_for_simulated_latency() {
    let clock = Arc::new(FixedClock::new(now()));
    let state = AppState::from_seed(Seed::default(), clock, Duration::from_millis(300));

    let started = tokio::time::Instant::now();
    state.store.create(NewTask::new("a", "Work")).await.unwrap();
    state.store.get_all().await;
    assert!(started.elapsed() >= Duration::from_millis(600));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_get_unique_ids() {
    let (state, _) = state(Vec::new());

    let handles: Vec<_> = (0..200)
        .map(|i| {
            let state = state.clone();
            tokio::spawn(async move {
                state
                    .store
                    .create(NewTask::new(format!("task {i}"), "Work"))
                    .await
                    .unwrap()
                    .id
            })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 200);
    assert_eq!(state.store.get_all().await.len(), 200);
}
