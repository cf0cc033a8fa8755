/// Partitioning tests
///
/// The workload splits by membership grade: one partition per grade, the
/// grid hint clamped by the enumeration, and per-partition record sets
/// disjoint by predicate construction.
/// Run with: cargo test --test partition_tests
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use userbatch::{
    BatchStatus, ExecutionEvent, ExecutionListener, Grade, GradePartitioner, InMemoryUserStore,
    InactiveUserJob, JobConfig, ListenerSet, RecordingListener, UserRecord,
};

fn user(idx: u64, grade: Grade) -> UserRecord {
    UserRecord::builder(idx)
        .email(&format!("user{idx}@example.com"))
        .grade(grade)
        .updated_at(Utc::now() - Duration::days(500))
        .build()
}

#[tokio::test]
async fn test_grid_hint_of_five_yields_three_partitions() {
    let plans = GradePartitioner::partition(5);
    assert_eq!(plans.len(), 3);

    let grades: Vec<Grade> = plans.iter().map(|p| p.grade).collect();
    assert_eq!(grades, vec![Grade::Vip, Grade::Gold, Grade::Normal]);
}

#[tokio::test]
async fn test_each_partition_processes_only_its_grade() {
    let store = Arc::new(InMemoryUserStore::new());
    // 4 VIP, 3 GOLD, 5 NORMAL dormant users, idx encodes the grade.
    store.seed((1..=4).map(|i| user(i, Grade::Vip))).await;
    store.seed((11..=13).map(|i| user(i, Grade::Gold))).await;
    store.seed((21..=25).map(|i| user(i, Grade::Normal))).await;

    let recorder = Arc::new(RecordingListener::new());
    let job = InactiveUserJob::with_listeners(
        store.clone(),
        JobConfig::new().grid_size(5),
        ListenerSet::new(vec![Arc::clone(&recorder) as Arc<dyn ExecutionListener>]),
    )
    .unwrap();

    let execution = job.launch(Utc::now()).await.unwrap();
    assert_eq!(execution.status, BatchStatus::Completed);
    assert_eq!(execution.steps.len(), 3);

    // Group processed idx by partition name and check each group only holds
    // that partition's grade.
    let mut by_partition: HashMap<String, Vec<u64>> = HashMap::new();
    for event in recorder.events() {
        if let ExecutionEvent::AfterItem { partition, user_idx } = event {
            by_partition.entry(partition).or_default().push(user_idx);
        }
    }

    assert_eq!(by_partition.len(), 3);
    assert!(by_partition["partition0"].iter().all(|i| (1..=4).contains(i)));
    assert!(by_partition["partition1"].iter().all(|i| (11..=13).contains(i)));
    assert!(by_partition["partition2"].iter().all(|i| (21..=25).contains(i)));

    assert_eq!(by_partition["partition0"].len(), 4);
    assert_eq!(by_partition["partition1"].len(), 3);
    assert_eq!(by_partition["partition2"].len(), 5);
}

#[tokio::test]
async fn test_empty_grade_partition_completes_with_zero_items() {
    let store = Arc::new(InMemoryUserStore::new());
    // Only GOLD users; the VIP and NORMAL partitions see empty snapshots.
    store.seed((1..=6).map(|i| user(i, Grade::Gold))).await;

    let job = InactiveUserJob::new(store, JobConfig::default()).unwrap();
    let execution = job.launch(Utc::now()).await.unwrap();

    assert_eq!(execution.status, BatchStatus::Completed);
    assert_eq!(execution.steps.len(), 3);
    assert_eq!(execution.items_written(), 6);

    let empty_steps = execution
        .steps
        .iter()
        .filter(|s| s.items_written == 0)
        .count();
    assert_eq!(empty_steps, 2);
}

#[tokio::test]
async fn test_partition_summaries_keep_spawn_order() {
    let store = Arc::new(InMemoryUserStore::new());
    store.seed((1..=3).map(|i| user(i, Grade::Normal))).await;

    let job = InactiveUserJob::new(store, JobConfig::default()).unwrap();
    let execution = job.launch(Utc::now()).await.unwrap();

    let names: Vec<&str> = execution.steps.iter().map(|s| s.partition.as_str()).collect();
    assert_eq!(names, vec!["partition0", "partition1", "partition2"]);
}
