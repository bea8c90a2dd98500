//! Concurrent saves competing for the same slug.

use std::collections::HashSet;
use std::sync::Arc;

use slugline_test::core::record::Record;
use tokio::sync::Barrier;

use super::helpers::TestEngine;

const WRITERS: usize = 16;

/// Spawns `WRITERS` saves of the same record template, released together.
async fn save_concurrently(t: &TestEngine, template: &Record) -> Vec<Record> {
    let barrier = Arc::new(Barrier::new(WRITERS));
    let tasks = (0..WRITERS).map(|_| {
        let engine = t.engine.clone();
        let barrier = barrier.clone();
        let record = template.clone();
        tokio::spawn(async move {
            barrier.wait().await;
            engine.save(record).await
        })
    });

    futures::future::try_join_all(tasks)
        .await
        .expect("no task panicked")
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .expect("every save succeeds")
}

fn slugs<'r>(records: impl IntoIterator<Item = &'r Record>) -> HashSet<String> {
    records
        .into_iter()
        .filter_map(|r| r.text("slug").map(str::to_string))
        .collect()
}

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn concurrent_saves_in_one_scope_get_distinct_slugs() {
    let t = TestEngine::new();
    let item = t.item("Parent").await;
    let template = Record::new("sub_item")
        .with("name", "Name")
        .with("item_id", item.id());

    let saved = save_concurrently(&t, &template).await;
    assert_eq!(slugs(&saved).len(), WRITERS);

    let stored = t.store.records("sub_item").await;
    assert_eq!(stored.len(), WRITERS);
    assert_eq!(slugs(&stored).len(), WRITERS);
    assert!(slugs(&stored).contains("name"));
}

#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn concurrent_saves_in_two_scopes() {
    let t = TestEngine::new();
    let item1 = t.item("First").await;
    let item2 = t.item("Second").await;
    let template1 = Record::new("sub_item")
        .with("name", "Name")
        .with("item_id", item1.id());
    let template2 = Record::new("sub_item")
        .with("name", "Name")
        .with("item_id", item2.id());

    let (saved1, saved2) = tokio::join!(
        save_concurrently(&t, &template1),
        save_concurrently(&t, &template2)
    );

    assert_eq!(slugs(&saved1).len(), WRITERS);
    assert_eq!(slugs(&saved2).len(), WRITERS);
    assert_eq!(slugs(&saved1), slugs(&saved2));
    assert_eq!(t.store.records("sub_item").await.len(), 2 * WRITERS);
}
