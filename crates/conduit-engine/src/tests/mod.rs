mod fakes;

use std::sync::Arc;

use conduit_core::coordinator::Coordinator;
use conduit_core::worker::Worker;
use conduit_model::{Row, Value};

use crate::extractor::Extractor;
use crate::loader::Loader;
use fakes::{FakeSource, FakeTarget};

fn row(n: i64) -> Row {
    Row::new(vec![Value::Int(n)])
}

struct PipelineOutcome {
    rows_extracted: Option<u64>,
    rows_loaded: Vec<u64>,
    target_rows: Vec<Row>,
}

/// Wires one Extractor and `consumers` Loaders against fake connectors, the
/// same shape `run_stage` wires real ones, and runs the job to completion.
async fn drive_pipeline(source: FakeSource, buffer_size: usize, consumers: usize) -> PipelineOutcome {
    let (target, sink) = FakeTarget::new();
    let coordinator = Arc::new(Coordinator::new(buffer_size));

    let extractor = Arc::new(Extractor::new(
        coordinator.clone(),
        Arc::new(source),
        "SELECT * FROM source_table".into(),
        50,
        500,
        "target_table".into(),
    ));
    coordinator.subscribe(extractor.clone() as Arc<dyn Worker>, true).await;

    let target = Arc::new(target);
    let mut loaders = Vec::with_capacity(consumers);
    for _ in 0..consumers {
        let loader = Arc::new(Loader::new(coordinator.clone(), target.clone()));
        coordinator.subscribe(loader.clone() as Arc<dyn Worker>, false).await;
        loaders.push(loader);
    }

    let extractor_handle = {
        let extractor = extractor.clone();
        tokio::spawn(async move { extractor.run().await })
    };
    let loader_handles: Vec<_> = loaders
        .into_iter()
        .map(|loader| tokio::spawn(async move { loader.run().await }))
        .collect();

    let mut rows_loaded = Vec::new();
    for handle in loader_handles {
        rows_loaded.push(handle.await.unwrap().expect("loader should not fail"));
    }
    coordinator.signal_completion();

    let rows_extracted = extractor_handle.await.unwrap().ok();
    coordinator.wait_for_completion().await;

    PipelineOutcome {
        rows_extracted,
        rows_loaded,
        target_rows: sink.lock().unwrap().clone(),
    }
}

#[tokio::test]
async fn full_run_delivers_every_row_in_source_order() {
    let source = FakeSource::new(
        vec!["id".into()],
        vec![vec![row(1), row(2)], vec![row(3), row(4), row(5)]],
    );
    let outcome = drive_pipeline(source, 10, 3).await;

    assert_eq!(outcome.rows_extracted, Some(5));
    assert_eq!(outcome.rows_loaded.iter().sum::<u64>(), 5);
    let mut ids: Vec<i64> = outcome
        .target_rows
        .iter()
        .map(|r| match &r.values()[0] {
            Value::Int(n) => *n,
            _ => unreachable!(),
        })
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn empty_source_completes_cleanly_with_nothing_loaded() {
    let source = FakeSource::new(vec!["id".into()], vec![]);
    let outcome = drive_pipeline(source, 4, 2).await;

    assert_eq!(outcome.rows_extracted, Some(0));
    assert!(outcome.target_rows.is_empty());
    assert!(outcome.rows_loaded.iter().all(|&n| n == 0));
}

#[tokio::test]
async fn single_batch_smaller_than_chunk_size_reaches_every_consumer_pool() {
    let source = FakeSource::new(vec!["id".into()], vec![vec![row(1), row(2)]]);
    let outcome = drive_pipeline(source, 4, 4).await;

    assert_eq!(outcome.rows_extracted, Some(2));
    assert_eq!(outcome.target_rows.len(), 2);
}

#[tokio::test]
async fn single_consumer_runs_without_races() {
    let source = FakeSource::new(vec!["id".into()], vec![vec![row(1)], vec![row(2)], vec![row(3)]]);
    let outcome = drive_pipeline(source, 5, 1).await;

    assert_eq!(outcome.rows_extracted, Some(3));
    assert_eq!(outcome.rows_loaded, vec![3]);
}

#[tokio::test]
async fn buffer_capacity_one_does_not_deadlock() {
    let chunks = (0..6).map(|i| vec![row(i)]).collect();
    let source = FakeSource::new(vec!["id".into()], chunks);
    let outcome = drive_pipeline(source, 1, 2).await;

    assert_eq!(outcome.rows_extracted, Some(6));
    assert_eq!(outcome.target_rows.len(), 6);
}

#[tokio::test]
async fn extractor_failure_before_template_publication_releases_blocked_loaders() {
    let source = FakeSource::failing();
    let (target, sink) = FakeTarget::new();
    let coordinator = Arc::new(Coordinator::new(4));

    let extractor = Arc::new(Extractor::new(
        coordinator.clone(),
        Arc::new(source),
        "SELECT * FROM source_table".into(),
        50,
        500,
        "target_table".into(),
    ));
    coordinator.subscribe(extractor.clone() as Arc<dyn Worker>, true).await;

    let target = Arc::new(target);
    let loaders: Vec<_> = (0..3)
        .map(|_| Arc::new(Loader::new(coordinator.clone(), target.clone())))
        .collect();
    for loader in &loaders {
        coordinator.subscribe(loader.clone() as Arc<dyn Worker>, false).await;
    }

    let extractor_handle = tokio::spawn({
        let extractor = extractor.clone();
        async move { extractor.run().await }
    });
    let loader_handles: Vec<_> = loaders
        .into_iter()
        .map(|loader| tokio::spawn(async move { loader.run().await }))
        .collect();

    for handle in loader_handles {
        let result = handle.await.unwrap();
        assert_eq!(result.unwrap(), 0);
    }

    assert!(extractor_handle.await.unwrap().is_err());
    assert!(sink.lock().unwrap().is_empty());
}
