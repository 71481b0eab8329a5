use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use conduit_model::{Batch, InsertTemplate, Row, Value};

use crate::coordinator::Coordinator;
use crate::worker::Worker;

struct TestWorker {
    is_producer: bool,
    stopped: AtomicBool,
}

impl TestWorker {
    fn new(is_producer: bool) -> Arc<Self> {
        Arc::new(TestWorker {
            is_producer,
            stopped: AtomicBool::new(false),
        })
    }
}

impl Worker for TestWorker {
    fn is_producer(&self) -> bool {
        self.is_producer
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

fn batch(seq: u64, n: usize) -> Batch {
    let rows = (0..n)
        .map(|i| Row::new(vec![Value::Int(i as i64)]))
        .collect();
    Batch::new(seq, rows)
}

#[tokio::test]
async fn fifo_order_is_preserved() {
    let coordinator = Coordinator::new(10);
    assert!(coordinator.enqueue(batch(1, 40)).await);
    assert!(coordinator.enqueue(batch(2, 40)).await);
    assert!(coordinator.enqueue(batch(3, 20)).await);
    coordinator.producer_end_process().await;

    let first = coordinator.dequeue().await.unwrap();
    let second = coordinator.dequeue().await.unwrap();
    let third = coordinator.dequeue().await.unwrap();

    assert_eq!(first.seq, 1);
    assert_eq!(second.seq, 2);
    assert_eq!(third.seq, 3);
    assert!(coordinator.dequeue().await.is_none());
}

#[tokio::test]
async fn empty_result_drains_cleanly_without_publishing_rows() {
    let coordinator = Arc::new(Coordinator::new(4));
    coordinator
        .set_insert_template(InsertTemplate::new("t", vec!["id".into(), "name".into()]))
        .await;
    coordinator.producer_end_process().await;

    assert!(coordinator.dequeue().await.is_none());
    assert_eq!(coordinator.buffer_len().await, 0);
}

#[tokio::test]
async fn buffer_capacity_one_alternates_without_deadlock() {
    let coordinator = Arc::new(Coordinator::new(1));
    let producer = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move {
            for i in 0..5u64 {
                assert!(coordinator.enqueue(batch(i, 1)).await);
            }
            coordinator.producer_end_process().await;
        })
    };

    let mut seen = Vec::new();
    loop {
        match coordinator.dequeue().await {
            Some(b) => seen.push(b.seq),
            None => break,
        }
    }

    producer.await.unwrap();
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn backpressure_blocks_producer_when_buffer_full() {
    let coordinator = Arc::new(Coordinator::new(1));
    assert!(coordinator.enqueue(batch(0, 1)).await);

    let coordinator2 = coordinator.clone();
    let blocked_enqueue = tokio::spawn(async move { coordinator2.enqueue(batch(1, 1)).await });

    // Give the spawned enqueue a chance to park on not_full.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(coordinator.buffer_len().await, 1);

    let drained = coordinator.dequeue().await.unwrap();
    assert_eq!(drained.seq, 0);

    assert!(blocked_enqueue.await.unwrap());
    assert_eq!(coordinator.buffer_len().await, 1);
}

#[tokio::test]
async fn producers_online_never_goes_negative_and_multiple_loaders_all_see_drain() {
    let coordinator = Arc::new(Coordinator::new(4));
    let loader_a = TestWorker::new(false);
    let loader_b = TestWorker::new(false);
    let loader_c = TestWorker::new(false);
    coordinator.subscribe(loader_a.clone(), false).await;
    coordinator.subscribe(loader_b.clone(), false).await;
    coordinator.subscribe(loader_c.clone(), false).await;

    coordinator.producer_end_process().await;
    assert!(coordinator.producers_online().await >= 0);

    let c1 = coordinator.clone();
    let c2 = coordinator.clone();
    let c3 = coordinator.clone();
    let (r1, r2, r3) = tokio::join!(
        tokio::spawn(async move { c1.dequeue().await }),
        tokio::spawn(async move { c2.dequeue().await }),
        tokio::spawn(async move { c3.dequeue().await }),
    );
    assert!(r1.unwrap().is_none());
    assert!(r2.unwrap().is_none());
    assert!(r3.unwrap().is_none());
    assert!(coordinator.producers_online().await >= 0);
}

#[tokio::test]
async fn insert_template_is_set_exactly_once_and_blocks_until_published() {
    let coordinator = Arc::new(Coordinator::new(4));
    let c2 = coordinator.clone();
    let waiter = tokio::spawn(async move { c2.get_insert_template().await });

    tokio::time::sleep(Duration::from_millis(10)).await;
    coordinator
        .set_insert_template(InsertTemplate::new("t", vec!["id".into()]))
        .await;

    let template = waiter.await.unwrap().expect("template should be published");
    assert_eq!(template.table, "t");
    assert_eq!(template.columns, vec!["id".to_string()]);
}

#[tokio::test]
async fn abort_before_template_publication_releases_blocked_loaders() {
    let coordinator = Arc::new(Coordinator::new(4));
    let loader = TestWorker::new(false);
    coordinator.subscribe(loader.clone(), false).await;

    let c2 = coordinator.clone();
    let waiter = tokio::spawn(async move { c2.get_insert_template().await });

    tokio::time::sleep(Duration::from_millis(10)).await;
    coordinator.stop_all_workers().await;

    let template = waiter.await.unwrap();
    assert!(template.is_none());
    assert!(loader.is_stopped());
}

#[tokio::test]
async fn completion_latch_transitions_once_and_wait_unblocks_all_callers() {
    let coordinator = Arc::new(Coordinator::new(4));
    let c2 = coordinator.clone();
    let c3 = coordinator.clone();
    let waiter_a = tokio::spawn(async move { c2.wait_for_completion().await });
    let waiter_b = tokio::spawn(async move { c3.wait_for_completion().await });

    tokio::time::sleep(Duration::from_millis(10)).await;
    coordinator.signal_completion();
    coordinator.signal_completion(); // idempotent

    waiter_a.await.unwrap();
    waiter_b.await.unwrap();
}

#[tokio::test]
async fn mid_stream_abort_unblocks_producer_blocked_on_enqueue() {
    let coordinator = Arc::new(Coordinator::new(1));
    assert!(coordinator.enqueue(batch(0, 1)).await);

    let c2 = coordinator.clone();
    let blocked_enqueue = tokio::spawn(async move { c2.enqueue(batch(1, 1)).await });

    tokio::time::sleep(Duration::from_millis(10)).await;
    coordinator.stop_all_workers().await;

    assert!(!blocked_enqueue.await.unwrap());
}
