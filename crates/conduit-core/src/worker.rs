use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::coordinator::Coordinator;

/// Common interface the Coordinator uses to broadcast a stop to every
/// subscribed worker. Extractor and Loader are not subclasses of a worker
/// base class — each just embeds a [`WorkerBase`] and forwards these three
/// methods to it (variants are carried by the `is_producer` tag, not by
/// inheritance).
pub trait Worker: Send + Sync {
    fn is_producer(&self) -> bool;
    fn stop(&self);
    fn is_stopped(&self) -> bool;
}

/// The lifecycle plumbing shared by the Extractor and every Loader: a
/// cooperative one-shot stop flag, a handle back to the Coordinator it is
/// subscribed to, and the producer/consumer tag.
///
/// Cancellation is cooperative: `is_stopped` is consulted between batches,
/// never while blocked inside a database driver call.
pub struct WorkerBase {
    coordinator: Arc<Coordinator>,
    stop_flag: AtomicBool,
    is_producer: bool,
}

impl WorkerBase {
    pub fn new(coordinator: Arc<Coordinator>, is_producer: bool) -> Self {
        WorkerBase {
            coordinator,
            stop_flag: AtomicBool::new(false),
            is_producer,
        }
    }

    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    pub fn is_producer(&self) -> bool {
        self.is_producer
    }

    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::SeqCst)
    }

    /// Delegates to `Coordinator::stop_all_workers`: the one path by which a
    /// worker failure tears down the whole job.
    pub async fn abort_job(&self) {
        self.coordinator.stop_all_workers().await;
    }
}
