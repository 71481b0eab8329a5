use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use conduit_model::{Batch, InsertTemplate};
use tokio::sync::{Mutex, Notify};
use tracing::debug;

use crate::worker::Worker;

/// One-shot event, set at most once, awaited by any number of callers.
///
/// Not bound to the Coordinator's mutex: completion is a separate concern
/// from the buffer/template state.
struct CompletionLatch {
    done: AtomicBool,
    notify: Notify,
}

impl CompletionLatch {
    fn new() -> Self {
        CompletionLatch {
            done: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    fn signal(&self) {
        if !self.done.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    async fn wait(&self) {
        loop {
            if self.done.load(Ordering::SeqCst) {
                return;
            }
            let notified = self.notify.notified();
            if self.done.load(Ordering::SeqCst) {
                return;
            }
            notified.await;
        }
    }
}

struct State {
    buffer: VecDeque<Batch>,
    producers_online: i64,
    template: Option<InsertTemplate>,
    /// Set once `stop_all_workers` has run. Lets any waiter blocked on a
    /// condition variable — regardless of which one — recognize an abort
    /// and return instead of looping forever.
    stopped: bool,
}

/// The bounded FIFO of batches plus the synchronization primitives that
/// mediate the single Extractor and the pool of Loaders.
///
/// A single `tokio::sync::Mutex` guards the buffer, the producers-online
/// counter, and the insert-template slot. Three `Notify` instances stand in
/// for three condition variables (`not_full`, `not_empty`,
/// `template_available`); the completion latch is a fourth, independent
/// one-shot event. `async`/await plus `Notify` stands in for POSIX
/// mutex+cvar here rather than a bounded `mpsc` channel, because the
/// Coordinator also needs to broadcast a stop to an arbitrary number of
/// registered workers — something a plain channel can't do on its own.
pub struct Coordinator {
    state: Mutex<State>,
    not_full: Notify,
    not_empty: Notify,
    template_available: Notify,
    completion: CompletionLatch,
    workers: Mutex<Vec<Arc<dyn Worker>>>,
    buffer_size: usize,
}

impl Coordinator {
    pub fn new(buffer_size: usize) -> Self {
        assert!(buffer_size >= 1, "buffer_size must be >= 1");
        Coordinator {
            state: Mutex::new(State {
                buffer: VecDeque::new(),
                producers_online: 0,
                template: None,
                stopped: false,
            }),
            not_full: Notify::new(),
            not_empty: Notify::new(),
            template_available: Notify::new(),
            completion: CompletionLatch::new(),
            workers: Mutex::new(Vec::new()),
            buffer_size,
        }
    }

    /// Register a worker for the stop broadcast. Must be called before the
    /// worker is started. If `is_producer`, increments producers-online.
    pub async fn subscribe(&self, worker: Arc<dyn Worker>, is_producer: bool) {
        if is_producer {
            let mut state = self.state.lock().await;
            state.producers_online += 1;
        }
        self.workers.lock().await.push(worker);
    }

    pub async fn buffer_len(&self) -> usize {
        self.state.lock().await.buffer.len()
    }

    pub async fn producers_online(&self) -> i64 {
        self.state.lock().await.producers_online
    }

    /// Blocks while the buffer is full; appends the batch and wakes one
    /// waiter on not-empty. Returns `false` without enqueueing if the job
    /// was aborted while this call was blocked — the caller (the Extractor)
    /// must treat that as "stop producing", not as a successful enqueue.
    pub async fn enqueue(&self, batch: Batch) -> bool {
        loop {
            let notified = self.not_full.notified();
            {
                let mut state = self.state.lock().await;
                if state.stopped {
                    return false;
                }
                if state.buffer.len() < self.buffer_size {
                    state.buffer.push_back(batch);
                    drop(state);
                    self.not_empty.notify_one();
                    return true;
                }
                debug!(buffer_size = self.buffer_size, "producer blocked: buffer full");
            }
            notified.await;
        }
    }

    /// Pops the oldest batch. Blocks while the buffer is empty and
    /// producers are still online, rechecking the condition on every wakeup
    /// so a spurious notification can't be mistaken for real progress. When
    /// the buffer is empty and no producer remains, broadcasts the stop and
    /// returns `None` — callers treat `None` as end-of-stream.
    pub async fn dequeue(&self) -> Option<Batch> {
        loop {
            let notified = self.not_empty.notified();
            {
                let mut state = self.state.lock().await;
                if state.stopped {
                    return None;
                }
                if let Some(batch) = state.buffer.pop_front() {
                    drop(state);
                    self.not_full.notify_one();
                    return Some(batch);
                }
                if state.producers_online <= 0 {
                    drop(state);
                    self.stop_all_workers().await;
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Called by the Extractor at clean exit of its fetch loop: decrements
    /// producers-online and wakes every blocked loader so it can re-check
    /// the drain condition.
    pub async fn producer_end_process(&self) {
        {
            let mut state = self.state.lock().await;
            state.producers_online -= 1;
        }
        self.not_empty.notify_waiters();
    }

    /// Publishes the insert template. Must be called exactly once, before
    /// the first `enqueue`.
    pub async fn set_insert_template(&self, template: InsertTemplate) {
        {
            let mut state = self.state.lock().await;
            debug_assert!(state.template.is_none(), "insert template set twice");
            state.template = Some(template);
        }
        self.template_available.notify_waiters();
    }

    /// Blocks until the template is set. Returns `None` if the job was
    /// aborted before a template was ever published (the producer's SELECT
    /// failed before publication).
    pub async fn get_insert_template(&self) -> Option<InsertTemplate> {
        loop {
            let notified = self.template_available.notified();
            {
                let state = self.state.lock().await;
                if let Some(template) = &state.template {
                    return Some(template.clone());
                }
                if state.stopped {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Sets every subscribed worker's stop flag, wakes every blocked
    /// waiter on all three condition variables, and marks the Coordinator
    /// as stopped so in-progress/future `enqueue`/`dequeue`/
    /// `get_insert_template` calls return immediately instead of blocking.
    /// Idempotent.
    pub async fn stop_all_workers(&self) {
        {
            let mut state = self.state.lock().await;
            if state.stopped {
                return;
            }
            state.stopped = true;
        }
        for worker in self.workers.lock().await.iter() {
            worker.stop();
        }
        self.not_full.notify_waiters();
        self.not_empty.notify_waiters();
        self.template_available.notify_waiters();
    }

    /// Sets the completion latch. Called exactly once by the stage runner,
    /// after every Loader task has been joined — never by the first loader
    /// to observe drain (see DESIGN.md).
    pub fn signal_completion(&self) {
        self.completion.signal();
    }

    pub async fn wait_for_completion(&self) {
        self.completion.wait().await;
    }
}
