//! Bounded worker pool that can feed itself
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore
//! - Backpressure on the submitter when every worker is busy
//! - Follow-up tasks produced by a finished task, fed back into the same pool
//! - Outstanding-task tracking so the driver can wait for true completion
//!
//! A task counts as outstanding from the moment it is submitted (before any
//! worker slot is free) until its worker has finished with it, including
//! queueing its follow-up. A follow-up is always counted before its parent is
//! released, so the outstanding count cannot touch zero while work remains.

use crate::task::Task;
use std::future::Future;
use std::pin::pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};

/// Counts tasks that were submitted but have not finished yet
#[derive(Clone, Default)]
pub struct TaskTracker {
    inner: Arc<TrackerInner>,
}

#[derive(Default)]
struct TrackerInner {
    outstanding: AtomicUsize,
    idle: Notify,
}

/// Proof that one task is outstanding; releases it when dropped
///
/// Dropping happens on every exit path of a worker, panics included.
#[must_use = "the task stops being counted as soon as the ticket is dropped"]
pub struct TaskTicket {
    tracker: TaskTracker,
}

impl TaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one more outstanding task
    pub fn track(&self) -> TaskTicket {
        self.inner.outstanding.fetch_add(1, Ordering::AcqRel);
        TaskTicket {
            tracker: self.clone(),
        }
    }

    /// Number of tasks submitted and not yet finished
    pub fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::Acquire)
    }

    /// Waits until no task is outstanding
    ///
    /// Returns immediately when nothing was ever submitted.
    pub async fn wait_idle(&self) {
        loop {
            let mut notified = pin!(self.inner.idle.notified());
            // Register before checking so a release in between is not missed
            notified.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }

            notified.await;
        }
    }

    fn release(&self) {
        if self.inner.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}

impl Drop for TaskTicket {
    fn drop(&mut self) {
        self.tracker.release();
    }
}

/// Fixed-size pool running `work` for every task
///
/// `work` returns the follow-up task, if any. The follow-up runs on the same
/// pool and is bounded by the same number of worker slots.
pub struct WorkerPool<F> {
    work: Arc<F>,
    slots: Arc<Semaphore>,
    tracker: TaskTracker,
}

impl<F, Fut> WorkerPool<F>
where
    F: Fn(Task) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<Task>> + Send + 'static,
{
    /// Creates a pool with `workers` concurrent slots (at least one)
    pub fn new(workers: usize, work: F) -> Self {
        Self {
            work: Arc::new(work),
            slots: Arc::new(Semaphore::new(workers.max(1))),
            tracker: TaskTracker::new(),
        }
    }

    /// Submits a task, waiting while every worker slot is taken
    ///
    /// The task is counted as outstanding before waiting for a slot.
    pub async fn submit(&self, task: Task) {
        let ticket = self.tracker.track();

        let permit = match self.slots.clone().acquire_owned().await {
            Ok(permit) => permit,
            // Slots are never closed while the pool is alive
            Err(_) => return,
        };

        self.spawn_worker(task, permit, ticket);
    }

    /// Waits until every submitted task and all of their follow-ups finished
    pub async fn wait(&self) {
        self.tracker.wait_idle().await;
    }

    /// Number of tasks submitted and not yet finished
    pub fn outstanding(&self) -> usize {
        self.tracker.outstanding()
    }

    fn spawn_worker(&self, task: Task, permit: OwnedSemaphorePermit, ticket: TaskTicket) {
        let work = Arc::clone(&self.work);
        let slots = Arc::clone(&self.slots);
        let tracker = self.tracker.clone();

        tokio::spawn(async move {
            let mut task = task;
            let mut permit = permit;
            let mut ticket = ticket;

            loop {
                let follow_up = work(task).await;

                // Give the slot back before queueing the follow-up, otherwise
                // a pool full of redirecting tasks would wait on itself
                drop(permit);

                let Some(next) = follow_up else {
                    break;
                };

                tracing::trace!(url = %next.url(), depth = next.depth(), "Queueing follow-up task");

                // Count the follow-up before releasing the parent
                let next_ticket = tracker.track();
                drop(std::mem::replace(&mut ticket, next_ticket));

                permit = match slots.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => break,
                };
                task = next;
            }

            drop(ticket);
        });
    }
}
