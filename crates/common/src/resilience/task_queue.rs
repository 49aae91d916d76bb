//! Rate-limited FIFO task queue
//!
//! Every unit of work submitted to a [`RateLimitedQueue`] runs on a single
//! drain loop, one task at a time, in submission order. Consecutive task
//! starts are separated by at least the configured spacing; the first task
//! of an idle queue starts immediately.
//!
//! A failing (or panicking) task never stops the loop: its outcome is
//! delivered to its own [`TaskHandle`] only, and the next task proceeds.
//!
//! # Examples
//!
//! ```rust
//! use std::time::Duration;
//!
//! use larkexport_common::resilience::RateLimitedQueue;
//!
//! # async fn example() {
//! let queue = RateLimitedQueue::new(Duration::from_millis(25));
//!
//! let first = queue.submit(|| async { Ok::<_, String>(1) });
//! let second = queue.submit(|| async { Ok::<_, String>(2) });
//!
//! assert_eq!(first.await, Ok(1));
//! assert_eq!(second.await, Ok(2));
//! # }
//! ```

use std::collections::VecDeque;
use std::fmt::{self, Display};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

type Job = BoxFuture<'static, ()>;

/// Failure observed through a [`TaskHandle`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueueError<E> {
    /// The task ran and returned an error.
    #[error("{0}")]
    Task(E),

    /// The task never delivered a result (it panicked, or the runtime shut
    /// down before it ran).
    #[error("queued task was dropped before it completed")]
    Aborted,
}

impl<E> QueueError<E> {
    /// Collapse into the task's own error type, building one for
    /// [`QueueError::Aborted`].
    pub fn into_task_error(self, aborted: impl FnOnce() -> E) -> E {
        match self {
            Self::Task(err) => err,
            Self::Aborted => aborted(),
        }
    }
}

struct QueueState {
    pending: VecDeque<Job>,
    draining: bool,
    last_started: Option<Instant>,
}

/// Single-flight FIFO queue that paces task starts.
///
/// Each queue owns its own pending list and draining flag, so independent
/// instances never share pacing state.
pub struct RateLimitedQueue {
    state: Arc<Mutex<QueueState>>,
    spacing: Duration,
}

impl RateLimitedQueue {
    /// Create a queue that keeps at least `spacing` between task starts.
    pub fn new(spacing: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState {
                pending: VecDeque::new(),
                draining: false,
                last_started: None,
            })),
            spacing,
        }
    }

    /// Create a queue from a requests-per-second budget (40 rps => 25 ms).
    ///
    /// A budget of zero is treated as one request per second.
    pub fn from_rate(requests_per_second: u32) -> Self {
        let per_second = u64::from(requests_per_second.max(1));
        Self::new(Duration::from_micros(1_000_000 / per_second))
    }

    /// Minimum spacing between consecutive task starts.
    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    /// Number of tasks waiting to start.
    pub fn pending(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Whether a drain loop is currently active.
    pub fn is_draining(&self) -> bool {
        self.state.lock().draining
    }

    /// Append a task to the tail of the queue.
    ///
    /// The task runs even if the returned handle is never awaited. Starts a
    /// drain loop on the current Tokio runtime when none is active, so this
    /// must be called from within a runtime.
    pub fn submit<F, Fut, T, E>(&self, task: F) -> TaskHandle<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Display + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();

        let job: Job = async move {
            match AssertUnwindSafe(async move { task().await }).catch_unwind().await {
                Ok(outcome) => {
                    if let Err(err) = &outcome {
                        warn!(error = %err, "queued task failed");
                    }
                    if sender.send(outcome).is_err() {
                        debug!("task handle dropped before its result was delivered");
                    }
                }
                Err(_) => error!("queued task panicked; continuing with remaining tasks"),
            }
        }
        .boxed();

        let start_drain = {
            let mut state = self.state.lock();
            state.pending.push_back(job);
            !std::mem::replace(&mut state.draining, true)
        };

        if start_drain {
            tokio::spawn(drain(Arc::clone(&self.state), self.spacing));
        }

        TaskHandle { receiver }
    }
}

impl fmt::Debug for RateLimitedQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RateLimitedQueue")
            .field("spacing", &self.spacing)
            .field("pending", &state.pending.len())
            .field("draining", &state.draining)
            .finish()
    }
}

/// Clears the draining flag if the drain loop is dropped before it empties
/// the queue (runtime shutdown), so a later submit can start a new loop.
struct DrainGuard {
    state: Arc<Mutex<QueueState>>,
    finished: bool,
}

impl Drop for DrainGuard {
    fn drop(&mut self) {
        if !self.finished {
            warn!("rate limit queue drain dropped before completion");
            self.state.lock().draining = false;
        }
    }
}

async fn drain(state: Arc<Mutex<QueueState>>, spacing: Duration) {
    let pending = state.lock().pending.len();
    info!(pending, "rate limit queue processing started");
    let mut drain_guard = DrainGuard { state: Arc::clone(&state), finished: false };

    loop {
        let (job, ready_at) = {
            let mut guard = state.lock();
            let Some(job) = guard.pending.pop_front() else {
                guard.draining = false;
                // the flag now belongs to whichever drain a later submit starts
                drain_guard.finished = true;
                break;
            };
            (job, guard.last_started.map(|started| started + spacing))
        };

        // A fresh drain may begin right after the previous one finished.
        if let Some(ready_at) = ready_at {
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }

        state.lock().last_started = Some(Instant::now());
        job.await;

        let more = !state.lock().pending.is_empty();
        if more {
            tokio::time::sleep(spacing).await;
        }
    }

    info!("rate limit queue processing finished");
}

/// Completion handle for a submitted task.
#[must_use = "dropping a TaskHandle discards the task's result"]
pub struct TaskHandle<T, E> {
    receiver: oneshot::Receiver<Result<T, E>>,
}

impl<T, E> Future for TaskHandle<T, E> {
    type Output = Result<T, QueueError<E>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(cx).map(|received| match received {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(QueueError::Task(err)),
            Err(_) => Err(QueueError::Aborted),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    const SPACING: Duration = Duration::from_millis(25);

    type StartLog = Arc<Mutex<Vec<(usize, Instant)>>>;

    fn recording_task(
        index: usize,
        log: StartLog,
        work: Duration,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<usize, String>> {
        move || {
            async move {
                log.lock().push((index, Instant::now()));
                tokio::time::sleep(work).await;
                Ok(index)
            }
            .boxed()
        }
    }

    #[test]
    fn from_rate_derives_spacing() {
        assert_eq!(RateLimitedQueue::from_rate(40).spacing(), Duration::from_millis(25));
        assert_eq!(RateLimitedQueue::from_rate(0).spacing(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn starts_tasks_in_submission_order_with_minimum_spacing() {
        let queue = RateLimitedQueue::new(SPACING);
        let log: StartLog = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..5)
            .map(|i| queue.submit(recording_task(i, Arc::clone(&log), Duration::from_millis(3))))
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await, Ok(i));
        }

        let starts = log.lock().clone();
        let order: Vec<usize> = starts.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
        for pair in starts.windows(2) {
            assert!(pair[1].1.duration_since(pair[0].1) >= SPACING);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_task_starts_immediately() {
        let queue = RateLimitedQueue::new(SPACING);
        let log: StartLog = Arc::new(Mutex::new(Vec::new()));
        let submitted_at = Instant::now();

        queue.submit(recording_task(0, Arc::clone(&log), Duration::ZERO)).await.unwrap();

        let started_at = log.lock()[0].1;
        assert!(started_at.duration_since(submitted_at) < SPACING);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_task_does_not_block_the_rest() {
        let queue = RateLimitedQueue::new(SPACING);
        let ran = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..3)
            .map(|i| {
                let ran = Arc::clone(&ran);
                queue.submit(move || async move {
                    ran.fetch_add(1, Ordering::SeqCst);
                    if i == 1 {
                        Err(format!("task {i} failed"))
                    } else {
                        Ok(i)
                    }
                })
            })
            .collect();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await);
        }

        assert_eq!(results[0], Ok(0));
        assert_eq!(results[1], Err(QueueError::Task("task 1 failed".to_string())));
        assert_eq!(results[2], Ok(2));
        assert_eq!(ran.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_task_is_isolated() {
        let queue = RateLimitedQueue::new(SPACING);

        let panicking = queue.submit(|| async {
            if true {
                panic!("boom");
            }
            Ok::<u32, String>(0)
        });
        let healthy = queue.submit(|| async { Ok::<u32, String>(7) });

        assert_eq!(panicking.await, Err(QueueError::Aborted));
        assert_eq!(healthy.await, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn never_runs_two_tasks_at_once() {
        let queue = RateLimitedQueue::new(SPACING);
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                queue.submit(move || async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(40)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, String>(())
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn spacing_holds_across_separate_drains() {
        let queue = RateLimitedQueue::new(SPACING);
        let log: StartLog = Arc::new(Mutex::new(Vec::new()));

        queue.submit(recording_task(0, Arc::clone(&log), Duration::ZERO)).await.unwrap();
        queue.submit(recording_task(1, Arc::clone(&log), Duration::ZERO)).await.unwrap();

        let starts = log.lock().clone();
        assert!(starts[1].1.duration_since(starts[0].1) >= SPACING);
    }

    #[tokio::test(start_paused = true)]
    async fn draining_flag_clears_once_empty() {
        let queue = RateLimitedQueue::new(SPACING);

        let first = queue.submit(|| async { Ok::<_, String>(1) });
        let second = queue.submit(|| async { Ok::<_, String>(2) });
        assert!(queue.is_draining());

        first.await.unwrap();
        second.await.unwrap();
        tokio::time::sleep(SPACING * 2).await;

        assert!(!queue.is_draining());
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn into_task_error_maps_aborted() {
        let aborted: QueueError<String> = QueueError::Aborted;
        assert_eq!(aborted.into_task_error(|| "dropped".to_string()), "dropped");

        let failed = QueueError::Task("bad".to_string());
        assert_eq!(failed.into_task_error(|| "dropped".to_string()), "bad");
    }

    #[test]
    fn dropped_drain_does_not_wedge_the_queue() {
        let queue = RateLimitedQueue::new(SPACING);

        let first = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
        let stalled = first.block_on(async {
            let handle = queue.submit(|| async {
                tokio::time::sleep(Duration::from_secs(3_600)).await;
                Ok::<_, String>(0)
            });
            tokio::task::yield_now().await;
            handle
        });
        assert!(queue.is_draining());
        drop(first);
        assert!(!queue.is_draining());

        let second = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
        let (stalled, next) = second.block_on(async {
            let next = queue.submit(|| async { Ok::<_, String>(1) });
            (stalled.await, next.await)
        });

        assert_eq!(stalled, Err(QueueError::Aborted));
        assert_eq!(next, Ok(1));
    }
}
