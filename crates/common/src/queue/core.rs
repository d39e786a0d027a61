use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, oneshot, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::errors::{QueueError, QueueResult};
use super::events::QueueEvent;
use super::metrics::{QueueMetrics, QueueStatsSnapshot};
use super::types::{
    ItemStatus, JobId, QueueConfig, QueueConfigUpdate, QueueItem, RetryPlacement,
};
use super::work::{JobContext, ProgressReporter, WorkUnit};
use crate::error::CommonError;
use crate::resilience::{BoxedError, CircuitBreaker, Clock, SystemClock};

/// Bounded job queue with concurrency limit, pacing, retry and timeout
///
/// A background admission task keeps up to `max_concurrent` items in flight,
/// popping the backlog in FIFO order no faster than one item per
/// `inter_request_delay`. Every attempt runs through the shared
/// [`CircuitBreaker`] under the item's timeout. Failed attempts are retried
/// with exponential backoff and re-admitted according to `retry_placement`;
/// only the final outcome reaches the caller's [`JobHandle`].
///
/// ## Thread Safety
///
/// Shared state lives behind `parking_lot` locks that are never held across
/// an `.await`. Share the queue itself behind an `Arc`; dropping it stops
/// the admission task.
pub struct JobQueue<T, C: Clock = SystemClock> {
    inner: Arc<Inner<T, C>>,
    admission: Option<JoinHandle<()>>,
}

struct Inner<T, C: Clock> {
    config: RwLock<QueueConfig>,
    state: Mutex<QueueState<T>>,
    breaker: Arc<CircuitBreaker<C>>,
    metrics: QueueMetrics,
    events: broadcast::Sender<QueueEvent>,
    wakeup: Notify,
    shutdown: AtomicBool,
}

struct QueueState<T> {
    backlog: VecDeque<QueueItem<T>>,
    active: usize,
    /// Items sleeping through a retry backoff
    retrying: usize,
    last_pop: Option<Instant>,
}

enum Admission<T> {
    Idle,
    Delay(Instant),
    Abandoned(QueueItem<T>),
    Start(QueueItem<T>),
    Stop,
}

/// Read-only queue snapshot
#[derive(Debug, Clone, Serialize)]
pub struct QueueStatus {
    pub queue_length: usize,
    pub active_count: usize,
    pub retrying_count: usize,
    pub max_concurrent: usize,
    pub stats: QueueStatsSnapshot,
    /// `queue_length * (avg_process_ms + inter_request_delay) / max_concurrent`
    pub estimated_wait_ms: u64,
}

/// Completion handle returned by [`JobQueue::enqueue`]
///
/// Resolves exactly once with the job's final outcome. Dropping the handle
/// before the job starts cancels it.
#[derive(Debug)]
pub struct JobHandle<T> {
    id: JobId,
    receiver: oneshot::Receiver<QueueResult<T>>,
}

impl<T> JobHandle<T> {
    /// Id used in [`QueueEvent`]s for this job
    pub fn id(&self) -> JobId {
        self.id
    }
}

impl<T> Future for JobHandle<T> {
    type Output = QueueResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(QueueError::Closed)))
    }
}

impl<T, C> JobQueue<T, C>
where
    T: Send + 'static,
    C: Clock,
{
    /// Create a queue and start its admission task on the current runtime
    pub fn new(config: QueueConfig, breaker: Arc<CircuitBreaker<C>>) -> QueueResult<Self> {
        config.validate().map_err(QueueError::invalid_config)?;

        let runtime = Handle::try_current().map_err(|_| {
            QueueError::Common(CommonError::internal("JobQueue requires an active Tokio runtime"))
        })?;

        let (events, _) = broadcast::channel(config.event_capacity);
        info!(
            max_concurrent = config.max_concurrent,
            max_queue_size = config.max_queue_size,
            timeout_ms = config.timeout.as_millis(),
            "starting job queue"
        );

        let inner = Arc::new(Inner {
            config: RwLock::new(config),
            state: Mutex::new(QueueState {
                backlog: VecDeque::new(),
                active: 0,
                retrying: 0,
                last_pop: None,
            }),
            breaker,
            metrics: QueueMetrics::new(),
            events,
            wakeup: Notify::new(),
            shutdown: AtomicBool::new(false),
        });

        let admission = runtime.spawn(admission_loop(Arc::clone(&inner)));
        Ok(Self { inner, admission: Some(admission) })
    }

    /// Admit a unit of work
    ///
    /// Fails immediately with [`QueueError::Full`] when the backlog already
    /// holds `max_queue_size` items.
    pub fn enqueue<W>(&self, work: W) -> QueueResult<JobHandle<T>>
    where
        W: WorkUnit<T>,
    {
        let (timeout, max_retries, max_queue_size) = {
            let config = self.inner.config.read();
            (config.timeout, config.max_retries, config.max_queue_size)
        };

        let id = JobId::new();
        let (completion, receiver) = oneshot::channel();

        let queue_length = {
            let mut state = self.inner.state.lock();
            // Checked under the lock so shutdown cannot miss this item.
            if self.inner.is_shutting_down() {
                return Err(QueueError::ShuttingDown);
            }
            if state.backlog.len() >= max_queue_size {
                drop(state);
                self.inner.metrics.record_rejection();
                debug!(capacity = max_queue_size, "queue full, rejecting job");
                return Err(QueueError::Full { capacity: max_queue_size });
            }

            state.backlog.push_back(QueueItem {
                id,
                work: Arc::new(work),
                enqueued_at: Instant::now(),
                first_started_at: None,
                status: ItemStatus::Queued,
                retry_count: 0,
                max_retries,
                timeout,
                completion,
            });
            state.backlog.len()
        };

        self.inner.metrics.record_enqueue();
        self.inner.emit(QueueEvent::Queued { job_id: id, queue_length });
        self.inner.wakeup.notify_one();
        debug!(job_id = %id, queue_length, "job queued");

        Ok(JobHandle { id, receiver })
    }

    /// Admit an async closure
    pub fn enqueue_fn<F, Fut>(&self, work: F) -> QueueResult<JobHandle<T>>
    where
        F: Fn(JobContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, BoxedError>> + Send + 'static,
    {
        self.enqueue(work)
    }

    /// Read-only snapshot of backlog, in-flight work and statistics
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn status(&self) -> QueueStatus {
        let (max_concurrent, delay) = {
            let config = self.inner.config.read();
            (config.max_concurrent, config.inter_request_delay)
        };
        let (queue_length, active_count, retrying_count) = {
            let state = self.inner.state.lock();
            (state.backlog.len(), state.active, state.retrying)
        };
        let stats = self.inner.metrics.snapshot();

        let per_item_ms = stats.avg_process_ms + delay.as_secs_f64() * 1000.0;
        let estimated_wait_ms =
            (queue_length as f64 * per_item_ms / max_concurrent as f64).round() as u64;

        QueueStatus {
            queue_length,
            active_count,
            retrying_count,
            max_concurrent,
            stats,
            estimated_wait_ms,
        }
    }

    /// Current configuration
    pub fn config(&self) -> QueueConfig {
        self.inner.config.read().clone()
    }

    /// Adjust limits
    ///
    /// Timeout and retry limits apply to items admitted afterwards; items
    /// already admitted keep the values captured at admission.
    pub fn configure(&self, update: QueueConfigUpdate) -> QueueResult<()> {
        {
            let mut config = self.inner.config.write();
            let mut next = config.clone();
            update.apply_to(&mut next);
            next.validate().map_err(QueueError::invalid_config)?;
            info!(?update, "job queue reconfigured");
            *config = next;
        }
        self.inner.wakeup.notify_one();
        Ok(())
    }

    /// Reject every not-yet-started item with [`QueueError::Cleared`]
    ///
    /// In-flight and backing-off items are unaffected.
    pub fn drain(&self) -> usize {
        let count = self.inner.reject_backlog(|| QueueError::Cleared, "drained");
        self.inner.emit(QueueEvent::Cleared { count });
        info!(count, "job queue drained");
        count
    }

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.inner.events.subscribe()
    }

    /// Stop admitting work and reject the backlog with
    /// [`QueueError::ShuttingDown`]
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, AtomicOrdering::Release);
        let count = self.inner.reject_backlog(|| QueueError::ShuttingDown, "shutdown");
        self.inner.wakeup.notify_one();
        info!(rejected = count, "job queue shut down");
    }

    /// Breaker wrapping every attempt
    pub fn breaker(&self) -> &Arc<CircuitBreaker<C>> {
        &self.inner.breaker
    }
}

impl<T, C: Clock> fmt::Debug for JobQueue<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("JobQueue")
            .field("queue_length", &state.backlog.len())
            .field("active", &state.active)
            .field("shutdown", &self.inner.is_shutting_down())
            .finish_non_exhaustive()
    }
}

impl<T, C: Clock> Drop for JobQueue<T, C> {
    fn drop(&mut self) {
        if let Some(admission) = self.admission.take() {
            admission.abort();
        }
    }
}

impl<T, C: Clock> Inner<T, C> {
    fn is_shutting_down(&self) -> bool {
        self.shutdown.load(AtomicOrdering::Acquire)
    }

    fn emit(&self, event: QueueEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }
}

impl<T, C> Inner<T, C>
where
    T: Send + 'static,
    C: Clock,
{
    fn next_admission(&self) -> Admission<T> {
        if self.is_shutting_down() {
            return Admission::Stop;
        }

        let (max_concurrent, delay) = {
            let config = self.config.read();
            (config.max_concurrent, config.inter_request_delay)
        };

        let mut state = self.state.lock();
        if state.active >= max_concurrent || state.backlog.is_empty() {
            return Admission::Idle;
        }

        let now = Instant::now();
        if let Some(last_pop) = state.last_pop {
            let earliest = last_pop + delay;
            if now < earliest {
                return Admission::Delay(earliest);
            }
        }

        let Some(mut item) = state.backlog.pop_front() else {
            return Admission::Idle;
        };

        if item.is_abandoned() {
            item.status = ItemStatus::Cancelled;
            return Admission::Abandoned(item);
        }

        item.status = ItemStatus::Processing;
        state.active += 1;
        state.last_pop = Some(now);
        Admission::Start(item)
    }

    fn release_slot(&self) {
        {
            let mut state = self.state.lock();
            state.active = state.active.saturating_sub(1);
        }
        self.wakeup.notify_one();
    }

    fn reject_backlog(&self, error: impl Fn() -> QueueError, reason: &str) -> usize {
        let rejected: Vec<QueueItem<T>> = self.state.lock().backlog.drain(..).collect();
        let count = rejected.len();

        for mut item in rejected {
            item.status = ItemStatus::Cancelled;
            self.emit(QueueEvent::Cancelled { job_id: item.id, reason: reason.to_string() });
            item.resolve(Err(error()));
        }

        self.metrics.record_cancellation(count as u64);
        count
    }

    fn fail(&self, mut item: QueueItem<T>, error: QueueError) {
        let attempts = item.retry_count + 1;
        let elapsed = item.first_started_at.map_or(Duration::ZERO, |started| started.elapsed());
        self.metrics.record_failure(elapsed);
        item.status = ItemStatus::Failed;

        warn!(job_id = %item.id, attempts, error = %error, "job failed");
        self.emit(QueueEvent::Failed { job_id: item.id, attempts, error: error.to_string() });
        item.resolve(Err(error));
    }

    async fn retry_after_backoff(&self, mut item: QueueItem<T>, error: QueueError) {
        item.retry_count += 1;
        let delay = self.config.read().retry_delay(item.retry_count);

        self.metrics.record_retry();
        self.state.lock().retrying += 1;
        warn!(
            job_id = %item.id,
            retry = item.retry_count,
            delay_ms = delay.as_millis(),
            error = %error,
            "attempt failed, retrying after backoff"
        );
        self.emit(QueueEvent::Retrying {
            job_id: item.id,
            retry: item.retry_count,
            delay_ms: millis(delay),
            error: error.to_string(),
        });

        tokio::time::sleep(delay).await;

        let (placement, max_queue_size) = {
            let config = self.config.read();
            (config.retry_placement, config.max_queue_size)
        };

        let rejected = {
            let mut state = self.state.lock();
            state.retrying = state.retrying.saturating_sub(1);

            if self.is_shutting_down() {
                Some((item, QueueError::ShuttingDown))
            } else if state.backlog.len() >= max_queue_size {
                Some((item, QueueError::Full { capacity: max_queue_size }))
            } else {
                item.status = ItemStatus::Queued;
                item.enqueued_at = Instant::now();
                match placement {
                    RetryPlacement::Tail => state.backlog.push_back(item),
                    RetryPlacement::Head => state.backlog.push_front(item),
                }
                None
            }
        };

        match rejected {
            None => self.wakeup.notify_one(),
            Some((item, QueueError::ShuttingDown)) => {
                self.metrics.record_cancellation(1);
                self.emit(QueueEvent::Cancelled { job_id: item.id, reason: "shutdown".into() });
                item.resolve(Err(QueueError::ShuttingDown));
            }
            Some((item, error)) => self.fail(item, error),
        }
    }
}

async fn admission_loop<T, C>(inner: Arc<Inner<T, C>>)
where
    T: Send + 'static,
    C: Clock,
{
    loop {
        match inner.next_admission() {
            Admission::Stop => break,
            Admission::Idle => inner.wakeup.notified().await,
            Admission::Delay(until) => tokio::time::sleep_until(until).await,
            Admission::Abandoned(item) => {
                debug!(job_id = %item.id, "skipping job whose handle was dropped");
                inner.metrics.record_cancellation(1);
                inner.emit(QueueEvent::Cancelled {
                    job_id: item.id,
                    reason: "handle dropped".into(),
                });
            }
            Admission::Start(item) => {
                tokio::spawn(run_item(Arc::clone(&inner), item));
            }
        }
    }
    debug!("admission loop stopped");
}

#[instrument(skip_all, fields(job_id = %item.id, attempt = item.retry_count + 1))]
async fn run_item<T, C>(inner: Arc<Inner<T, C>>, mut item: QueueItem<T>)
where
    T: Send + 'static,
    C: Clock,
{
    let attempt = item.retry_count + 1;
    let started = Instant::now();
    let first_started = *item.first_started_at.get_or_insert(started);
    let wait = started.saturating_duration_since(item.enqueued_at);
    if attempt == 1 {
        inner.metrics.record_wait(wait);
    }
    inner.emit(QueueEvent::Started { job_id: item.id, attempt, wait_ms: millis(wait) });

    let ctx = JobContext {
        job_id: item.id,
        attempt,
        progress: ProgressReporter::new(item.id, inner.events.clone()),
    };
    let work = Arc::clone(&item.work);
    let outcome = inner
        .breaker
        .execute_with_timeout(item.timeout, move || async move { work.run(&ctx).await })
        .await;

    inner.release_slot();

    match outcome {
        Ok(value) => {
            let elapsed = first_started.elapsed();
            inner.metrics.record_completion(elapsed);
            item.status = ItemStatus::Completed;
            debug!(duration_ms = elapsed.as_millis(), "job completed");
            inner.emit(QueueEvent::Completed {
                job_id: item.id,
                attempts: attempt,
                duration_ms: millis(elapsed),
            });
            item.resolve(Ok(value));
        }
        Err(error) => {
            let error = QueueError::from_attempt(error, attempt);
            if item.retry_count < item.max_retries && !inner.is_shutting_down() {
                inner.retry_after_backoff(item, error).await;
            } else {
                inner.fail(item, error);
            }
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
