//! Work units executed by the job queue.

use std::future::Future;

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::events::QueueEvent;
use super::types::JobId;
use crate::resilience::BoxedError;

/// Per-attempt context handed to a work unit
#[derive(Debug, Clone)]
pub struct JobContext {
    pub job_id: JobId,
    /// 1 for the first attempt, incremented on each retry
    pub attempt: u32,
    pub progress: ProgressReporter,
}

/// Publishes [`QueueEvent::Progress`] for one job
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    job_id: JobId,
    events: broadcast::Sender<QueueEvent>,
}

impl ProgressReporter {
    pub(crate) fn new(job_id: JobId, events: broadcast::Sender<QueueEvent>) -> Self {
        Self { job_id, events }
    }

    /// Report progress; `percent` is clamped to 100
    pub fn report(&self, percent: u8, message: impl Into<String>) {
        // No subscribers is not an error.
        let _ = self.events.send(QueueEvent::Progress {
            job_id: self.job_id,
            percent: percent.min(100),
            message: message.into(),
        });
    }
}

/// Asynchronous unit of work admitted to a `JobQueue`
///
/// The queue may run the same unit several times when attempts fail, so
/// implementations take `&self`.
#[async_trait]
pub trait WorkUnit<T>: Send + Sync + 'static {
    async fn run(&self, ctx: &JobContext) -> Result<T, BoxedError>;
}

#[async_trait]
impl<T, F, Fut> WorkUnit<T> for F
where
    T: Send + 'static,
    F: Fn(JobContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, BoxedError>> + Send + 'static,
{
    async fn run(&self, ctx: &JobContext) -> Result<T, BoxedError> {
        (self)(ctx.clone()).await
    }
}
