use serde::Serialize;

use super::types::JobId;

/// Job lifecycle notification published on the queue's broadcast channel
///
/// Sending never blocks; slow subscribers observe `RecvError::Lagged`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum QueueEvent {
    Queued { job_id: JobId, queue_length: usize },
    Started { job_id: JobId, attempt: u32, wait_ms: u64 },
    Progress { job_id: JobId, percent: u8, message: String },
    Retrying { job_id: JobId, retry: u32, delay_ms: u64, error: String },
    Completed { job_id: JobId, attempts: u32, duration_ms: u64 },
    Failed { job_id: JobId, attempts: u32, error: String },
    Cancelled { job_id: JobId, reason: String },
    /// Backlog drained by an operator
    Cleared { count: usize },
}

impl QueueEvent {
    /// Job the event refers to, if any
    pub fn job_id(&self) -> Option<JobId> {
        match self {
            Self::Queued { job_id, .. }
            | Self::Started { job_id, .. }
            | Self::Progress { job_id, .. }
            | Self::Retrying { job_id, .. }
            | Self::Completed { job_id, .. }
            | Self::Failed { job_id, .. }
            | Self::Cancelled { job_id, .. } => Some(*job_id),
            Self::Cleared { .. } => None,
        }
    }
}
