use std::time::Duration;

use crate::{Anomaly, Generation, JobId, JobKind, JobStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the pending request for `kind` to the backend.
    Submit { kind: JobKind, generation: Generation },
    /// A job of this kind is still active; the start request is refused.
    RejectStart { kind: JobKind },
    /// Poll `job_id` once `delay` has elapsed.
    SchedulePoll {
        kind: JobKind,
        job_id: JobId,
        generation: Generation,
        delay: Duration,
    },
    /// Tear down whatever loop is running for `kind`.
    StopPolling { kind: JobKind },
    /// Reload the data the finished job touched.
    RefreshDataset { kind: JobKind },
    ReportAnomaly {
        kind: JobKind,
        job_id: JobId,
        anomaly: Anomaly,
    },
    /// The job reached a terminal status.
    JobFinished {
        kind: JobKind,
        job_id: JobId,
        status: JobStatus,
    },
}
