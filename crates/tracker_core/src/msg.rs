use crate::{Generation, JobHandle, JobKind, JobSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Caller asked to start a job of this kind.
    StartRequested { kind: JobKind },
    /// Backend accepted the submission.
    Submitted {
        kind: JobKind,
        generation: Generation,
        handle: JobHandle,
    },
    /// Submission was rejected or never reached the backend.
    SubmitFailed { kind: JobKind, generation: Generation },
    /// A status poll resolved, successfully or not.
    PollCompleted {
        kind: JobKind,
        generation: Generation,
        outcome: PollOutcome,
    },
    /// Owner stopped watching this kind; the backend job is left alone.
    CancelTracking { kind: JobKind },
    /// Caller dismissed a finished job.
    Clear { kind: JobKind },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Snapshot(JobSnapshot),
    /// The status endpoint could not be reached or answered garbage.
    TransportFailed(String),
}
