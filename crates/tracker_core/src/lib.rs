//! Tracker core: job model, progress normalization and the pure tracking state machine.
mod aggregate;
mod effect;
mod msg;
mod request;
mod settings;
mod snapshot;
mod state;
mod types;
mod update;
mod view_model;

pub use aggregate::{normalize, Anomaly};
pub use effect::Effect;
pub use msg::{Msg, PollOutcome};
pub use request::{parse_urls, JobRequest, RequestError};
pub use settings::{TrackerSettings, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT};
pub use snapshot::{GameRef, JobSnapshot, RawItemResult};
pub use state::{Generation, PollPhase, TrackerState};
pub use types::{ItemResult, ItemStatus, Job, JobHandle, JobId, JobKind, JobStatus};
pub use update::update;
pub use view_model::{Banner, ItemRowView, JobProgressView};
