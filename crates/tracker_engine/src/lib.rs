//! Tracker engine: backend job client, polling loop and per-kind coordination.
mod client;
mod coordinator;
mod poller;
mod shared;
mod types;

pub use client::{ClientSettings, JobClient, ReqwestJobClient};
pub use coordinator::JobCoordinator;
pub use poller::{LoopExit, PollingLoop};
pub use shared::SharedTracker;
pub use types::{FailureKind, PollError, RefreshError, StartError, SubmissionError};
