use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracker_core::{Anomaly, Effect, Generation, JobId, JobKind, Msg, PollOutcome};
use tracker_logging::{tracker_debug, tracker_error, tracker_info, tracker_warn};

use crate::{FailureKind, JobClient, PollError, SharedTracker};

/// Why a polling loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The job reached Completed or Failed.
    Terminal,
    /// A poll failed; the last known state stays on display.
    TrackingLost,
    /// The owner cancelled the loop.
    Cancelled,
    /// The tracker no longer accepts results from this loop's generation.
    Superseded,
}

/// Polls one job until it is terminal, tracking is lost or the loop is cancelled.
///
/// Each poll starts only after the previous one resolved plus the scheduled
/// delay, so results are applied in the order the requests were issued.
pub struct PollingLoop {
    client: Arc<dyn JobClient>,
    tracker: SharedTracker,
    request_timeout: Duration,
    cancel: CancellationToken,
}

impl PollingLoop {
    pub fn new(client: Arc<dyn JobClient>, tracker: SharedTracker, request_timeout: Duration) -> Self {
        Self {
            client,
            tracker,
            request_timeout,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops this loop at its next suspension point.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run(
        self,
        kind: JobKind,
        job_id: JobId,
        generation: Generation,
        first_delay: Duration,
    ) -> LoopExit {
        let mut next_delay = Some(first_delay);
        let mut exit = LoopExit::Superseded;

        while let Some(delay) = next_delay.take() {
            if !delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => return LoopExit::Cancelled,
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return LoopExit::Cancelled,
                outcome = self.poll_once(&job_id) => outcome,
            };

            let effects = self.tracker.dispatch(Msg::PollCompleted {
                kind,
                generation,
                outcome,
            });
            if effects.is_empty() {
                tracker_debug!("poll result for {} job {} discarded as stale", kind, job_id);
                return LoopExit::Superseded;
            }

            for effect in effects {
                match effect {
                    Effect::SchedulePoll {
                        generation: scheduled,
                        delay,
                        ..
                    } if scheduled == generation => next_delay = Some(delay),
                    Effect::RefreshDataset { kind } => self.refresh(kind).await,
                    Effect::JobFinished {
                        kind,
                        job_id,
                        status,
                    } => {
                        tracker_info!("{} job {} finished: {}", kind, job_id, status);
                        exit = LoopExit::Terminal;
                    }
                    Effect::ReportAnomaly {
                        kind,
                        job_id,
                        anomaly: anomaly @ Anomaly::PollFailed { .. },
                    } => {
                        tracker_error!("{} job {}: {}", kind, job_id, anomaly);
                        exit = LoopExit::TrackingLost;
                    }
                    Effect::ReportAnomaly {
                        kind,
                        job_id,
                        anomaly,
                    } => {
                        tracker_warn!("{} job {} anomaly: {}", kind, job_id, anomaly);
                    }
                    other => {
                        tracker_debug!("polling loop ignoring effect {:?}", other);
                    }
                }
            }
        }

        exit
    }

    async fn poll_once(&self, job_id: &str) -> PollOutcome {
        tracker_debug!("polling job {}", job_id);
        let result = match tokio::time::timeout(self.request_timeout, self.client.get_status(job_id))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(PollError::new(
                FailureKind::Timeout,
                format!("no response within {:?}", self.request_timeout),
            )),
        };
        match result {
            Ok(snapshot) => PollOutcome::Snapshot(snapshot),
            Err(err) => PollOutcome::TransportFailed(err.to_string()),
        }
    }

    async fn refresh(&self, kind: JobKind) {
        match tokio::time::timeout(self.request_timeout, self.client.refresh_dataset(kind)).await {
            Ok(Ok(())) => tracker_info!("dataset refreshed after {} job", kind),
            Ok(Err(err)) => tracker_warn!("{}", err),
            Err(_) => tracker_warn!(
                "dataset refresh after {} job timed out after {:?}",
                kind,
                self.request_timeout
            ),
        }
    }
}
