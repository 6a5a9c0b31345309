use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracker_core::{
    Anomaly, Effect, Generation, Job, JobHandle, JobId, JobKind, JobProgressView, JobRequest, Msg,
    PollPhase, TrackerSettings, TrackerState,
};
use tracker_logging::{tracker_info, tracker_warn};

use crate::{
    FailureKind, JobClient, LoopExit, PollingLoop, SharedTracker, StartError, SubmissionError,
};

struct LoopHandle {
    generation: Generation,
    cancel: CancellationToken,
    task: JoinHandle<LoopExit>,
}

/// Runs at most one tracked job per kind and exposes its progress to the UI.
///
/// Must be used from within a tokio runtime; polling loops are spawned tasks.
pub struct JobCoordinator {
    client: Arc<dyn JobClient>,
    tracker: SharedTracker,
    settings: TrackerSettings,
    loops: Mutex<BTreeMap<JobKind, LoopHandle>>,
}

impl JobCoordinator {
    pub fn new(client: Arc<dyn JobClient>, settings: TrackerSettings) -> Self {
        Self {
            client,
            tracker: SharedTracker::new(TrackerState::with_settings(settings)),
            settings,
            loops: Mutex::new(BTreeMap::new()),
        }
    }

    /// Submits a job of `kind` and starts polling it.
    ///
    /// Fails fast with [`StartError::AlreadyRunning`] while another job of the
    /// same kind is being submitted or polled.
    pub async fn start(&self, kind: JobKind, payload: &str) -> Result<JobId, StartError> {
        let generation = match self
            .tracker
            .dispatch(Msg::StartRequested { kind })
            .as_slice()
        {
            [Effect::Submit { generation, .. }] => *generation,
            _ => return Err(StartError::AlreadyRunning { kind }),
        };

        let handle = match self.submit(kind, payload).await {
            Ok(handle) => handle,
            Err(err) => {
                tracker_warn!("{} submission failed: {}", kind, err);
                self.tracker.dispatch(Msg::SubmitFailed { kind, generation });
                return Err(err.into());
            }
        };
        tracker_info!(
            "{} job {} accepted with {} item(s)",
            kind,
            handle.id,
            handle.total_items_hint
        );

        let job_id = handle.id.clone();
        let effects = self.tracker.dispatch(Msg::Submitted {
            kind,
            generation,
            handle,
        });
        for effect in effects {
            if let Effect::SchedulePoll {
                kind,
                job_id,
                generation,
                delay,
            } = effect
            {
                self.spawn_loop(kind, job_id.clone(), generation, delay);
                return Ok(job_id);
            }
        }

        tracker_warn!(
            "{} job {} was accepted after tracking was cancelled; not tracking it",
            kind,
            job_id
        );
        Err(StartError::Cancelled { kind, job_id })
    }

    /// Latest known job for `kind`. Cheap and side-effect free.
    pub fn observe(&self, kind: JobKind) -> Option<Job> {
        self.tracker.with(|state| state.observe(kind))
    }

    pub fn view(&self, kind: JobKind) -> Option<JobProgressView> {
        self.tracker.with(|state| state.view(kind))
    }

    pub fn phase(&self, kind: JobKind) -> PollPhase {
        self.tracker.with(|state| state.phase(kind))
    }

    pub fn anomalies(&self, kind: JobKind) -> Vec<Anomaly> {
        self.tracker.with(|state| state.anomalies(kind).to_vec())
    }

    /// True if anything observable changed since the last call.
    pub fn take_changed(&self) -> bool {
        self.tracker.consume_dirty()
    }

    /// Stops watching `kind` and forgets its job. The backend job keeps running.
    pub fn cancel_tracking(&self, kind: JobKind) -> bool {
        let effects = self.tracker.dispatch(Msg::CancelTracking { kind });
        let stopped = effects
            .iter()
            .any(|effect| matches!(effect, Effect::StopPolling { kind: k } if *k == kind));
        if stopped {
            if let Some(handle) = self.loops().remove(&kind) {
                handle.cancel.cancel();
            }
            tracker_info!("stopped tracking {} job", kind);
        }
        stopped
    }

    /// Dismisses a terminal or tracking-lost job.
    pub fn clear(&self, kind: JobKind) -> bool {
        let had_job = self.observe(kind).is_some();
        self.tracker.dispatch(Msg::Clear { kind });
        had_job && self.observe(kind).is_none()
    }

    /// Waits for the current polling loop of `kind` to stop.
    ///
    /// Returns `None` when no loop was started or it was already awaited.
    pub async fn wait_settled(&self, kind: JobKind) -> Option<LoopExit> {
        let handle = self.loops().remove(&kind)?;
        match handle.task.await {
            Ok(exit) => Some(exit),
            Err(err) if err.is_cancelled() => Some(LoopExit::Cancelled),
            Err(err) => {
                tracker_warn!(
                    "{} polling loop (generation {}) ended abnormally: {}",
                    kind,
                    handle.generation,
                    err
                );
                Some(LoopExit::Superseded)
            }
        }
    }

    async fn submit(&self, kind: JobKind, payload: &str) -> Result<JobHandle, SubmissionError> {
        let request = JobRequest::new(kind, payload)?;
        match tokio::time::timeout(self.settings.request_timeout, self.client.submit(&request))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(SubmissionError::new(
                FailureKind::Timeout,
                format!("no response within {:?}", self.settings.request_timeout),
            )),
        }
    }

    fn spawn_loop(
        &self,
        kind: JobKind,
        job_id: JobId,
        generation: Generation,
        first_delay: Duration,
    ) {
        let polling = PollingLoop::new(
            self.client.clone(),
            self.tracker.clone(),
            self.settings.request_timeout,
        );
        let cancel = polling.cancel_token();
        let task = tokio::spawn(polling.run(kind, job_id, generation, first_delay));

        let previous = self.loops().insert(
            kind,
            LoopHandle {
                generation,
                cancel,
                task,
            },
        );
        if let Some(previous) = previous {
            previous.cancel.cancel();
        }
    }

    fn loops(&self) -> MutexGuard<'_, BTreeMap<JobKind, LoopHandle>> {
        self.loops.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for JobCoordinator {
    fn drop(&mut self) {
        for handle in self.loops().values() {
            handle.cancel.cancel();
        }
    }
}
