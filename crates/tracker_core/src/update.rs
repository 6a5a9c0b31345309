use std::time::Duration;

use crate::state::{Slot, TrackedJob};
use crate::{
    normalize, Anomaly, Effect, Generation, Job, JobHandle, JobKind, JobSnapshot, Msg, PollOutcome,
    PollPhase, TrackerState,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: TrackerState, msg: Msg) -> (TrackerState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartRequested { kind } => {
            if state.is_active(kind) {
                vec![Effect::RejectStart { kind }]
            } else {
                let generation = state.bump_generation(kind);
                let previous = match state.remove_slot(kind) {
                    Some(Slot::Tracking(finished)) => Some(Box::new(finished)),
                    _ => None,
                };
                state.set_slot(
                    kind,
                    Slot::Submitting {
                        generation,
                        previous,
                    },
                );
                vec![Effect::Submit { kind, generation }]
            }
        }
        Msg::Submitted {
            kind,
            generation,
            handle,
        } => on_submitted(&mut state, kind, generation, handle),
        Msg::SubmitFailed { kind, generation } => {
            if matches!(
                state.slot(kind),
                Some(Slot::Submitting { generation: current, .. }) if *current == generation
            ) {
                // The rejected start leaves the finished job it would have replaced.
                if let Some(Slot::Submitting {
                    previous: Some(previous),
                    ..
                }) = state.remove_slot(kind)
                {
                    state.set_slot(kind, Slot::Tracking(*previous));
                }
            }
            Vec::new()
        }
        Msg::PollCompleted {
            kind,
            generation,
            outcome,
        } => on_poll_completed(&mut state, kind, generation, outcome),
        Msg::CancelTracking { kind } => {
            if state.remove_slot(kind).is_some() {
                state.bump_generation(kind);
                vec![Effect::StopPolling { kind }]
            } else {
                Vec::new()
            }
        }
        Msg::Clear { kind } => {
            let dropped_previous = match state.slot_mut(kind) {
                Some(Slot::Submitting { previous, .. }) => previous.take().is_some(),
                _ => false,
            };
            let finished = matches!(
                state.slot(kind),
                Some(Slot::Tracking(tracked))
                    if matches!(tracked.phase, PollPhase::Terminal | PollPhase::TrackingLost)
            );
            if dropped_previous {
                state.mark_dirty();
            } else if finished {
                state.remove_slot(kind);
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn on_submitted(
    state: &mut TrackerState,
    kind: JobKind,
    generation: Generation,
    handle: JobHandle,
) -> Vec<Effect> {
    let expected = matches!(
        state.slot(kind),
        Some(Slot::Submitting { generation: current, .. }) if *current == generation
    );
    if !expected {
        return Vec::new();
    }

    let job_id = handle.id.clone();
    state.set_slot(
        kind,
        Slot::Tracking(TrackedJob {
            job: Job::pending(kind, &handle),
            phase: PollPhase::Polling,
            generation,
            anomalies: Vec::new(),
            refresh_requested: false,
        }),
    );
    vec![Effect::SchedulePoll {
        kind,
        job_id,
        generation,
        delay: Duration::ZERO,
    }]
}

fn on_poll_completed(
    state: &mut TrackerState,
    kind: JobKind,
    generation: Generation,
    outcome: PollOutcome,
) -> Vec<Effect> {
    let poll_interval = state.settings().poll_interval;
    let Some(tracked) = state.tracked_mut(kind) else {
        return Vec::new();
    };
    if tracked.generation != generation || tracked.phase != PollPhase::Polling {
        return Vec::new();
    }

    let effects = match outcome {
        PollOutcome::TransportFailed(message) => {
            // Keep the last known snapshot; only observation stopped.
            tracked.job.tracking_lost = true;
            tracked.phase = PollPhase::TrackingLost;
            let anomaly = Anomaly::PollFailed { message };
            tracked.anomalies.push(anomaly.clone());
            vec![Effect::ReportAnomaly {
                kind,
                job_id: tracked.job.id.clone(),
                anomaly,
            }]
        }
        PollOutcome::Snapshot(snapshot) => apply_snapshot(tracked, &snapshot, poll_interval),
    };
    state.mark_dirty();
    effects
}

fn apply_snapshot(
    tracked: &mut TrackedJob,
    snapshot: &JobSnapshot,
    poll_interval: Duration,
) -> Vec<Effect> {
    let kind = tracked.job.kind;
    let (job, mut anomalies) = normalize(&tracked.job.id, kind, snapshot);

    let previous = tracked.job.progress_percent;
    if job.progress_percent < previous {
        anomalies.push(Anomaly::ProgressRegressed {
            previous,
            current: job.progress_percent,
        });
    }

    let mut effects = Vec::with_capacity(anomalies.len() + 2);
    for anomaly in anomalies {
        effects.push(Effect::ReportAnomaly {
            kind,
            job_id: job.id.clone(),
            anomaly: anomaly.clone(),
        });
        tracked.anomalies.push(anomaly);
    }

    let status = job.status;
    let job_id = job.id.clone();
    tracked.job = job;

    if status.is_terminal() {
        tracked.phase = PollPhase::Terminal;
        effects.push(Effect::JobFinished {
            kind,
            job_id,
            status,
        });
        // Failed jobs refresh too; partial imports land in the dataset.
        if !tracked.refresh_requested {
            tracked.refresh_requested = true;
            effects.push(Effect::RefreshDataset { kind });
        }
    } else {
        effects.push(Effect::SchedulePoll {
            kind,
            job_id,
            generation: tracked.generation,
            delay: poll_interval,
        });
    }
    effects
}
