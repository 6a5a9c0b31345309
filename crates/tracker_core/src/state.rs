use std::collections::BTreeMap;

use crate::view_model::JobProgressView;
use crate::{Anomaly, Job, JobKind, TrackerSettings};

/// Monotonic per-kind marker; poll results carrying an older value are dropped.
pub type Generation = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPhase {
    /// Nothing is being polled for this kind.
    #[default]
    Idle,
    Polling,
    Terminal,
    /// Polling was aborted after a transport failure.
    TrackingLost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TrackedJob {
    pub(crate) job: Job,
    pub(crate) phase: PollPhase,
    pub(crate) generation: Generation,
    pub(crate) anomalies: Vec<Anomaly>,
    pub(crate) refresh_requested: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Slot {
    /// Submit is in flight; the kind counts as active. A finished job stays on
    /// display until the backend accepts its replacement.
    Submitting {
        generation: Generation,
        previous: Option<Box<TrackedJob>>,
    },
    Tracking(TrackedJob),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackerState {
    settings: TrackerSettings,
    slots: BTreeMap<JobKind, Slot>,
    generations: BTreeMap<JobKind, Generation>,
    dirty: bool,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: TrackerSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    /// Job shown for `kind`: the tracked one, or the finished one a pending
    /// submission would replace.
    pub fn observe(&self, kind: JobKind) -> Option<Job> {
        self.displayed(kind).map(|tracked| tracked.job.clone())
    }

    pub fn phase(&self, kind: JobKind) -> PollPhase {
        self.displayed(kind)
            .map(|tracked| tracked.phase)
            .unwrap_or_default()
    }

    pub fn anomalies(&self, kind: JobKind) -> &[Anomaly] {
        self.displayed(kind)
            .map(|tracked| tracked.anomalies.as_slice())
            .unwrap_or_default()
    }

    pub fn generation(&self, kind: JobKind) -> Generation {
        self.generations.get(&kind).copied().unwrap_or(0)
    }

    /// True while a submission is in flight or the job is still being polled.
    pub fn is_active(&self, kind: JobKind) -> bool {
        match self.slots.get(&kind) {
            Some(Slot::Submitting { .. }) => true,
            Some(Slot::Tracking(tracked)) => tracked.phase == PollPhase::Polling,
            None => false,
        }
    }

    pub fn view(&self, kind: JobKind) -> Option<JobProgressView> {
        self.displayed(kind).map(JobProgressView::from_tracked)
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn displayed(&self, kind: JobKind) -> Option<&TrackedJob> {
        match self.slots.get(&kind) {
            Some(Slot::Tracking(tracked)) => Some(tracked),
            Some(Slot::Submitting { previous, .. }) => previous.as_deref(),
            None => None,
        }
    }

    pub(crate) fn tracked_mut(&mut self, kind: JobKind) -> Option<&mut TrackedJob> {
        match self.slots.get_mut(&kind) {
            Some(Slot::Tracking(tracked)) => Some(tracked),
            _ => None,
        }
    }

    pub(crate) fn slot(&self, kind: JobKind) -> Option<&Slot> {
        self.slots.get(&kind)
    }

    pub(crate) fn slot_mut(&mut self, kind: JobKind) -> Option<&mut Slot> {
        self.slots.get_mut(&kind)
    }

    pub(crate) fn set_slot(&mut self, kind: JobKind, slot: Slot) {
        self.slots.insert(kind, slot);
        self.mark_dirty();
    }

    pub(crate) fn remove_slot(&mut self, kind: JobKind) -> Option<Slot> {
        let removed = self.slots.remove(&kind);
        if removed.is_some() {
            self.mark_dirty();
        }
        removed
    }

    /// Invalidates every outstanding result for `kind` and returns the new token.
    pub(crate) fn bump_generation(&mut self, kind: JobKind) -> Generation {
        let next = self.generation(kind) + 1;
        self.generations.insert(kind, next);
        next
    }
}
