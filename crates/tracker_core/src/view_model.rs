use crate::state::TrackedJob;
use crate::{ItemStatus, JobId, JobKind, JobStatus, PollPhase};

/// Everything a progress dialog needs to draw one tracked job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobProgressView {
    pub kind: JobKind,
    pub job_id: JobId,
    pub status: JobStatus,
    pub phase: PollPhase,
    pub headline: String,
    pub total_items: u32,
    pub completed_items: u32,
    pub failed_items: u32,
    pub percent: u8,
    pub rows: Vec<ItemRowView>,
    pub banner: Option<Banner>,
    /// Start buttons stay disabled while this is set.
    pub busy: bool,
    /// Only a clean completion closes the dialog on its own.
    pub dialog_should_close: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRowView {
    pub label: String,
    pub detail: String,
    pub status: ItemStatus,
}

/// Kept separate so "we stopped watching" never reads as "the job failed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    TrackingLost,
    ReportedFailures { failed: u32 },
}

impl Banner {
    pub fn message(&self) -> String {
        match self {
            Banner::TrackingLost => {
                "Could not check progress. The job may still be running on the server.".to_string()
            }
            Banner::ReportedFailures { failed } if *failed > 0 => {
                format!("The job reported failures: {failed} item(s) could not be processed.")
            }
            Banner::ReportedFailures { .. } => "The job reported failures.".to_string(),
        }
    }
}

impl JobProgressView {
    pub(crate) fn from_tracked(tracked: &TrackedJob) -> Self {
        let job = &tracked.job;
        let success_detail = match job.kind {
            JobKind::BulkImport => "Successfully added",
            JobKind::ReprocessAll => "Successfully reprocessed",
        };

        let rows = job
            .results
            .iter()
            .map(|result| ItemRowView {
                label: result.label.clone(),
                detail: match result.status {
                    ItemStatus::Success => success_detail.to_string(),
                    ItemStatus::Error => result.error.clone().unwrap_or_default(),
                },
                status: result.status,
            })
            .collect();

        let banner = if job.tracking_lost {
            Some(Banner::TrackingLost)
        } else if job.status == JobStatus::Failed || (job.is_terminal() && job.failed_items > 0) {
            Some(Banner::ReportedFailures {
                failed: job.failed_items,
            })
        } else {
            None
        };

        Self {
            kind: job.kind,
            job_id: job.id.clone(),
            status: job.status,
            phase: tracked.phase,
            headline: format!(
                "Processing Progress: {} / {}",
                job.processed_items(),
                job.total_items
            ),
            total_items: job.total_items,
            completed_items: job.completed_items,
            failed_items: job.failed_items,
            percent: job.progress_percent,
            rows,
            banner,
            busy: tracked.phase == PollPhase::Polling,
            dialog_should_close: job.status == JobStatus::Completed && job.failed_items == 0,
        }
    }
}
