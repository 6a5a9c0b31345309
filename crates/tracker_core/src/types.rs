use std::fmt;

/// Opaque identifier assigned by the backend on submission.
pub type JobId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JobKind {
    BulkImport,
    ReprocessAll,
}

impl JobKind {
    pub const ALL: [JobKind; 2] = [JobKind::BulkImport, JobKind::ReprocessAll];
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::BulkImport => write!(f, "bulk import"),
            JobKind::ReprocessAll => write!(f, "reprocess all"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Parses the backend's lowercase status string.
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(JobStatus::Pending),
            "processing" => Some(JobStatus::Processing),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Success,
    Error,
}

/// Outcome for one submitted unit (one URL, or one game being reprocessed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemResult {
    pub label: String,
    pub status: ItemStatus,
    /// Present only when `status` is `Error`.
    pub error: Option<String>,
}

impl ItemResult {
    pub fn success(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            status: ItemStatus::Success,
            error: None,
        }
    }

    pub fn error(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            status: ItemStatus::Error,
            error: Some(message.into()),
        }
    }
}

/// What `submit` hands back: the backend id plus its declared item count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub id: JobId,
    pub total_items_hint: u32,
}

/// Client-side view of one backend job, as of the latest applied poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub kind: JobKind,
    pub status: JobStatus,
    pub total_items: u32,
    pub completed_items: u32,
    pub failed_items: u32,
    pub progress_percent: u8,
    pub results: Vec<ItemResult>,
    /// Set when polling was aborted because the status endpoint became unreachable.
    pub tracking_lost: bool,
}

impl Job {
    /// The record created the instant `submit` returns.
    pub fn pending(kind: JobKind, handle: &JobHandle) -> Self {
        Self {
            id: handle.id.clone(),
            kind,
            status: JobStatus::Pending,
            total_items: handle.total_items_hint,
            completed_items: 0,
            failed_items: 0,
            progress_percent: 0,
            results: Vec::new(),
            tracking_lost: false,
        }
    }

    pub fn processed_items(&self) -> u32 {
        self.completed_items.saturating_add(self.failed_items)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
