use std::time::Duration;

/// Delay between the completion of one poll and the start of the next.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);
/// Upper bound for any single backend request issued while tracking.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSettings {
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
