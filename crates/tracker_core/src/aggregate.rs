use std::fmt;

use crate::{ItemResult, ItemStatus, Job, JobKind, JobSnapshot, JobStatus, RawItemResult};

/// An observed inconsistency. Logged and kept on the tracked job, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    UnknownStatus { raw: String },
    UnknownItemStatus { index: usize, raw: String },
    ProgressRegressed { previous: u8, current: u8 },
    CountsExceedTotal { completed: u32, failed: u32, total: u32 },
    ResultCountMismatch { results: usize, accounted: u32 },
    CompletedNotAccounted { completed: u32, failed: u32, total: u32 },
    PollFailed { message: String },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::UnknownStatus { raw } => {
                write!(f, "unknown job status {raw:?}, treated as still running")
            }
            Anomaly::UnknownItemStatus { index, raw } => {
                write!(f, "unknown status {raw:?} for result #{index}, treated as error")
            }
            Anomaly::ProgressRegressed { previous, current } => {
                write!(f, "progress went backwards from {previous}% to {current}%")
            }
            Anomaly::CountsExceedTotal {
                completed,
                failed,
                total,
            } => write!(
                f,
                "completed {completed} + failed {failed} exceeds total {total}"
            ),
            Anomaly::ResultCountMismatch { results, accounted } => write!(
                f,
                "{results} results listed but {accounted} items accounted for"
            ),
            Anomaly::CompletedNotAccounted {
                completed,
                failed,
                total,
            } => write!(
                f,
                "job completed with {completed} + {failed} of {total} items accounted for"
            ),
            Anomaly::PollFailed { message } => write!(f, "lost track of job: {message}"),
        }
    }
}

/// Turns a raw status payload into the client's job view.
///
/// The latest payload is taken as the full current state; nothing is carried
/// over from earlier polls. Cross-poll checks such as progress regression are
/// the tracker's job.
pub fn normalize(id: &str, kind: JobKind, snapshot: &JobSnapshot) -> (Job, Vec<Anomaly>) {
    let mut anomalies = Vec::new();

    let status = match JobStatus::from_wire(&snapshot.status) {
        Some(status) => status,
        None => {
            anomalies.push(Anomaly::UnknownStatus {
                raw: snapshot.status.clone(),
            });
            JobStatus::Processing
        }
    };

    let total = snapshot.total_items;
    let completed = snapshot.completed_items;
    let failed = snapshot.failed_items;
    let accounted = completed.saturating_add(failed);

    if accounted > total {
        anomalies.push(Anomaly::CountsExceedTotal {
            completed,
            failed,
            total,
        });
    }
    if status == JobStatus::Completed && accounted != total {
        anomalies.push(Anomaly::CompletedNotAccounted {
            completed,
            failed,
            total,
        });
    }
    if snapshot.results.len() != accounted as usize {
        anomalies.push(Anomaly::ResultCountMismatch {
            results: snapshot.results.len(),
            accounted,
        });
    }

    let progress_percent = match snapshot.progress {
        Some(raw) => raw.clamp(0, 100) as u8,
        None => derive_percent(accounted, total),
    };

    let results = snapshot
        .results
        .iter()
        .enumerate()
        .map(|(index, raw)| classify_item(index, raw, &mut anomalies))
        .collect();

    let job = Job {
        id: id.to_string(),
        kind,
        status,
        total_items: total,
        completed_items: completed,
        failed_items: failed,
        progress_percent,
        results,
        tracking_lost: false,
    };
    (job, anomalies)
}

fn derive_percent(accounted: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let accounted = u64::from(accounted);
    let total = u64::from(total);
    let rounded = (accounted * 100 + total / 2) / total;
    rounded.min(100) as u8
}

fn classify_item(index: usize, raw: &RawItemResult, anomalies: &mut Vec<Anomaly>) -> ItemResult {
    let label = item_label(index, raw);
    match raw.status.trim().to_ascii_lowercase().as_str() {
        "success" => ItemResult::success(label),
        "failed" | "error" => ItemResult::error(
            label,
            raw.error.clone().unwrap_or_else(|| "unknown error".to_string()),
        ),
        _ => {
            anomalies.push(Anomaly::UnknownItemStatus {
                index,
                raw: raw.status.clone(),
            });
            let message = raw
                .error
                .clone()
                .unwrap_or_else(|| format!("unrecognised status {:?}", raw.status));
            ItemResult::error(label, message)
        }
    }
}

/// Prefers the parsed matchup over the raw input.
fn item_label(index: usize, raw: &RawItemResult) -> String {
    let non_empty = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(ToOwned::to_owned)
    };
    non_empty(&raw.matchup)
        .or_else(|| non_empty(&raw.url))
        .or_else(|| raw.game_id.as_ref().map(|id| format!("game {id}")))
        .unwrap_or_else(|| format!("item #{}", index + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_percent_rounds_half_up() {
        assert_eq!(derive_percent(1, 3), 33);
        assert_eq!(derive_percent(2, 3), 67);
        assert_eq!(derive_percent(1, 8), 13);
        assert_eq!(derive_percent(0, 0), 0);
        assert_eq!(derive_percent(5, 4), 100);
    }

    #[test]
    fn label_falls_back_through_identifiers() {
        let mut raw = RawItemResult {
            url: Some("https://x.example.com/g1".into()),
            matchup: Some("  ".into()),
            status: "success".into(),
            ..RawItemResult::default()
        };
        assert_eq!(item_label(0, &raw), "https://x.example.com/g1");

        raw.url = None;
        raw.game_id = Some(crate::GameRef::Number(42));
        assert_eq!(item_label(0, &raw), "game 42");

        raw.game_id = None;
        assert_eq!(item_label(4, &raw), "item #5");
    }
}
