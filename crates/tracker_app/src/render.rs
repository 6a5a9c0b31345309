use tracker_core::{ItemRowView, ItemStatus, JobProgressView, JobStatus, PollPhase};

const BAR_WIDTH: usize = 30;

/// Status block for a job: headline, bar, then any banner.
pub fn render_status(view: &JobProgressView) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!(
        "{} ({}) | {}",
        view.headline,
        view.kind,
        status_label(view)
    ));
    lines.push(format!(
        "[{}] {:>3}%",
        progress_bar(view.percent, BAR_WIDTH),
        view.percent
    ));
    if let Some(banner) = view.banner {
        lines.push(format!("! {}", banner.message()));
    }

    lines
}

pub fn render_rows(view: &JobProgressView) -> Vec<String> {
    view.rows
        .iter()
        .enumerate()
        .map(|(index, row)| format_row(index + 1, row))
        .collect()
}

/// What to print after a poll, given the rows already on screen.
#[derive(Debug, PartialEq, Eq)]
pub enum RowUpdate<'a> {
    /// Earlier rows are unchanged; only these are new.
    Append(&'a [String]),
    /// The backend replaced earlier rows, so the whole list goes out again.
    Reprint(&'a [String]),
}

pub fn row_update<'a>(rows: &'a [String], printed: &[String]) -> RowUpdate<'a> {
    if rows.starts_with(printed) {
        RowUpdate::Append(&rows[printed.len()..])
    } else {
        RowUpdate::Reprint(rows)
    }
}

/// Totals come from the job counters, which cover items the results list may omit.
pub fn summary_line(view: &JobProgressView) -> String {
    match view.phase {
        PollPhase::TrackingLost => format!(
            "Stopped tracking job {} at {}%. Check the dashboard later.",
            view.job_id, view.percent
        ),
        _ => format!(
            "Job {} {}: {} succeeded, {} failed.",
            view.job_id,
            view.status,
            view.completed_items,
            view.failed_items
        ),
    }
}

fn format_row(number: usize, row: &ItemRowView) -> String {
    let marker = match row.status {
        ItemStatus::Success => "OK",
        ItemStatus::Error => "ERR",
    };
    if row.detail.is_empty() {
        format!("  {number:>3}. {marker:<3} {}", row.label)
    } else {
        format!("  {number:>3}. {marker:<3} {} ({})", row.label, row.detail)
    }
}

fn status_label(view: &JobProgressView) -> &'static str {
    match (view.phase, view.status) {
        (PollPhase::TrackingLost, _) => "Tracking lost",
        (_, JobStatus::Pending) => "Pending",
        (_, JobStatus::Processing) => "Processing",
        (_, JobStatus::Completed) => "Completed",
        (_, JobStatus::Failed) => "Failed",
    }
}

fn progress_bar(percent: u8, width: usize) -> String {
    let filled = (usize::from(percent.min(100)) * width) / 100;
    let mut bar = "#".repeat(filled);
    bar.push_str(&"-".repeat(width - filled));
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::{Banner, JobKind};

    fn view(status: JobStatus, phase: PollPhase, percent: u8) -> JobProgressView {
        JobProgressView {
            kind: JobKind::BulkImport,
            job_id: "abc".to_string(),
            status,
            phase,
            headline: "Processing Progress: 1 / 2".to_string(),
            total_items: 2,
            completed_items: 1,
            failed_items: 1,
            percent,
            rows: vec![
                ItemRowView {
                    label: "EDM @ CGY".to_string(),
                    detail: "Successfully added".to_string(),
                    status: ItemStatus::Success,
                },
                ItemRowView {
                    label: "https://x.example.com/2".to_string(),
                    detail: "404 Not Found".to_string(),
                    status: ItemStatus::Error,
                },
            ],
            banner: None,
            busy: phase == PollPhase::Polling,
            dialog_should_close: false,
        }
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0, 10), "----------");
        assert_eq!(progress_bar(50, 10), "#####-----");
        assert_eq!(progress_bar(100, 10), "##########");
        assert_eq!(progress_bar(250, 10), "##########");
    }

    #[test]
    fn status_block_shows_headline_and_banner() {
        let mut progress = view(JobStatus::Processing, PollPhase::Polling, 50);
        let lines = render_status(&progress);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Processing Progress: 1 / 2 (bulk import)"));
        assert!(lines[0].ends_with("Processing"));
        assert!(lines[1].ends_with(" 50%"));

        progress.phase = PollPhase::TrackingLost;
        progress.banner = Some(Banner::TrackingLost);
        let lines = render_status(&progress);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("Tracking lost"));
        assert!(lines[2].contains("may still be running"));
    }

    #[test]
    fn rows_are_numbered_from_one() {
        let progress = view(JobStatus::Processing, PollPhase::Polling, 50);
        assert_eq!(
            render_rows(&progress),
            vec![
                "    1. OK  EDM @ CGY (Successfully added)",
                "    2. ERR https://x.example.com/2 (404 Not Found)",
            ]
        );
    }

    #[test]
    fn only_new_rows_are_appended() {
        let rows = render_rows(&view(JobStatus::Processing, PollPhase::Polling, 50));
        assert_eq!(row_update(&rows, &rows[..1]), RowUpdate::Append(&rows[1..]));
        assert_eq!(row_update(&rows, &rows), RowUpdate::Append(&[]));
        assert_eq!(row_update(&rows, &[]), RowUpdate::Append(&rows[..]));
    }

    #[test]
    fn changed_row_reprints_the_list() {
        let mut progress = view(JobStatus::Processing, PollPhase::Polling, 50);
        let printed = render_rows(&progress);

        progress.rows[0].status = ItemStatus::Error;
        progress.rows[0].detail = "Parse error".to_string();
        let rows = render_rows(&progress);
        assert_eq!(row_update(&rows, &printed), RowUpdate::Reprint(&rows[..]));
        assert_eq!(rows[0], "    1. ERR EDM @ CGY (Parse error)");

        progress.rows.truncate(1);
        let shorter = render_rows(&progress);
        assert_eq!(row_update(&shorter, &rows), RowUpdate::Reprint(&shorter[..]));
    }

    #[test]
    fn summary_uses_job_counters_not_rows() {
        let mut done = view(JobStatus::Completed, PollPhase::Terminal, 100);
        done.completed_items = 40;
        done.failed_items = 2;
        done.rows.truncate(1);
        assert_eq!(summary_line(&done), "Job abc completed: 40 succeeded, 2 failed.");
    }

    #[test]
    fn summary_distinguishes_lost_tracking() {
        let done = view(JobStatus::Completed, PollPhase::Terminal, 100);
        assert_eq!(summary_line(&done), "Job abc completed: 1 succeeded, 1 failed.");

        let lost = view(JobStatus::Processing, PollPhase::TrackingLost, 50);
        assert!(summary_line(&lost).starts_with("Stopped tracking job abc at 50%"));
    }
}
