use std::future::Future;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracker_core::{JobKind, JobProgressView, JobStatus, PollPhase};
use tracker_engine::{JobClient, JobCoordinator, ReqwestJobClient};
use tracker_logging::{tracker_debug, tracker_info};

use crate::cli::{Action, UrlSource};
use crate::config::AppConfig;
use crate::render::{render_rows, render_status, row_update, summary_line, RowUpdate};

const RENDER_INTERVAL: Duration = Duration::from_millis(250);

/// How a tracked run ended, from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    CompletedWithFailures,
    Failed,
    NotStarted,
    TrackingLost,
    Interrupted,
}

impl Outcome {
    fn from_view(view: &JobProgressView) -> Self {
        match (view.phase, view.status) {
            (PollPhase::TrackingLost, _) => Outcome::TrackingLost,
            (_, JobStatus::Completed) if view.dialog_should_close => Outcome::Completed,
            (_, JobStatus::Completed) => Outcome::CompletedWithFailures,
            (_, JobStatus::Failed) => Outcome::Failed,
            _ => Outcome::TrackingLost,
        }
    }

    pub fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Completed => ExitCode::SUCCESS,
            Outcome::CompletedWithFailures | Outcome::Failed => ExitCode::from(1),
            Outcome::NotStarted => ExitCode::from(2),
            Outcome::TrackingLost => ExitCode::from(3),
            Outcome::Interrupted => ExitCode::from(130),
        }
    }
}

pub async fn run(
    action: &Action,
    config: &AppConfig,
    token: Option<String>,
) -> anyhow::Result<Outcome> {
    let (kind, payload) = match action {
        Action::BulkImport { source } => (JobKind::BulkImport, read_urls(source)?),
        Action::ReprocessAll => (JobKind::ReprocessAll, String::new()),
        Action::Help => return Ok(Outcome::Completed),
    };

    tracker_info!("Using backend {}", config.base_url);
    let client: Arc<dyn JobClient> =
        Arc::new(ReqwestJobClient::new(config.client_settings(token)));
    let coordinator = JobCoordinator::new(client, config.tracker_settings());
    let interrupted = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let mut out = io::stdout();
    track(&coordinator, kind, &payload, interrupted, &mut out).await
}

/// Starts one job and prints its progress until it settles or `stop` fires.
pub async fn track<W, S>(
    coordinator: &JobCoordinator,
    kind: JobKind,
    payload: &str,
    stop: S,
    out: &mut W,
) -> anyhow::Result<Outcome>
where
    W: Write,
    S: Future<Output = ()>,
{
    let job_id = match coordinator.start(kind, payload).await {
        Ok(job_id) => job_id,
        Err(err) => {
            writeln!(out, "{} Could not start {}: {}", stamp(), kind, err)?;
            return Ok(Outcome::NotStarted);
        }
    };
    writeln!(out, "{} Started {} job {}", stamp(), kind, job_id)?;

    let mut printed_rows = Vec::new();
    let mut ticker = tokio::time::interval(RENDER_INTERVAL);
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = &mut stop => {
                coordinator.cancel_tracking(kind);
                writeln!(
                    out,
                    "{} Stopped tracking. Job {} keeps running on the server.",
                    stamp(),
                    job_id
                )?;
                return Ok(Outcome::Interrupted);
            }
            _ = ticker.tick() => {}
        }

        print_if_changed(coordinator, kind, &mut printed_rows, out)?;
        if coordinator.phase(kind) != PollPhase::Polling {
            break;
        }
    }

    let exit = coordinator.wait_settled(kind).await;
    tracker_debug!("{} polling loop exit: {:?}", kind, exit);
    print_if_changed(coordinator, kind, &mut printed_rows, out)?;

    match coordinator.view(kind) {
        Some(view) => {
            writeln!(out, "{}", summary_line(&view))?;
            Ok(Outcome::from_view(&view))
        }
        None => Ok(Outcome::TrackingLost),
    }
}

fn print_if_changed<W: Write>(
    coordinator: &JobCoordinator,
    kind: JobKind,
    printed_rows: &mut Vec<String>,
    out: &mut W,
) -> io::Result<()> {
    if !coordinator.take_changed() {
        return Ok(());
    }
    let Some(view) = coordinator.view(kind) else {
        return Ok(());
    };

    let stamp = stamp();
    for line in render_status(&view) {
        writeln!(out, "{stamp} {line}")?;
    }
    let rows = render_rows(&view);
    let fresh = match row_update(&rows, printed_rows) {
        RowUpdate::Append(fresh) => fresh,
        RowUpdate::Reprint(all) => {
            writeln!(out, "{stamp} Results updated:")?;
            all
        }
    };
    for line in fresh {
        writeln!(out, "{line}")?;
    }
    *printed_rows = rows;
    out.flush()
}

fn read_urls(source: &UrlSource) -> anyhow::Result<String> {
    match source {
        UrlSource::File(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading URLs from {}", path.display())),
        UrlSource::Stdin => io::read_to_string(io::stdin()).context("reading URLs from stdin"),
    }
}

fn stamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
