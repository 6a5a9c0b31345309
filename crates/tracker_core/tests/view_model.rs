use tracker_core::{
    update, Banner, Effect, ItemStatus, JobHandle, JobKind, JobSnapshot, Msg, PollOutcome,
    PollPhase, RawItemResult, TrackerState,
};

fn tracking(kind: JobKind) -> (TrackerState, u64) {
    let (state, effects) = update(TrackerState::new(), Msg::StartRequested { kind });
    let Some(Effect::Submit { generation, .. }) = effects.into_iter().next() else {
        panic!("expected submit effect");
    };
    let (state, _) = update(
        state,
        Msg::Submitted {
            kind,
            generation,
            handle: JobHandle {
                id: "task-7".to_string(),
                total_items_hint: 2,
            },
        },
    );
    (state, generation)
}

fn outcome(status: &str, completed: u32, failed: u32) -> PollOutcome {
    let mut results = Vec::new();
    for _ in 0..completed {
        results.push(RawItemResult {
            matchup: Some("CHI @ DET".into()),
            status: "success".into(),
            ..RawItemResult::default()
        });
    }
    for _ in 0..failed {
        results.push(RawItemResult {
            url: Some("https://example.com/bad".into()),
            status: "failed".into(),
            error: Some("could not parse box score".into()),
            ..RawItemResult::default()
        });
    }
    PollOutcome::Snapshot(JobSnapshot {
        status: status.to_string(),
        total_items: 2,
        completed_items: completed,
        failed_items: failed,
        results,
        ..JobSnapshot::default()
    })
}

#[test]
fn nothing_to_show_when_idle() {
    assert!(TrackerState::new().view(JobKind::BulkImport).is_none());
}

#[test]
fn in_progress_view_has_headline_and_rows() {
    let (state, generation) = tracking(JobKind::BulkImport);
    let (state, _) = update(
        state,
        Msg::PollCompleted {
            kind: JobKind::BulkImport,
            generation,
            outcome: outcome("processing", 1, 0),
        },
    );

    let view = state.view(JobKind::BulkImport).unwrap();
    assert_eq!(view.headline, "Processing Progress: 1 / 2");
    assert_eq!(
        (view.completed_items, view.failed_items, view.total_items),
        (1, 0, 2)
    );
    assert_eq!(view.percent, 50);
    assert_eq!(view.phase, PollPhase::Polling);
    assert!(view.busy);
    assert!(view.banner.is_none());
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].label, "CHI @ DET");
    assert_eq!(view.rows[0].detail, "Successfully added");
}

#[test]
fn reported_failures_and_lost_tracking_read_differently() {
    let (state, generation) = tracking(JobKind::ReprocessAll);
    let (finished, _) = update(
        state.clone(),
        Msg::PollCompleted {
            kind: JobKind::ReprocessAll,
            generation,
            outcome: outcome("completed", 1, 1),
        },
    );
    let view = finished.view(JobKind::ReprocessAll).unwrap();
    assert_eq!(view.banner, Some(Banner::ReportedFailures { failed: 1 }));
    assert!(!view.dialog_should_close);
    assert!(!view.busy);
    assert_eq!(view.rows[0].detail, "Successfully reprocessed");
    assert_eq!(view.rows[1].status, ItemStatus::Error);
    assert_eq!(view.rows[1].detail, "could not parse box score");

    let (lost, _) = update(
        state,
        Msg::PollCompleted {
            kind: JobKind::ReprocessAll,
            generation,
            outcome: PollOutcome::TransportFailed("timed out".into()),
        },
    );
    let view = lost.view(JobKind::ReprocessAll).unwrap();
    assert_eq!(view.banner, Some(Banner::TrackingLost));
    assert_ne!(
        Banner::TrackingLost.message(),
        Banner::ReportedFailures { failed: 1 }.message()
    );
    assert!(Banner::TrackingLost.message().contains("Could not check progress"));
}

#[test]
fn clean_completion_closes_dialog() {
    let (state, generation) = tracking(JobKind::BulkImport);
    let (state, _) = update(
        state,
        Msg::PollCompleted {
            kind: JobKind::BulkImport,
            generation,
            outcome: outcome("completed", 2, 0),
        },
    );
    let view = state.view(JobKind::BulkImport).unwrap();
    assert!(view.dialog_should_close);
    assert_eq!(view.percent, 100);
    assert!(view.banner.is_none());
}
