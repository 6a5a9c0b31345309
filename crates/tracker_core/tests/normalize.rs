use pretty_assertions::assert_eq;
use tracker_core::{
    normalize, Anomaly, GameRef, ItemResult, ItemStatus, JobKind, JobSnapshot, JobStatus,
    RawItemResult,
};

fn init_logging() {
    tracker_logging::initialize_for_tests();
}

fn base(status: &str) -> JobSnapshot {
    JobSnapshot {
        status: status.to_string(),
        ..JobSnapshot::default()
    }
}

#[test]
fn backend_payload_deserializes_and_normalizes() {
    init_logging();
    let payload = r#"{
        "task_id": "6f1c",
        "status": "processing",
        "progress": 66,
        "total_items": 3,
        "completed_items": 1,
        "failed_items": 1,
        "results": [
            {"url": "https://www.hockey-reference.com/boxscores/a.html", "game_id": 17,
             "matchup": "BOS @ TOR", "status": "success"},
            {"url": "https://www.hockey-reference.com/boxscores/b.html",
             "status": "failed", "error": "404 Not Found"}
        ],
        "errors": ["Failed to process https://www.hockey-reference.com/boxscores/b.html: 404 Not Found"],
        "created_at": "2024-01-01T00:00:00"
    }"#;
    let snapshot: JobSnapshot = serde_json::from_str(payload).unwrap();
    assert_eq!(snapshot.results[0].game_id, Some(GameRef::Number(17)));

    let (job, anomalies) = normalize("6f1c", JobKind::BulkImport, &snapshot);
    assert!(anomalies.is_empty());
    assert_eq!(job.id, "6f1c");
    assert_eq!(job.status, JobStatus::Processing);
    assert_eq!(job.progress_percent, 66);
    assert_eq!(
        job.results,
        vec![
            ItemResult::success("BOS @ TOR"),
            ItemResult::error(
                "https://www.hockey-reference.com/boxscores/b.html",
                "404 Not Found"
            ),
        ]
    );
}

#[test]
fn progress_is_clamped() {
    init_logging();
    let mut snapshot = base("processing");
    snapshot.progress = Some(140);
    let (job, _) = normalize("t", JobKind::BulkImport, &snapshot);
    assert_eq!(job.progress_percent, 100);

    snapshot.progress = Some(-5);
    let (job, _) = normalize("t", JobKind::BulkImport, &snapshot);
    assert_eq!(job.progress_percent, 0);
}

#[test]
fn missing_progress_is_derived_from_counts() {
    init_logging();
    let mut snapshot = base("processing");
    snapshot.total_items = 3;
    snapshot.completed_items = 1;
    snapshot.failed_items = 1;
    snapshot.results = vec![
        RawItemResult {
            url: Some("https://a.example.com".into()),
            status: "success".into(),
            ..RawItemResult::default()
        },
        RawItemResult {
            url: Some("https://b.example.com".into()),
            status: "failed".into(),
            error: Some("boom".into()),
            ..RawItemResult::default()
        },
    ];
    let (job, anomalies) = normalize("t", JobKind::BulkImport, &snapshot);
    assert_eq!(job.progress_percent, 67);
    assert!(anomalies.is_empty());

    let (job, _) = normalize("t", JobKind::BulkImport, &base("pending"));
    assert_eq!(job.progress_percent, 0);
}

#[test]
fn duplicate_labels_stay_distinct_and_ordered() {
    init_logging();
    let mut snapshot = base("processing");
    snapshot.total_items = 3;
    snapshot.completed_items = 2;
    snapshot.failed_items = 1;
    snapshot.results = ["success", "failed", "success"]
        .into_iter()
        .map(|status| RawItemResult {
            matchup: Some("NYR @ NJD".into()),
            status: status.into(),
            error: (status == "failed").then(|| "parse error".to_string()),
            ..RawItemResult::default()
        })
        .collect();

    let (job, _) = normalize("t", JobKind::ReprocessAll, &snapshot);
    let statuses: Vec<_> = job.results.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![ItemStatus::Success, ItemStatus::Error, ItemStatus::Success]
    );
    assert!(job.results.iter().all(|r| r.label == "NYR @ NJD"));
}

#[test]
fn unknown_status_is_never_terminal() {
    init_logging();
    let (job, anomalies) = normalize("t", JobKind::BulkImport, &base("done"));
    assert_eq!(job.status, JobStatus::Processing);
    assert!(!job.is_terminal());
    assert_eq!(
        anomalies,
        vec![Anomaly::UnknownStatus {
            raw: "done".to_string()
        }]
    );
}

#[test]
fn status_strings_are_case_insensitive() {
    init_logging();
    let (job, anomalies) = normalize("t", JobKind::BulkImport, &base("Completed"));
    assert_eq!(job.status, JobStatus::Completed);
    assert!(anomalies.is_empty());
}

#[test]
fn inconsistent_counts_are_reported() {
    init_logging();
    let mut snapshot = base("completed");
    snapshot.total_items = 2;
    snapshot.completed_items = 2;
    snapshot.failed_items = 1;
    let (_, anomalies) = normalize("t", JobKind::BulkImport, &snapshot);
    assert_eq!(
        anomalies,
        vec![
            Anomaly::CountsExceedTotal {
                completed: 2,
                failed: 1,
                total: 2
            },
            Anomaly::CompletedNotAccounted {
                completed: 2,
                failed: 1,
                total: 2
            },
            Anomaly::ResultCountMismatch {
                results: 0,
                accounted: 3
            },
        ]
    );
}

#[test]
fn unknown_item_status_becomes_error() {
    init_logging();
    let mut snapshot = base("processing");
    snapshot.total_items = 1;
    snapshot.completed_items = 1;
    snapshot.results = vec![RawItemResult {
        matchup: Some("MTL @ OTT".into()),
        status: "skipped".into(),
        ..RawItemResult::default()
    }];
    let (job, anomalies) = normalize("t", JobKind::BulkImport, &snapshot);
    assert_eq!(job.results[0].status, ItemStatus::Error);
    assert_eq!(
        anomalies,
        vec![Anomaly::UnknownItemStatus {
            index: 0,
            raw: "skipped".to_string()
        }]
    );
}
