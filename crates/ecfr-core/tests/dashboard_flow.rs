//! End-to-end orchestration tests against [`MockBackend`].
//!
//! Fetches run as real tokio tasks with simulated latency (paused clock), and
//! their resolutions are applied in arrival order, the way the terminal UI
//! drains its backend channel.

use std::sync::Arc;
use std::time::Duration;

use ecfr_core::backend::mock::{MockBackend, MockFailure};
use ecfr_core::orchestrator::{fetch_corrections, load_registry, run_acquisition};
use ecfr_core::{
    AcquisitionPhase, AcquisitionTracker, ChartView, CorrectionRecord, FailureKind,
    SelectionController, SelectionResolution, TitleNumber, TitleRecord,
};
use tokio::sync::mpsc;

fn correction(id: i64, occurred: &str, corrected: &str) -> CorrectionRecord {
    CorrectionRecord::parse(id, occurred, corrected, "Corrected amendatory instruction").unwrap()
}

fn spawn_fetch(
    backend: &Arc<MockBackend>,
    ticket: ecfr_core::SelectionTicket,
    tx: &mpsc::UnboundedSender<SelectionResolution>,
) {
    let backend = Arc::clone(backend);
    let tx = tx.clone();
    tokio::spawn(async move {
        let resolution = fetch_corrections(backend.as_ref(), ticket).await;
        let _ = tx.send(resolution);
    });
}

#[tokio::test(start_paused = true)]
async fn slow_previous_fetch_cannot_overwrite_newer_selection() {
    let backend = Arc::new(
        MockBackend::new(vec![])
            .with_corrections(1, vec![correction(1, "2010-01-01", "2010-02-01")])
            .with_corrections(
                2,
                vec![
                    correction(2, "2020-01-01T00:00:00Z", "2020-01-10T00:00:00Z"),
                    correction(3, "2021-05-01T00:00:00Z", "2021-05-03T00:00:00Z"),
                ],
            )
            .with_delay(1, Duration::from_millis(500))
            .with_delay(2, Duration::from_millis(50)),
    );
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut selection = SelectionController::new();

    let a = selection.select(Some(TitleRecord::new(1, "A"))).unwrap();
    spawn_fetch(&backend, a, &tx);
    let b = selection.select(Some(TitleRecord::new(2, "B"))).unwrap();
    spawn_fetch(&backend, b, &tx);
    drop(tx);

    let mut applied = Vec::new();
    while let Some(resolution) = rx.recv().await {
        let number = resolution.ticket.number;
        applied.push((number, selection.apply(resolution)));
    }

    assert_eq!(
        applied,
        vec![(TitleNumber(2), true), (TitleNumber(1), false)]
    );
    let data = selection.view().chart_data().expect("B's data is shown");
    let days: Vec<i64> = data.correction_delays.iter().map(|d| d.days_to_correct).collect();
    assert_eq!(days, vec![9, 2]);
    assert_eq!(backend.correction_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn fast_stale_fetch_is_dropped_while_newer_one_loads() {
    let backend = Arc::new(
        MockBackend::new(vec![])
            .with_corrections(1, vec![correction(1, "2010-01-01", "2010-02-01")])
            .with_correction_script(2, vec![Err(MockFailure::Status(503))])
            .with_delay(1, Duration::from_millis(10))
            .with_delay(2, Duration::from_millis(300)),
    );
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut selection = SelectionController::new();

    let a = selection.select(Some(TitleRecord::new(1, "A"))).unwrap();
    spawn_fetch(&backend, a, &tx);
    let b = selection.select(Some(TitleRecord::new(2, "B"))).unwrap();
    spawn_fetch(&backend, b, &tx);
    drop(tx);

    let first = rx.recv().await.unwrap();
    assert_eq!(first.ticket, a);
    assert!(!selection.apply(first));
    assert!(selection.view().is_loading());

    let second = rx.recv().await.unwrap();
    assert!(selection.apply(second));
    assert!(selection.view().error().unwrap().contains("503"));
}

#[tokio::test(start_paused = true)]
async fn deselect_suppresses_in_flight_fetch() {
    let backend = Arc::new(
        MockBackend::new(vec![])
            .with_corrections(4, vec![correction(1, "2020-01-01", "2020-01-02")])
            .with_default_delay(Duration::from_millis(100)),
    );
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut selection = SelectionController::new();

    let ticket = selection.select(Some(TitleRecord::new(4, "Accounts"))).unwrap();
    spawn_fetch(&backend, ticket, &tx);
    selection.select(None);
    drop(tx);

    let resolution = rx.recv().await.unwrap();
    assert!(resolution.outcome.is_ok(), "network call still completes");
    assert!(!selection.apply(resolution));
    assert_eq!(selection.view(), &ChartView::NothingSelected);
}

#[tokio::test]
async fn reselecting_fetches_fresh_data_each_time() {
    let backend = MockBackend::new(vec![]).with_correction_script(
        6,
        vec![
            Ok(vec![correction(1, "2020-01-01", "2020-01-05")]),
            Ok(vec![
                correction(1, "2020-01-01", "2020-01-05"),
                correction(2, "2022-03-01", "2022-03-02"),
            ]),
        ],
    );
    let mut selection = SelectionController::new();
    let record = TitleRecord::new(6, "Domestic Security");

    let first = selection.select(Some(record.clone())).unwrap();
    assert!(selection.apply(fetch_corrections(&backend, first).await));
    assert_eq!(selection.view().chart_data().unwrap().yearly_counts.len(), 1);

    let second = selection.select(Some(record)).unwrap();
    assert!(selection.apply(fetch_corrections(&backend, second).await));
    assert_eq!(selection.view().chart_data().unwrap().yearly_counts.len(), 2);
    assert_eq!(backend.correction_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn repeated_download_clicks_issue_one_call() {
    let backend = MockBackend::new(vec![]).with_delay(10, Duration::from_secs(2));
    let mut tracker = AcquisitionTracker::new();
    let record = TitleRecord::new(10, "Energy");
    tracker.observe(&record);

    let ticket = tracker.begin(&record).unwrap();
    let call = run_acquisition(&backend, ticket);
    // Clicks while the call is outstanding.
    for _ in 0..4 {
        assert!(tracker.begin(&record).is_none());
    }
    let resolution = call.await;

    assert_eq!(tracker.apply(resolution), AcquisitionPhase::Ready);
    assert_eq!(backend.acquire_calls(), 1);
    assert!(tracker.begin(&record).is_none());
    assert_eq!(backend.acquire_calls(), 1);
}

#[tokio::test]
async fn failed_acquisition_can_be_retried() {
    let backend = MockBackend::new(vec![]).with_acquisition_script(
        11,
        vec![Err(MockFailure::Transport("connection reset".into())), Ok(())],
    );
    let mut tracker = AcquisitionTracker::new();
    let record = TitleRecord::new(11, "Federal Elections");

    let ticket = tracker.begin(&record).unwrap();
    let phase = tracker.apply(run_acquisition(&backend, ticket).await);
    assert_eq!(phase, AcquisitionPhase::Idle);
    assert!(tracker.last_error(record.number).unwrap().contains("connection reset"));

    let ticket = tracker.begin(&record).unwrap();
    let phase = tracker.apply(run_acquisition(&backend, ticket).await);
    assert_eq!(phase, AcquisitionPhase::Ready);
    assert_eq!(backend.acquire_calls(), 2);
}

#[tokio::test]
async fn acquisition_success_does_not_fetch_corrections() {
    let backend = MockBackend::new(vec![]);
    let mut tracker = AcquisitionTracker::new();
    let record = TitleRecord::new(12, "Banks and Banking");

    let ticket = tracker.begin(&record).unwrap();
    tracker.apply(run_acquisition(&backend, ticket).await);

    assert!(tracker.is_chart_eligible(&record));
    assert_eq!(backend.correction_calls(), 0);
}

#[tokio::test]
async fn registry_failures_are_reported_by_kind() {
    let backend = MockBackend::failing_registry(MockFailure::Status(500));
    let err = load_registry(&backend).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Transport);

    let backend = MockBackend::failing_registry(MockFailure::Schema("no titles".into()));
    let err = load_registry(&backend).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Schema);
    assert_eq!(backend.list_calls(), 1);
}

#[tokio::test]
async fn registry_rows_seed_acquisition_state() {
    let backend = MockBackend::new(vec![
        TitleRecord::new(1, "General Provisions").with_checksum("9f86d081884c"),
        TitleRecord::new(2, "Grants and Agreements"),
    ]);
    let titles = load_registry(&backend).await.unwrap();

    let mut tracker = AcquisitionTracker::new();
    for title in &titles {
        tracker.observe(title);
    }
    assert_eq!(tracker.phase(&titles[0]), AcquisitionPhase::Ready);
    assert_eq!(tracker.phase(&titles[1]), AcquisitionPhase::Idle);
}
