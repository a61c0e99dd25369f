//! Unit tests for the cycle runner state machine

use crate::fakes::{
    QuoteBehavior, RecordingNotifier, RecordingSleeper, StaticQuotes, StaticRecords,
};
use pricewatch::config::MonitorSettings;
use pricewatch::core::{CycleState, MonitorContext, MonitorRuntime};
use pricewatch::metrics::Metrics;
use pricewatch::models::RawRecord;
use std::sync::Arc;
use std::time::Duration;

fn row(id: &str, ticker: &str, condition: &str) -> RawRecord {
    RawRecord::new(id)
        .with_title("Ticker", ticker)
        .with_rich_text("Condition", condition)
}

fn settings() -> MonitorSettings {
    MonitorSettings {
        poll_interval: Duration::from_secs(300),
        recovery_delay: Duration::from_secs(60),
    }
}

struct Harness {
    runtime: MonitorRuntime,
    records: Arc<StaticRecords>,
    quotes: Arc<StaticQuotes>,
    notifier: Arc<RecordingNotifier>,
    sleeper: Arc<RecordingSleeper>,
    metrics: Arc<Metrics>,
}

fn harness(records: StaticRecords, quotes: StaticQuotes, notifier: RecordingNotifier) -> Harness {
    harness_with_sleeper(records, quotes, notifier, RecordingSleeper::new())
}

fn harness_with_sleeper(
    records: StaticRecords,
    quotes: StaticQuotes,
    notifier: RecordingNotifier,
    sleeper: RecordingSleeper,
) -> Harness {
    let records = Arc::new(records);
    let quotes = Arc::new(quotes);
    let notifier = Arc::new(notifier);
    let sleeper = Arc::new(sleeper);
    let metrics = Arc::new(Metrics::new().expect("metrics initialization"));

    let context = MonitorContext::new(records.clone(), quotes.clone(), notifier.clone())
        .with_metrics(metrics.clone());
    let runtime = MonitorRuntime::new(context, settings()).with_sleeper(sleeper.clone());

    Harness {
        runtime,
        records,
        quotes,
        notifier,
        sleeper,
        metrics,
    }
}

#[test]
fn test_monitor_settings_default() {
    let defaults = MonitorSettings::default();
    assert_eq!(defaults.poll_interval, Duration::from_secs(300));
    assert_eq!(defaults.recovery_delay, Duration::from_secs(60));
}

#[tokio::test]
async fn test_matching_condition_sends_one_alert() {
    let h = harness(
        StaticRecords::new(vec![row("r1", "$AAPL", ">= 150")]),
        StaticQuotes::default().with("AAPL", QuoteBehavior::Price(152.30)),
        RecordingNotifier::default(),
    );

    let report = h.runtime.run_cycle().await;

    assert_eq!(report.alerts_sent, 1);
    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    let text = sent[0].to_string();
    assert!(text.contains("AAPL"));
    assert!(text.contains("152.30"));
    assert!(text.contains(">= 150"));
    assert_eq!(h.metrics.alerts_sent_total.get(), 1);
}

#[tokio::test]
async fn test_unmet_condition_sends_nothing() {
    let h = harness(
        StaticRecords::new(vec![row("r1", "AAPL", "<= 100")]),
        StaticQuotes::default().with("AAPL", QuoteBehavior::Price(152.30)),
        RecordingNotifier::default(),
    );

    let report = h.runtime.run_cycle().await;

    assert_eq!(report.conditions_not_met, 1);
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_missing_quote_is_skipped_quietly() {
    let h = harness(
        StaticRecords::new(vec![row("r1", "ZZZZ", "> 1")]),
        StaticQuotes::default().with("ZZZZ", QuoteBehavior::NoData),
        RecordingNotifier::default(),
    );

    let report = h.runtime.run_cycle().await;

    assert_eq!(report.missing_quotes, 1);
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_parse_failure_skips_quote_lookup() {
    let h = harness(
        StaticRecords::new(vec![row("r1", "AAPL", "around 150")]),
        StaticQuotes::default().with("AAPL", QuoteBehavior::Price(150.0)),
        RecordingNotifier::default(),
    );

    let report = h.runtime.run_cycle().await;

    assert_eq!(report.parse_failures, 1);
    assert!(h.quotes.requested.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_every_row_failing_still_completes_cycle() {
    let mut h = harness(
        StaticRecords::new(vec![
            row("bad-parse", "AAPL", "whenever"),
            RawRecord::new("no-ticker").with_rich_text("Condition", "> 1"),
            row("no-data", "NODATA", "> 1"),
            row("feed-error", "BROKEN", "> 1"),
        ]),
        StaticQuotes::default()
            .with("NODATA", QuoteBehavior::NoData)
            .with("BROKEN", QuoteBehavior::Fail),
        RecordingNotifier::default(),
    );

    assert_eq!(*h.runtime.step().await, CycleState::FetchingRows);
    assert!(matches!(h.runtime.step().await, CycleState::EvaluatingRows(rows) if rows.len() == 4));
    assert_eq!(*h.runtime.step().await, CycleState::Sleeping);

    let report = h.runtime.last_report().expect("cycle report");
    assert_eq!(report.rows_skipped, 1);
    assert_eq!(report.parse_failures, 1);
    assert_eq!(report.missing_quotes, 1);
    assert_eq!(report.quote_failures, 1);
    assert_eq!(report.alerts_sent, 0);

    assert_eq!(*h.runtime.step().await, CycleState::FetchingRows);
    assert_eq!(h.sleeper.durations(), vec![Duration::from_secs(300)]);
}

#[tokio::test]
async fn test_notify_failure_is_isolated_to_its_row() {
    let h = harness(
        StaticRecords::new(vec![row("r1", "AAPL", "> 1"), row("r2", "MSFT", "> 1")]),
        StaticQuotes::default()
            .with("AAPL", QuoteBehavior::Price(10.0))
            .with("MSFT", QuoteBehavior::Price(20.0)),
        RecordingNotifier::failing(),
    );

    let report = h.runtime.run_cycle().await;

    assert_eq!(report.notify_failures, 2);
    assert_eq!(report.triggered.len(), 2);
    assert_eq!(h.notifier.sent().len(), 2);
}

#[tokio::test]
async fn test_fetch_failure_sleeps_normal_interval() {
    let mut h = harness(
        StaticRecords::failing(),
        StaticQuotes::default(),
        RecordingNotifier::default(),
    );

    h.runtime.step().await; // Idle: inspection fails but is not fatal
    assert_eq!(*h.runtime.step().await, CycleState::Sleeping);
    assert!(h.runtime.last_report().unwrap().fetch_failed);
    assert_eq!(h.metrics.row_fetch_failures_total.get(), 1);

    assert_eq!(*h.runtime.step().await, CycleState::FetchingRows);
    assert_eq!(h.sleeper.durations(), vec![Duration::from_secs(300)]);
}

#[tokio::test]
async fn test_panic_during_evaluation_moves_to_recovering() {
    let mut h = harness(
        StaticRecords::new(vec![row("r1", "BOOM", "> 1")]),
        StaticQuotes::default().with("BOOM", QuoteBehavior::Panic),
        RecordingNotifier::default(),
    );

    h.runtime.step().await;
    h.runtime.step().await;
    assert_eq!(*h.runtime.step().await, CycleState::Recovering);
    assert_eq!(h.metrics.recoveries_total.get(), 1);

    assert_eq!(*h.runtime.step().await, CycleState::FetchingRows);
    assert_eq!(h.sleeper.durations(), vec![Duration::from_secs(60)]);
}

#[tokio::test]
async fn test_same_inputs_give_same_decisions_every_cycle() {
    let h = harness(
        StaticRecords::new(vec![row("r1", "AAPL", ">= 150"), row("r2", "MSFT", "< 100")]),
        StaticQuotes::default()
            .with("AAPL", QuoteBehavior::Price(152.30))
            .with("MSFT", QuoteBehavior::Price(400.0)),
        RecordingNotifier::default(),
    );

    let first = h.runtime.run_cycle().await;
    let second = h.runtime.run_cycle().await;

    assert_eq!(first, second);
    // No deduplication: a condition that still holds alerts again.
    assert_eq!(h.notifier.sent().len(), 2);
}

#[tokio::test]
async fn test_run_until_loops_until_shutdown() {
    let mut h = harness(
        StaticRecords::new(vec![row("r1", "AAPL", ">= 150")]),
        StaticQuotes::default().with("AAPL", QuoteBehavior::Price(151.0)),
        RecordingNotifier::default(),
    );

    let sleeper = h.sleeper.clone();
    h.runtime.run_until(async move { sleeper.wait_for(3).await }).await;

    assert_eq!(h.sleeper.durations().len(), 3);
    assert_eq!(h.notifier.sent().len(), 3);
    assert_eq!(h.metrics.cycles_total.get(), 3);
    // One extra fetch for the startup inspection.
    assert_eq!(
        h.records.calls.load(std::sync::atomic::Ordering::SeqCst),
        4
    );
}

#[tokio::test]
async fn test_shutdown_during_sleep_keeps_sleeping_state() {
    let mut h = harness_with_sleeper(
        StaticRecords::new(vec![row("r1", "AAPL", ">= 150")]),
        StaticQuotes::default().with("AAPL", QuoteBehavior::Price(151.0)),
        RecordingNotifier::default(),
        RecordingSleeper::blocking(),
    );

    let sleeper = h.sleeper.clone();
    h.runtime.run_until(async move { sleeper.wait_for(1).await }).await;

    assert_eq!(h.runtime.state(), &CycleState::Sleeping);
    assert_eq!(h.metrics.cycles_total.get(), 1);

    // Running again resumes the interrupted sleep instead of re-inspecting.
    let sleeper = h.sleeper.clone();
    h.runtime.run_until(async move { sleeper.wait_for(2).await }).await;

    assert_eq!(h.runtime.state(), &CycleState::Sleeping);
    assert_eq!(h.sleeper.durations(), vec![Duration::from_secs(300); 2]);
    assert_eq!(
        h.records.calls.load(std::sync::atomic::Ordering::SeqCst),
        2
    );
}
