//! Cycle runner: fetch rows, evaluate each rule, notify, sleep, repeat
//!
//! ```text
//! Idle -> FetchingRows -> EvaluatingRows -> Sleeping -> FetchingRows -> ...
//!                 |                |
//!                 |                +-- panic --> Recovering -> FetchingRows
//!                 +-- fetch error --> Sleeping
//! ```
//!
//! Every row-scoped failure is logged and counted in the [`CycleReport`];
//! nothing short of a panic inside evaluation leaves the normal path.

use crate::config::MonitorSettings;
use crate::core::context::MonitorContext;
use crate::core::scheduler::{Sleeper, TokioSleeper};
use crate::metrics::{
    FAILURE_EXTRACTION, FAILURE_NOTIFY, FAILURE_NO_QUOTE, FAILURE_PARSE, FAILURE_QUOTE_FETCH,
};
use crate::models::{AlertNotification, AlertRule, RawRecord};
use crate::rules::{parse_condition, RowExtractor};
use futures_util::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum CycleState {
    Idle,
    FetchingRows,
    EvaluatingRows(Vec<RawRecord>),
    Sleeping,
    Recovering,
}

impl CycleState {
    pub fn name(&self) -> &'static str {
        match self {
            CycleState::Idle => "idle",
            CycleState::FetchingRows => "fetching_rows",
            CycleState::EvaluatingRows(_) => "evaluating_rows",
            CycleState::Sleeping => "sleeping",
            CycleState::Recovering => "recovering",
        }
    }
}

/// What happened to a single rule during evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Alerted(AlertNotification),
    NotMet { price: f64 },
    ParseFailed,
    NoQuote,
    QuoteFailed,
    NotifyFailed(AlertNotification),
}

/// Tally of one cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub fetch_failed: bool,
    pub rows_fetched: usize,
    pub rules_extracted: usize,
    pub rows_skipped: usize,
    pub parse_failures: usize,
    pub missing_quotes: usize,
    pub quote_failures: usize,
    pub conditions_not_met: usize,
    pub alerts_sent: usize,
    pub notify_failures: usize,
    /// Alerts whose condition held, whether or not delivery succeeded
    pub triggered: Vec<AlertNotification>,
}

impl CycleReport {
    fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Alerted(alert) => {
                self.alerts_sent += 1;
                self.triggered.push(alert);
            }
            RowOutcome::NotMet { .. } => self.conditions_not_met += 1,
            RowOutcome::ParseFailed => self.parse_failures += 1,
            RowOutcome::NoQuote => self.missing_quotes += 1,
            RowOutcome::QuoteFailed => self.quote_failures += 1,
            RowOutcome::NotifyFailed(alert) => {
                self.notify_failures += 1;
                self.triggered.push(alert);
            }
        }
    }
}

pub struct MonitorRuntime {
    context: MonitorContext,
    settings: MonitorSettings,
    sleeper: Arc<dyn Sleeper>,
    extractor: RowExtractor,
    state: CycleState,
    last_report: Option<CycleReport>,
}

impl MonitorRuntime {
    pub fn new(context: MonitorContext, settings: MonitorSettings) -> Self {
        Self {
            context,
            settings,
            sleeper: Arc::new(TokioSleeper),
            extractor: RowExtractor::default(),
            state: CycleState::Idle,
            last_report: None,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_extractor(mut self, extractor: RowExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn state(&self) -> &CycleState {
        &self.state
    }

    /// Report of the most recently finished cycle
    pub fn last_report(&self) -> Option<&CycleReport> {
        self.last_report.as_ref()
    }

    /// Run the loop until `shutdown` resolves
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            interval_secs = self.settings.poll_interval.as_secs(),
            "Starting alert monitor, checking every {}s",
            self.settings.poll_interval.as_secs()
        );

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = self.step() => {}
            }
        }
        info!(state = self.state.name(), "Shutdown requested, alert monitor stopped");
    }

    /// Perform the work of the current state and advance to the next one
    ///
    /// The current state is only replaced once its work has finished, so a
    /// step dropped mid-await (shutdown during a sleep) leaves it untouched.
    pub async fn step(&mut self) -> &CycleState {
        let next = match &self.state {
            CycleState::Idle => {
                self.inspect_source().await;
                CycleState::FetchingRows
            }
            CycleState::FetchingRows => match self.fetch_rows().await {
                Some(rows) => CycleState::EvaluatingRows(rows),
                None => {
                    self.finish_cycle(CycleReport {
                        fetch_failed: true,
                        ..CycleReport::default()
                    });
                    CycleState::Sleeping
                }
            },
            CycleState::EvaluatingRows(rows) => {
                match AssertUnwindSafe(self.evaluate_rows(rows)).catch_unwind().await {
                    Ok(report) => {
                        self.finish_cycle(report);
                        CycleState::Sleeping
                    }
                    Err(panic) => {
                        error!(
                            error = %panic_message(panic.as_ref()),
                            retry_in_secs = self.settings.recovery_delay.as_secs(),
                            "Unexpected failure while evaluating rows, retrying in {}s",
                            self.settings.recovery_delay.as_secs()
                        );
                        if let Some(ref metrics) = self.context.metrics {
                            metrics.recoveries_total.inc();
                        }
                        CycleState::Recovering
                    }
                }
            }
            CycleState::Sleeping => {
                debug!(secs = self.settings.poll_interval.as_secs(), "Sleeping until next cycle");
                self.sleeper.sleep(self.settings.poll_interval).await;
                CycleState::FetchingRows
            }
            CycleState::Recovering => {
                self.sleeper.sleep(self.settings.recovery_delay).await;
                CycleState::FetchingRows
            }
        };

        self.state = next;
        &self.state
    }

    /// One fetch + evaluate pass with no sleeping and no state change
    pub async fn run_cycle(&self) -> CycleReport {
        match self.fetch_rows().await {
            Some(rows) => self.evaluate_rows(&rows).await,
            None => CycleReport {
                fetch_failed: true,
                ..CycleReport::default()
            },
        }
    }

    /// Log the shape of the record source once at startup
    async fn inspect_source(&self) {
        match self.context.records.describe().await {
            Ok(overview) => info!(
                rows = overview.row_count,
                properties = ?overview.property_names,
                "Record source reachable: {} rows, properties {:?}",
                overview.row_count,
                overview.property_names
            ),
            Err(e) => warn!(error = %e, "Could not inspect record source: {}", e),
        }
    }

    async fn fetch_rows(&self) -> Option<Vec<RawRecord>> {
        info!(
            at = %chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            "Checking alert conditions"
        );
        match self.context.records.fetch_rows().await {
            Ok(rows) => Some(rows),
            Err(e) => {
                error!(error = %e, "Error fetching rows: {}", e);
                if let Some(ref metrics) = self.context.metrics {
                    metrics.row_fetch_failures_total.inc();
                }
                None
            }
        }
    }

    /// Evaluate every row; row-scoped failures never escape
    pub async fn evaluate_rows(&self, rows: &[RawRecord]) -> CycleReport {
        let extraction = self.extractor.extract_all(rows);
        if let Some(ref metrics) = self.context.metrics {
            metrics
                .row_failures_total
                .with_label_values(&[FAILURE_EXTRACTION])
                .inc_by(extraction.skipped as u64);
        }

        let mut report = CycleReport {
            rows_fetched: rows.len(),
            rules_extracted: extraction.rules.len(),
            rows_skipped: extraction.skipped,
            ..CycleReport::default()
        };

        if extraction.rules.is_empty() {
            info!(rows = rows.len(), "No valid rows found in database");
            return report;
        }

        for rule in &extraction.rules {
            let outcome = self.evaluate_rule(rule).await;
            report.record(outcome);
        }

        report
    }

    async fn evaluate_rule(&self, rule: &AlertRule) -> RowOutcome {
        let metrics = self.context.metrics.as_ref();

        let condition = match parse_condition(&rule.condition) {
            Ok(condition) => condition,
            Err(e) => {
                warn!(ticker = %rule.ticker, error = %e, "Skipping {}: {}", rule.ticker, e);
                if let Some(m) = metrics {
                    m.record_row_failure(FAILURE_PARSE);
                }
                return RowOutcome::ParseFailed;
            }
        };

        let quote = match self.context.quotes.latest_close(&rule.ticker).await {
            Ok(Some(quote)) => quote,
            Ok(None) => {
                warn!(ticker = %rule.ticker, "No price data found for {}", rule.ticker);
                if let Some(m) = metrics {
                    m.record_row_failure(FAILURE_NO_QUOTE);
                }
                return RowOutcome::NoQuote;
            }
            Err(e) => {
                warn!(
                    ticker = %rule.ticker,
                    error = %e,
                    "Quote fetch failed for {}: {}",
                    rule.ticker,
                    e
                );
                if let Some(m) = metrics {
                    m.record_row_failure(FAILURE_QUOTE_FETCH);
                }
                return RowOutcome::QuoteFailed;
            }
        };

        if let Some(m) = metrics {
            m.rows_evaluated_total.inc();
        }

        if !condition.is_met_by(quote.price) {
            info!(
                ticker = %rule.ticker,
                price = quote.price,
                condition = %rule.condition,
                "{} price ${:.2} does not meet condition {}",
                rule.ticker,
                quote.price,
                rule.condition
            );
            return RowOutcome::NotMet { price: quote.price };
        }

        let alert = AlertNotification::new(rule, quote.price);
        info!(
            ticker = %rule.ticker,
            price = quote.price,
            condition = %rule.condition,
            "ALERT: {} ${:.2} meets condition {}",
            rule.ticker,
            quote.price,
            rule.condition
        );

        match self.context.notifier.send(&alert).await {
            Ok(()) => {
                if let Some(m) = metrics {
                    m.alerts_sent_total.inc();
                }
                RowOutcome::Alerted(alert)
            }
            Err(e) => {
                error!(
                    ticker = %rule.ticker,
                    error = %e,
                    "Failed to send alert for {}: {}",
                    rule.ticker,
                    e
                );
                if let Some(m) = metrics {
                    m.record_row_failure(FAILURE_NOTIFY);
                }
                RowOutcome::NotifyFailed(alert)
            }
        }
    }

    fn finish_cycle(&mut self, report: CycleReport) {
        info!(
            rules = report.rules_extracted,
            skipped = report.rows_skipped,
            alerts = report.alerts_sent,
            failures = report.parse_failures
                + report.missing_quotes
                + report.quote_failures
                + report.notify_failures,
            "Cycle complete"
        );
        if let Some(ref metrics) = self.context.metrics {
            metrics.cycles_total.inc();
        }
        self.last_report = Some(report);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
