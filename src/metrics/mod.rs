//! Prometheus counters for the alert monitor

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Row failure kinds used as the `kind` label of `row_failures_total`
pub const FAILURE_EXTRACTION: &str = "extraction";
pub const FAILURE_PARSE: &str = "parse";
pub const FAILURE_NO_QUOTE: &str = "no_quote";
pub const FAILURE_QUOTE_FETCH: &str = "quote_fetch";
pub const FAILURE_NOTIFY: &str = "notify";

pub struct Metrics {
    registry: Registry,
    pub cycles_total: IntCounter,
    pub row_fetch_failures_total: IntCounter,
    pub recoveries_total: IntCounter,
    pub rows_evaluated_total: IntCounter,
    pub row_failures_total: IntCounterVec,
    pub alerts_sent_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let cycles_total = IntCounter::new("cycles_total", "Completed evaluation cycles")?;
        let row_fetch_failures_total = IntCounter::new(
            "row_fetch_failures_total",
            "Cycles where the record source could not be read",
        )?;
        let recoveries_total = IntCounter::new(
            "recoveries_total",
            "Cycles aborted by an unexpected failure",
        )?;
        let rows_evaluated_total = IntCounter::new(
            "rows_evaluated_total",
            "Alert rules compared against a live quote",
        )?;
        let row_failures_total = IntCounterVec::new(
            Opts::new("row_failures_total", "Rows skipped, by failure kind"),
            &["kind"],
        )?;
        let alerts_sent_total = IntCounter::new("alerts_sent_total", "Notifications delivered")?;

        registry.register(Box::new(cycles_total.clone()))?;
        registry.register(Box::new(row_fetch_failures_total.clone()))?;
        registry.register(Box::new(recoveries_total.clone()))?;
        registry.register(Box::new(rows_evaluated_total.clone()))?;
        registry.register(Box::new(row_failures_total.clone()))?;
        registry.register(Box::new(alerts_sent_total.clone()))?;

        Ok(Self {
            registry,
            cycles_total,
            row_fetch_failures_total,
            recoveries_total,
            rows_evaluated_total,
            row_failures_total,
            alerts_sent_total,
        })
    }

    pub fn record_row_failure(&self, kind: &str) {
        self.row_failures_total.with_label_values(&[kind]).inc();
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
