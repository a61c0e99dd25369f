//! Dependencies handed to the cycle runner

use crate::metrics::Metrics;
use crate::services::{Notifier, QuoteProvider, RecordSource};
use std::sync::Arc;

/// Everything the runner talks to, injected at construction
///
/// Production wires the Notion, Yahoo and Telegram clients; tests substitute
/// in-memory fakes.
pub struct MonitorContext {
    pub records: Arc<dyn RecordSource>,
    pub quotes: Arc<dyn QuoteProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub metrics: Option<Arc<Metrics>>,
}

impl MonitorContext {
    pub fn new(
        records: Arc<dyn RecordSource>,
        quotes: Arc<dyn QuoteProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            records,
            quotes,
            notifier,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}
