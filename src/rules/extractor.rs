//! Resolution of loosely-named record fields into [`AlertRule`]s

use crate::error::ExtractionError;
use crate::models::{AlertRule, RawRecord};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Accepted property names per logical field, in priority order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAliases {
    pub ticker: Vec<String>,
    pub condition: Vec<String>,
    pub context: Vec<String>,
}

impl Default for FieldAliases {
    fn default() -> Self {
        Self {
            ticker: to_owned(&["Ticker", "ticker", "Stock", "Symbol"]),
            condition: to_owned(&["Price Target", "Condition", "condition", "Alert", "Trigger"]),
            context: to_owned(&["Message", "Context", "context", "Notes", "Description"]),
        }
    }
}

fn to_owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// Outcome of extracting a whole batch of records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub rules: Vec<AlertRule>,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RowExtractor {
    aliases: FieldAliases,
}

impl RowExtractor {
    pub fn new(aliases: FieldAliases) -> Self {
        Self { aliases }
    }

    /// Resolve one record into an alert rule
    pub fn extract(&self, record: &RawRecord) -> Result<AlertRule, ExtractionError> {
        let ticker = resolve(record, &self.aliases.ticker)
            .map(|raw| clean_ticker(&raw))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ExtractionError::MissingTicker {
                record: record.label().to_string(),
            })?;

        let condition = resolve(record, &self.aliases.condition).ok_or_else(|| {
            ExtractionError::MissingCondition {
                record: record.label().to_string(),
                ticker: ticker.clone(),
            }
        })?;

        let context = resolve(record, &self.aliases.context).unwrap_or_default();

        Ok(AlertRule {
            ticker,
            condition,
            context,
        })
    }

    /// Resolve every record, dropping (and logging) the incomplete ones
    pub fn extract_all(&self, records: &[RawRecord]) -> Extraction {
        let mut extraction = Extraction::default();
        for record in records {
            match self.extract(record) {
                Ok(rule) => extraction.rules.push(rule),
                Err(e) => {
                    warn!(record = %record.label(), error = %e, "Skipping row: {}", e);
                    extraction.skipped += 1;
                }
            }
        }
        extraction
    }
}

/// First alias present on the record with non-blank text content
fn resolve(record: &RawRecord, aliases: &[String]) -> Option<String> {
    aliases.iter().find_map(|alias| {
        record
            .properties
            .get(alias)
            .and_then(|value| value.plain_text())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    })
}

fn clean_ticker(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_prefix('$').unwrap_or(trimmed).trim().to_string()
}
