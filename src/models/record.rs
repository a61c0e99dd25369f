//! Raw rows as returned by the record source

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the alert database, before any field resolution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl RawRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            properties: BTreeMap::new(),
        }
    }

    /// Builder helper: add a title-typed property holding `text`
    pub fn with_title(mut self, name: &str, text: &str) -> Self {
        self.properties
            .insert(name.to_string(), PropertyValue::Title { title: vec![TextRun::plain(text)] });
        self
    }

    /// Builder helper: add a rich-text-typed property holding `text`
    pub fn with_rich_text(mut self, name: &str, text: &str) -> Self {
        self.properties.insert(
            name.to_string(),
            PropertyValue::RichText {
                rich_text: vec![TextRun::plain(text)],
            },
        );
        self
    }

    /// Label used in logs: the record id when the source supplied one
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or("<unknown>")
    }
}

/// A property value, discriminated by the source's `type` field
///
/// Only the text-bearing types carry content; everything else (numbers,
/// selects, dates, ...) deserializes as `Unsupported`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        #[serde(default)]
        title: Vec<TextRun>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<TextRun>,
    },
    #[serde(other)]
    Unsupported,
}

impl PropertyValue {
    /// Concatenated plain text of all runs, or `None` for non-text types
    pub fn plain_text(&self) -> Option<String> {
        let runs = match self {
            PropertyValue::Title { title } => title,
            PropertyValue::RichText { rich_text } => rich_text,
            PropertyValue::Unsupported => return None,
        };
        Some(runs.iter().map(|run| run.plain_text.as_str()).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    #[serde(default)]
    pub plain_text: String,
}

impl TextRun {
    pub fn plain(text: &str) -> Self {
        Self {
            plain_text: text.to_string(),
        }
    }
}
