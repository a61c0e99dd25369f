//! Shared data models spanning the monitor layers.

pub mod alert;
pub mod record;

pub use alert::{escape_html, AlertNotification, AlertRule, Quote};
pub use record::{PropertyValue, RawRecord, TextRun};
