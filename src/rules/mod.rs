//! Alert rule parsing and field extraction

pub mod condition;
pub mod extractor;

pub use condition::{parse_condition, Comparator, ParsedCondition};
pub use extractor::{Extraction, FieldAliases, RowExtractor};
