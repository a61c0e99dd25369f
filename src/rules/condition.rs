//! Free-text condition parsing (`"<= 100"`, `"≥ 42.5"`, ...)

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Relational operator applied as `price <op> threshold`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
}

impl Comparator {
    /// Prefix-match order. Two-character symbols come first so `<=` is never
    /// read as `<` followed by `=100`.
    pub const ALL: [Comparator; 6] = [
        Comparator::LessEqual,
        Comparator::GreaterEqual,
        Comparator::Equal,
        Comparator::NotEqual,
        Comparator::LessThan,
        Comparator::GreaterThan,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::LessEqual => "<=",
            Comparator::GreaterEqual => ">=",
            Comparator::Equal => "==",
            Comparator::NotEqual => "!=",
            Comparator::LessThan => "<",
            Comparator::GreaterThan => ">",
        }
    }

    pub fn evaluate(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparator::LessEqual => lhs <= rhs,
            Comparator::GreaterEqual => lhs >= rhs,
            Comparator::Equal => lhs == rhs,
            Comparator::NotEqual => lhs != rhs,
            Comparator::LessThan => lhs < rhs,
            Comparator::GreaterThan => lhs > rhs,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParsedCondition {
    pub comparator: Comparator,
    pub threshold: f64,
}

impl ParsedCondition {
    pub fn is_met_by(&self, price: f64) -> bool {
        self.comparator.evaluate(price, self.threshold)
    }
}

impl fmt::Display for ParsedCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.comparator, self.threshold)
    }
}

impl FromStr for ParsedCondition {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_condition(s)
    }
}

/// Parse a condition such as `"<= 100"` or `"≥150"` into comparator and threshold
pub fn parse_condition(text: &str) -> Result<ParsedCondition, ParseError> {
    let normalized = text.replace('≤', "<=").replace('≥', ">=");
    let trimmed = normalized.trim();

    let (comparator, rest) = Comparator::ALL
        .iter()
        .find_map(|c| trimmed.strip_prefix(c.symbol()).map(|rest| (*c, rest)))
        .ok_or_else(|| ParseError::UnknownComparator(text.to_string()))?;

    let threshold_text = rest.trim();
    let threshold = threshold_text
        .parse::<f64>()
        .map_err(|_| ParseError::InvalidThreshold {
            condition: text.to_string(),
            threshold: threshold_text.to_string(),
        })?;

    Ok(ParsedCondition {
        comparator,
        threshold,
    })
}
