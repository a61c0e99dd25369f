//! Alert rules, quotes and the notifications they produce

use serde::{Deserialize, Serialize};
use std::fmt;

/// A ticker plus a human-authored condition, resolved from one source row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRule {
    pub ticker: String,
    pub condition: String,
    pub context: String,
}

impl AlertRule {
    pub fn new(ticker: &str, condition: &str, context: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            condition: condition.to_string(),
            context: context.to_string(),
        }
    }
}

/// Latest closing price for a ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub ticker: String,
    pub price: f64,
}

/// Message sent when a rule's condition holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertNotification {
    pub ticker: String,
    pub price: f64,
    pub condition: String,
    pub context: String,
}

impl AlertNotification {
    pub fn new(rule: &AlertRule, price: f64) -> Self {
        Self {
            ticker: rule.ticker.clone(),
            price,
            condition: rule.condition.clone(),
            context: rule.context.clone(),
        }
    }

    /// Telegram HTML rendering; user-authored fields are escaped
    pub fn to_html(&self) -> String {
        format!(
            concat!(
                "🚨 <b>STOCK ALERT</b>\n\n",
                "📈 <b>{}</b> price <b>${:.2}</b> meets condition <b>{}</b>\n\n",
                "💭 Context: {}",
            ),
            escape_html(&self.ticker),
            self.price,
            escape_html(&self.condition),
            escape_html(&self.context),
        )
    }
}

impl fmt::Display for AlertNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "STOCK ALERT: {} price ${:.2} meets condition {}",
            self.ticker, self.price, self.condition
        )?;
        if !self.context.is_empty() {
            write!(f, " | Context: {}", self.context)?;
        }
        Ok(())
    }
}

/// Escape the three characters Telegram's HTML parse mode treats as markup
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}
