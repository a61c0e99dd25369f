//! Price alert monitor
//!
//! Polls a Notion database for alert rules (ticker + condition such as
//! `">= 150"`), checks each against the latest Yahoo Finance close, and sends
//! a Telegram message when a condition holds.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod rules;
pub mod services;
