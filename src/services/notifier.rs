//! Notification sink interface

use crate::error::NotifyError;
use crate::models::AlertNotification;

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one alert to the configured recipient. Fire-and-forget: the
    /// only confirmation is the transport-level acknowledgment.
    async fn send(&self, alert: &AlertNotification) -> Result<(), NotifyError>;
}
