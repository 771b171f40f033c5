use async_trait::async_trait;
use tracing::info;

use shared_models::Notification;

use crate::SendError;

/// Delivery capability for a single notification (sms gateway, mailer, ...).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), SendError>;
}

/// Stand-in for real SMS/email providers: records the delivery in the log.
#[derive(Debug, Default, Clone)]
pub struct LoggingSender;

#[async_trait]
impl NotificationSender for LoggingSender {
    async fn send(&self, notification: &Notification) -> Result<(), SendError> {
        info!(
            "sending {} notification {} for appointment {} (send_at={})",
            notification.kind, notification.id, notification.appointment_id, notification.send_at
        );
        Ok(())
    }
}
