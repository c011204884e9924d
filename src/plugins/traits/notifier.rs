use async_trait::async_trait;

use crate::models::StockNotification;
use crate::utils::error::NotifyError;

/// Messaging channel that restock announcements are delivered to.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    /// Verify credentials and resolve the destination channel.
    ///
    /// Polling must not start until this has succeeded.
    async fn connect(&self) -> Result<(), NotifyError>;

    /// Deliver a single message. Callers do not retry on failure.
    async fn send(&self, text: &str) -> Result<(), NotifyError>;

    async fn notify(&self, notification: &StockNotification) -> Result<(), NotifyError> {
        self.send(&notification.message()).await
    }
}
