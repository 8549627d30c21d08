//! The notification dispatch contract.

use async_trait::async_trait;
use permio_shared::EmployeeId;
use thiserror::Error;

use super::types::NotificationEvent;

/// Errors from the notification sink.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Records notification events for delivery to the notification-bell UI.
///
/// Delivery is at-least-once: the engine may dispatch the same transition
/// twice (e.g. after a timed-out retry), so implementations must treat
/// `(request_id, kind)` as an idempotency key and record it once.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Records one event; a duplicate of an already-recorded
    /// `(request_id, kind)` pair is a no-op.
    async fn dispatch(&self, event: &NotificationEvent) -> Result<(), NotificationError>;

    /// Returns the feed for one recipient, newest first.
    async fn for_recipient(
        &self,
        recipient_id: EmployeeId,
    ) -> Result<Vec<NotificationEvent>, NotificationError>;
}

#[async_trait]
impl<T> NotificationSink for std::sync::Arc<T>
where
    T: NotificationSink + ?Sized,
{
    async fn dispatch(&self, event: &NotificationEvent) -> Result<(), NotificationError> {
        (**self).dispatch(event).await
    }

    async fn for_recipient(
        &self,
        recipient_id: EmployeeId,
    ) -> Result<Vec<NotificationEvent>, NotificationError> {
        (**self).for_recipient(recipient_id).await
    }
}
