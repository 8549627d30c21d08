//! In-memory notification sink.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use permio_shared::{EmployeeId, RequestId};

use crate::memory::lock;
use crate::notification::sink::{NotificationError, NotificationSink};
use crate::notification::types::{NotificationEvent, NotificationKind};

#[derive(Debug, Default)]
struct SinkInner {
    events: Vec<NotificationEvent>,
    seen: HashSet<(RequestId, NotificationKind)>,
}

/// Records events in memory, deduplicating on `(request_id, kind)`.
#[derive(Debug, Default)]
pub struct InMemoryNotificationSink {
    inner: Mutex<SinkInner>,
}

impl InMemoryNotificationSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every recorded event, for assertions in tests.
    #[must_use]
    pub fn all(&self) -> Vec<NotificationEvent> {
        lock(&self.inner).events.clone()
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn dispatch(&self, event: &NotificationEvent) -> Result<(), NotificationError> {
        let mut inner = lock(&self.inner);
        if inner.seen.insert(event.dedup_key()) {
            inner.events.push(event.clone());
        }
        Ok(())
    }

    async fn for_recipient(
        &self,
        recipient_id: EmployeeId,
    ) -> Result<Vec<NotificationEvent>, NotificationError> {
        let inner = lock(&self.inner);
        let mut events: Vec<_> = inner
            .events
            .iter()
            .filter(|e| e.recipient_id == recipient_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dispatch_and_read_back() {
        let sink = InMemoryNotificationSink::new();
        let recipient = EmployeeId::new();
        let event = NotificationEvent::new(
            RequestId::new(),
            recipient,
            NotificationKind::Submitted,
        );

        sink.dispatch(&event).await.unwrap();
        let feed = sink.for_recipient(recipient).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].kind, NotificationKind::Submitted);
    }

    #[tokio::test]
    async fn test_duplicate_transition_recorded_once() {
        let sink = InMemoryNotificationSink::new();
        let recipient = EmployeeId::new();
        let request_id = RequestId::new();

        // At-least-once delivery: the same transition may be dispatched twice.
        let first = NotificationEvent::new(request_id, recipient, NotificationKind::Approved);
        let second = NotificationEvent::new(request_id, recipient, NotificationKind::Approved);
        sink.dispatch(&first).await.unwrap();
        sink.dispatch(&second).await.unwrap();

        assert_eq!(sink.for_recipient(recipient).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_different_kinds_both_recorded() {
        let sink = InMemoryNotificationSink::new();
        let recipient = EmployeeId::new();
        let request_id = RequestId::new();

        let submitted = NotificationEvent::new(request_id, recipient, NotificationKind::Submitted);
        let approved = NotificationEvent::new(request_id, recipient, NotificationKind::Approved);
        sink.dispatch(&submitted).await.unwrap();
        sink.dispatch(&approved).await.unwrap();

        assert_eq!(sink.for_recipient(recipient).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_feed_is_per_recipient() {
        let sink = InMemoryNotificationSink::new();
        let a = EmployeeId::new();
        let b = EmployeeId::new();

        let event = NotificationEvent::new(RequestId::new(), a, NotificationKind::Rejected);
        sink.dispatch(&event).await.unwrap();

        assert_eq!(sink.for_recipient(a).await.unwrap().len(), 1);
        assert!(sink.for_recipient(b).await.unwrap().is_empty());
    }
}
