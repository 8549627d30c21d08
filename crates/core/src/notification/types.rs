//! Notification domain types.

use chrono::{DateTime, Utc};
use permio_shared::{EmployeeId, NotificationId, RequestId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// A request was filed and awaits review.
    Submitted,
    /// The request was approved.
    Approved,
    /// The request was rejected.
    Rejected,
    /// The requester withdrew the request.
    Cancelled,
}

impl NotificationKind {
    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "submitted" => Some(Self::Submitted),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Human-readable message shown in the notification feed.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Submitted => "A new request is waiting for your review",
            Self::Approved => "Your request was approved",
            Self::Rejected => "Your request was rejected",
            Self::Cancelled => "A pending request was withdrawn by the requester",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A notification produced by a workflow transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Unique identifier.
    pub id: NotificationId,
    /// The request the transition happened on.
    pub request_id: RequestId,
    /// Who should see the notification.
    pub recipient_id: EmployeeId,
    /// What happened.
    pub kind: NotificationKind,
    /// Rendered feed message.
    pub message: String,
    /// When the event was produced.
    pub created_at: DateTime<Utc>,
    /// Whether the recipient has seen it (mutated by the read API, not here).
    pub read: bool,
}

impl NotificationEvent {
    /// Builds an unread event with the kind's default message.
    #[must_use]
    pub fn new(request_id: RequestId, recipient_id: EmployeeId, kind: NotificationKind) -> Self {
        Self {
            id: NotificationId::new(),
            request_id,
            recipient_id,
            kind,
            message: kind.message().to_string(),
            created_at: Utc::now(),
            read: false,
        }
    }

    /// The idempotency key receivers deduplicate on.
    #[must_use]
    pub fn dedup_key(&self) -> (RequestId, NotificationKind) {
        (self.request_id, self.kind)
    }
}
