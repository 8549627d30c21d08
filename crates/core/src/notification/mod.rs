//! Notification fan-out for workflow transitions.
//!
//! Every state change produces a [`NotificationEvent`] for the employee
//! and/or approver. Dispatch is fire-and-forget relative to the workflow
//! transaction: it runs after the transition is durable, and a dispatch
//! failure never blocks or reverses state changes. Delivery is
//! at-least-once; the receiving side deduplicates on the natural key
//! `(request_id, kind)`.

pub mod sink;
pub mod types;

pub use sink::{NotificationError, NotificationSink};
pub use types::{NotificationEvent, NotificationKind};
