//! Workflow domain types for the request lifecycle.
//!
//! This module defines the core types used for managing request status
//! transitions and workflow commands.

use chrono::{DateTime, NaiveDate, Utc};
use permio_shared::{DecisionId, EmployeeId, RequestId, ReservationId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of request an employee can file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    /// Paid vacation days, debited from the balance.
    Vacation,
    /// Leave of absence, debited from the balance.
    Leave,
    /// A work/salary certificate; consumes no balance.
    Certificate,
}

impl RequestType {
    /// Parses a type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "vacation" => Some(Self::Vacation),
            "leave" => Some(Self::Leave),
            "certificate" => Some(Self::Certificate),
            _ => None,
        }
    }

    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vacation => "vacation",
            Self::Leave => "leave",
            Self::Certificate => "certificate",
        }
    }

    /// Returns true if this type debits the vacation-day ledger.
    #[must_use]
    pub fn requires_balance(&self) -> bool {
        matches!(self, Self::Vacation | Self::Leave)
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request status in the approval workflow.
///
/// The valid transitions are:
/// - Pending → Approved (approve)
/// - Pending → Rejected (reject)
/// - Pending → Cancelled (cancel, requester only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Filed and awaiting a decision.
    Pending,
    /// Decided in favour (terminal).
    Approved,
    /// Decided against (terminal).
    Rejected,
    /// Withdrawn by the requester before a decision (terminal).
    Cancelled,
}

impl RequestStatus {
    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true once the request can no longer change.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns true if an approver decided the request.
    #[must_use]
    pub fn is_decided(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of an approval decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionOutcome {
    /// The request was approved.
    Approved,
    /// The request was rejected.
    Rejected,
}

impl DecisionOutcome {
    /// Parses an outcome from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns the string representation of the outcome.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// A time-off/leave/certificate request.
///
/// Never physically deleted (cancellation is a status), to preserve the
/// audit history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Unique identifier.
    pub id: RequestId,
    /// The requesting employee.
    pub employee_id: EmployeeId,
    /// Kind of request.
    pub request_type: RequestType,
    /// First day requested.
    pub start_date: NaiveDate,
    /// Last day requested; None for certificates.
    pub end_date: Option<NaiveDate>,
    /// Inclusive business-day count; 0 for certificates.
    pub requested_days: u32,
    /// Current workflow status.
    pub status: RequestStatus,
    /// Free-form text the requester attached.
    pub comments: Option<String>,
    /// The employee who decided the request, once decided.
    pub approver_id: Option<EmployeeId>,
    /// The ledger hold backing this request, when the type debits days.
    pub reservation_id: Option<ReservationId>,
    /// When the request was filed.
    pub created_at: DateTime<Utc>,
    /// When the request was decided or cancelled.
    pub decided_at: Option<DateTime<Utc>>,
    /// Monotonic counter for optimistic concurrency.
    pub version: i64,
}

/// Input for persisting a freshly validated request.
#[derive(Debug, Clone)]
pub struct NewRequest {
    /// Identifier assigned by the engine.
    pub id: RequestId,
    /// The requesting employee.
    pub employee_id: EmployeeId,
    /// Kind of request.
    pub request_type: RequestType,
    /// First day requested.
    pub start_date: NaiveDate,
    /// Last day requested; None for certificates.
    pub end_date: Option<NaiveDate>,
    /// Inclusive business-day count; 0 for certificates.
    pub requested_days: u32,
    /// Free-form text the requester attached.
    pub comments: Option<String>,
    /// The ledger hold backing this request, when the type debits days.
    pub reservation_id: Option<ReservationId>,
}

/// An immutable record of an approve/reject decision.
///
/// At most one decision ever exists per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalDecision {
    /// Unique identifier.
    pub id: DecisionId,
    /// The decided request.
    pub request_id: RequestId,
    /// Who decided.
    pub approver_id: EmployeeId,
    /// Approved or rejected.
    pub outcome: DecisionOutcome,
    /// The approver's comments; always present for rejections.
    pub comments: Option<String>,
    /// When the decision was made.
    pub decided_at: DateTime<Utc>,
}

/// A validated state transition with audit data.
///
/// Each variant captures the action performed, the resulting status,
/// and who performed it when.
#[derive(Debug, Clone)]
pub enum RequestAction {
    /// Approve a pending request.
    Approve {
        /// The new status after approval.
        new_status: RequestStatus,
        /// The employee who approved the request.
        approver_id: EmployeeId,
        /// Optional notes from the approver.
        comments: Option<String>,
        /// When the request was approved.
        decided_at: DateTime<Utc>,
    },
    /// Reject a pending request.
    Reject {
        /// The new status after rejection.
        new_status: RequestStatus,
        /// The employee who rejected the request.
        approver_id: EmployeeId,
        /// The mandatory explanation for the rejection.
        comments: String,
        /// When the request was rejected.
        decided_at: DateTime<Utc>,
    },
    /// Withdraw a pending request.
    Cancel {
        /// The new status after cancellation.
        new_status: RequestStatus,
        /// The requester withdrawing the request.
        cancelled_by: EmployeeId,
        /// When the request was withdrawn.
        cancelled_at: DateTime<Utc>,
    },
}

impl RequestAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> RequestStatus {
        match self {
            Self::Approve { new_status, .. }
            | Self::Reject { new_status, .. }
            | Self::Cancel { new_status, .. } => *new_status,
        }
    }

    /// Returns the employee performing the action.
    #[must_use]
    pub fn actor(&self) -> EmployeeId {
        match self {
            Self::Approve { approver_id, .. } | Self::Reject { approver_id, .. } => *approver_id,
            Self::Cancel { cancelled_by, .. } => *cancelled_by,
        }
    }

    /// Builds the decision row this action produces, if any.
    ///
    /// Cancellation is not a decision and yields None.
    #[must_use]
    pub fn decision(&self, request_id: RequestId) -> Option<ApprovalDecision> {
        match self {
            Self::Approve {
                approver_id,
                comments,
                decided_at,
                ..
            } => Some(ApprovalDecision {
                id: DecisionId::new(),
                request_id,
                approver_id: *approver_id,
                outcome: DecisionOutcome::Approved,
                comments: comments.clone(),
                decided_at: *decided_at,
            }),
            Self::Reject {
                approver_id,
                comments,
                decided_at,
                ..
            } => Some(ApprovalDecision {
                id: DecisionId::new(),
                request_id,
                approver_id: *approver_id,
                outcome: DecisionOutcome::Rejected,
                comments: Some(comments.clone()),
                decided_at: *decided_at,
            }),
            Self::Cancel { .. } => None,
        }
    }
}

/// Command to file a new request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequest {
    /// The requesting employee.
    pub employee_id: EmployeeId,
    /// Kind of request.
    pub request_type: RequestType,
    /// First day requested.
    pub start_date: NaiveDate,
    /// Last day requested; required for vacation/leave.
    pub end_date: Option<NaiveDate>,
    /// Free-form text attached by the requester.
    pub comments: Option<String>,
}

/// Command to approve or reject a pending request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecideRequest {
    /// The request to decide.
    pub request_id: RequestId,
    /// The acting employee (resolved identity).
    pub actor_id: EmployeeId,
    /// Approve or reject.
    pub outcome: DecisionOutcome,
    /// Approver comments; mandatory for rejections.
    pub comments: Option<String>,
}

/// Command to withdraw a pending request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelRequest {
    /// The request to withdraw.
    pub request_id: RequestId,
    /// The acting employee (must be the requester).
    pub actor_id: EmployeeId,
}
