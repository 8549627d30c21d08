//! Workflow service for request state transitions.
//!
//! This module implements the core state machine logic for transitioning
//! requests through the approval workflow. All methods are pure: they look
//! at the current status and produce a [`RequestAction`] or a typed guard
//! failure, without touching any store.

use chrono::Utc;
use permio_shared::EmployeeId;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::{RequestAction, RequestStatus};

/// Stateless service for validating request workflow transitions.
pub struct WorkflowService;

impl WorkflowService {
    /// Approve a pending request.
    ///
    /// # Returns
    /// * `Ok(RequestAction::Approve)` if the request is pending
    /// * `Err(WorkflowError::AlreadyDecided)` if already approved/rejected
    /// * `Err(WorkflowError::NotPending)` if cancelled
    pub fn approve(
        current_status: RequestStatus,
        approver_id: EmployeeId,
        comments: Option<String>,
    ) -> Result<RequestAction, WorkflowError> {
        match current_status {
            RequestStatus::Pending => Ok(RequestAction::Approve {
                new_status: RequestStatus::Approved,
                approver_id,
                comments,
                decided_at: Utc::now(),
            }),
            RequestStatus::Approved | RequestStatus::Rejected => {
                Err(WorkflowError::AlreadyDecided)
            }
            RequestStatus::Cancelled => Err(WorkflowError::NotPending {
                status: current_status,
            }),
        }
    }

    /// Reject a pending request.
    ///
    /// Rejections must be explainable: a blank comment is refused.
    ///
    /// # Returns
    /// * `Ok(RequestAction::Reject)` if the request is pending
    /// * `Err(WorkflowError::MissingRejectionComment)` if the comment is blank
    /// * `Err(WorkflowError::AlreadyDecided)` if already approved/rejected
    /// * `Err(WorkflowError::NotPending)` if cancelled
    pub fn reject(
        current_status: RequestStatus,
        approver_id: EmployeeId,
        comments: String,
    ) -> Result<RequestAction, WorkflowError> {
        if comments.trim().is_empty() {
            return Err(WorkflowError::MissingRejectionComment);
        }

        match current_status {
            RequestStatus::Pending => Ok(RequestAction::Reject {
                new_status: RequestStatus::Rejected,
                approver_id,
                comments,
                decided_at: Utc::now(),
            }),
            RequestStatus::Approved | RequestStatus::Rejected => {
                Err(WorkflowError::AlreadyDecided)
            }
            RequestStatus::Cancelled => Err(WorkflowError::NotPending {
                status: current_status,
            }),
        }
    }

    /// Withdraw a pending request.
    ///
    /// Only the original requester may cancel, and only before a decision.
    ///
    /// # Returns
    /// * `Ok(RequestAction::Cancel)` if the actor is the requester and the
    ///   request is pending
    /// * `Err(WorkflowError::NotRequester)` if someone else tries
    /// * `Err(WorkflowError::NotPending)` otherwise
    pub fn cancel(
        current_status: RequestStatus,
        actor_id: EmployeeId,
        requester_id: EmployeeId,
    ) -> Result<RequestAction, WorkflowError> {
        if actor_id != requester_id {
            return Err(WorkflowError::NotRequester);
        }

        match current_status {
            RequestStatus::Pending => Ok(RequestAction::Cancel {
                new_status: RequestStatus::Cancelled,
                cancelled_by: actor_id,
                cancelled_at: Utc::now(),
            }),
            _ => Err(WorkflowError::NotPending {
                status: current_status,
            }),
        }
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Pending → Approved (approve)
    /// - Pending → Rejected (reject)
    /// - Pending → Cancelled (cancel)
    #[must_use]
    pub fn is_valid_transition(from: RequestStatus, to: RequestStatus) -> bool {
        matches!(
            (from, to),
            (
                RequestStatus::Pending,
                RequestStatus::Approved | RequestStatus::Rejected | RequestStatus::Cancelled
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approve_from_pending() {
        let approver = EmployeeId::new();
        let result = WorkflowService::approve(RequestStatus::Pending, approver, None);
        assert!(result.is_ok());
        let action = result.unwrap();
        assert_eq!(action.new_status(), RequestStatus::Approved);
        assert_eq!(action.actor(), approver);
    }

    #[test]
    fn test_approve_decided_fails() {
        let approver = EmployeeId::new();
        for status in [RequestStatus::Approved, RequestStatus::Rejected] {
            let result = WorkflowService::approve(status, approver, None);
            assert!(matches!(result, Err(WorkflowError::AlreadyDecided)));
        }
    }

    #[test]
    fn test_approve_cancelled_fails() {
        let result = WorkflowService::approve(RequestStatus::Cancelled, EmployeeId::new(), None);
        assert!(matches!(result, Err(WorkflowError::NotPending { .. })));
    }

    #[test]
    fn test_approve_with_empty_comment_is_fine() {
        let result = WorkflowService::approve(RequestStatus::Pending, EmployeeId::new(), None);
        assert!(result.is_ok());
    }

    #[test]
    fn test_reject_from_pending() {
        let result = WorkflowService::reject(
            RequestStatus::Pending,
            EmployeeId::new(),
            "Team is short-staffed that week".to_string(),
        );
        assert!(result.is_ok());
        assert_eq!(result.unwrap().new_status(), RequestStatus::Rejected);
    }

    #[test]
    fn test_reject_empty_comment_fails() {
        let result =
            WorkflowService::reject(RequestStatus::Pending, EmployeeId::new(), String::new());
        assert!(matches!(
            result,
            Err(WorkflowError::MissingRejectionComment)
        ));
    }

    #[test]
    fn test_reject_whitespace_comment_fails() {
        let result = WorkflowService::reject(
            RequestStatus::Pending,
            EmployeeId::new(),
            "   ".to_string(),
        );
        assert!(matches!(
            result,
            Err(WorkflowError::MissingRejectionComment)
        ));
    }

    #[test]
    fn test_cancel_by_requester() {
        let requester = EmployeeId::new();
        let result = WorkflowService::cancel(RequestStatus::Pending, requester, requester);
        assert!(result.is_ok());
        assert_eq!(result.unwrap().new_status(), RequestStatus::Cancelled);
    }

    #[test]
    fn test_cancel_by_other_fails() {
        let result =
            WorkflowService::cancel(RequestStatus::Pending, EmployeeId::new(), EmployeeId::new());
        assert!(matches!(result, Err(WorkflowError::NotRequester)));
    }

    #[test]
    fn test_cancel_approved_fails() {
        let requester = EmployeeId::new();
        let result = WorkflowService::cancel(RequestStatus::Approved, requester, requester);
        assert!(matches!(
            result,
            Err(WorkflowError::NotPending {
                status: RequestStatus::Approved
            })
        ));
    }

    #[test]
    fn test_is_valid_transition() {
        // Valid transitions
        assert!(WorkflowService::is_valid_transition(
            RequestStatus::Pending,
            RequestStatus::Approved
        ));
        assert!(WorkflowService::is_valid_transition(
            RequestStatus::Pending,
            RequestStatus::Rejected
        ));
        assert!(WorkflowService::is_valid_transition(
            RequestStatus::Pending,
            RequestStatus::Cancelled
        ));

        // Invalid transitions
        assert!(!WorkflowService::is_valid_transition(
            RequestStatus::Approved,
            RequestStatus::Rejected
        ));
        assert!(!WorkflowService::is_valid_transition(
            RequestStatus::Cancelled,
            RequestStatus::Pending
        ));
        assert!(!WorkflowService::is_valid_transition(
            RequestStatus::Rejected,
            RequestStatus::Approved
        ));
    }
}
