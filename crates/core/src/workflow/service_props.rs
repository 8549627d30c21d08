//! Property-based tests for WorkflowService.
//!
//! These tests validate the transition guards with randomized inputs.

use permio_shared::EmployeeId;
use proptest::prelude::*;
use uuid::Uuid;

use crate::workflow::error::WorkflowError;
use crate::workflow::service::WorkflowService;
use crate::workflow::types::{RequestAction, RequestStatus};

/// Strategy for generating random RequestStatus values.
fn arb_status() -> impl Strategy<Value = RequestStatus> {
    prop_oneof![
        Just(RequestStatus::Pending),
        Just(RequestStatus::Approved),
        Just(RequestStatus::Rejected),
        Just(RequestStatus::Cancelled),
    ]
}

/// Strategy for generating random employee IDs.
fn arb_employee_id() -> impl Strategy<Value = EmployeeId> {
    any::<u128>().prop_map(|n| EmployeeId::from_uuid(Uuid::from_u128(n)))
}

/// Strategy for generating non-blank comments.
fn arb_comment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9 ]{0,80}".prop_map(String::from)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Approve succeeds exactly from Pending, and from nowhere else.
    #[test]
    fn prop_approve_only_from_pending(
        status in arb_status(),
        approver in arb_employee_id(),
    ) {
        let result = WorkflowService::approve(status, approver, None);
        if status == RequestStatus::Pending {
            let action = result.unwrap();
            prop_assert_eq!(action.new_status(), RequestStatus::Approved);
            prop_assert_eq!(action.actor(), approver);
        } else {
            prop_assert!(result.is_err());
        }
    }

    /// Reject with a real comment succeeds exactly from Pending.
    #[test]
    fn prop_reject_only_from_pending(
        status in arb_status(),
        approver in arb_employee_id(),
        comment in arb_comment(),
    ) {
        let result = WorkflowService::reject(status, approver, comment.clone());
        if status == RequestStatus::Pending {
            let action = result.unwrap();
            prop_assert_eq!(action.new_status(), RequestStatus::Rejected);
            if let RequestAction::Reject { comments, .. } = action {
                prop_assert_eq!(comments, comment);
            } else {
                prop_assert!(false, "Expected Reject action");
            }
        } else {
            prop_assert!(result.is_err());
        }
    }

    /// A blank comment always fails a rejection, whatever the status.
    #[test]
    fn prop_reject_blank_comment_always_fails(
        status in arb_status(),
        approver in arb_employee_id(),
        spaces in " {0,10}",
    ) {
        let result = WorkflowService::reject(status, approver, spaces);
        prop_assert!(matches!(
            result,
            Err(WorkflowError::MissingRejectionComment)
        ));
    }

    /// Cancel succeeds only when the actor is the requester and the
    /// request is still pending.
    #[test]
    fn prop_cancel_requires_requester_and_pending(
        status in arb_status(),
        actor in arb_employee_id(),
        requester in arb_employee_id(),
    ) {
        let result = WorkflowService::cancel(status, actor, requester);
        match result {
            Ok(action) => {
                prop_assert_eq!(status, RequestStatus::Pending);
                prop_assert_eq!(actor, requester);
                prop_assert_eq!(action.new_status(), RequestStatus::Cancelled);
            }
            Err(WorkflowError::NotRequester) => prop_assert_ne!(actor, requester),
            Err(WorkflowError::NotPending { .. }) => {
                prop_assert_eq!(actor, requester);
                prop_assert_ne!(status, RequestStatus::Pending);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    /// Every action the service produces is a valid transition, and no
    /// action ever leaves a terminal state.
    #[test]
    fn prop_service_agrees_with_transition_table(
        status in arb_status(),
        actor in arb_employee_id(),
        comment in arb_comment(),
    ) {
        let attempts = [
            WorkflowService::approve(status, actor, None),
            WorkflowService::reject(status, actor, comment),
            WorkflowService::cancel(status, actor, actor),
        ];
        for result in attempts {
            if let Ok(action) = result {
                prop_assert!(WorkflowService::is_valid_transition(
                    status,
                    action.new_status()
                ));
                prop_assert!(!status.is_terminal());
            }
        }
    }
}
