//! Property-based tests for the approval policy.

use chrono::{NaiveDate, Utc};
use permio_shared::{EmployeeId, RequestId};
use proptest::prelude::*;
use uuid::Uuid;

use crate::employee::types::{AccessLevel, Employee, EmployeeStatus};
use crate::workflow::error::WorkflowError;
use crate::workflow::policy::ApprovalPolicy;
use crate::workflow::types::{Request, RequestStatus, RequestType};

fn arb_employee_id() -> impl Strategy<Value = EmployeeId> {
    any::<u128>().prop_map(|n| EmployeeId::from_uuid(Uuid::from_u128(n)))
}

fn arb_level() -> impl Strategy<Value = AccessLevel> {
    prop_oneof![
        Just(AccessLevel::Employee),
        Just(AccessLevel::Manager),
        Just(AccessLevel::Hr),
        Just(AccessLevel::Admin),
    ]
}

fn arb_status() -> impl Strategy<Value = RequestStatus> {
    prop_oneof![
        Just(RequestStatus::Pending),
        Just(RequestStatus::Approved),
        Just(RequestStatus::Rejected),
        Just(RequestStatus::Cancelled),
    ]
}

fn employee(id: EmployeeId, level: AccessLevel, manager_id: Option<EmployeeId>) -> Employee {
    Employee {
        id,
        full_name: "Prop Employee".to_string(),
        access_level: level,
        manager_id,
        status: EmployeeStatus::Active,
    }
}

fn request(employee_id: EmployeeId, status: RequestStatus) -> Request {
    Request {
        id: RequestId::new(),
        employee_id,
        request_type: RequestType::Vacation,
        start_date: NaiveDate::from_ymd_opt(2026, 9, 7).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 9, 11).unwrap().into(),
        requested_days: 5,
        status,
        comments: None,
        approver_id: None,
        reservation_id: None,
        created_at: Utc::now(),
        decided_at: None,
        version: 0,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Self-approval always fails, for every access level and status.
    #[test]
    fn prop_self_approval_always_denied(
        id in arb_employee_id(),
        level in arb_level(),
        status in arb_status(),
    ) {
        let requester = employee(id, level, None);
        let req = request(id, status);
        let result = ApprovalPolicy::authorize_decision(&req, &requester, &requester);
        prop_assert!(matches!(result, Err(WorkflowError::SelfApproval)));
    }

    /// An actor at Employee level is never authorized, whoever they are.
    #[test]
    fn prop_plain_employee_never_authorized(
        requester_id in arb_employee_id(),
        actor_id in arb_employee_id(),
        actor_is_manager_of_requester in any::<bool>(),
    ) {
        prop_assume!(requester_id != actor_id);
        let manager_id = actor_is_manager_of_requester.then_some(actor_id);
        let requester = employee(requester_id, AccessLevel::Employee, manager_id);
        let actor = employee(actor_id, AccessLevel::Employee, None);
        let req = request(requester_id, RequestStatus::Pending);

        let result = ApprovalPolicy::authorize_decision(&req, &requester, &actor);
        let matched = matches!(result, Err(WorkflowError::Unauthorized { .. }));
        prop_assert!(matched);
    }

    /// A manager is authorized iff they are the requester's direct manager.
    #[test]
    fn prop_manager_needs_direct_report(
        requester_id in arb_employee_id(),
        actor_id in arb_employee_id(),
        other_manager in arb_employee_id(),
        is_direct in any::<bool>(),
    ) {
        prop_assume!(requester_id != actor_id && actor_id != other_manager);
        let manager_id = if is_direct { actor_id } else { other_manager };
        let requester = employee(requester_id, AccessLevel::Employee, Some(manager_id));
        let actor = employee(actor_id, AccessLevel::Manager, None);
        let req = request(requester_id, RequestStatus::Pending);

        let result = ApprovalPolicy::authorize_decision(&req, &requester, &actor);
        if is_direct {
            prop_assert!(result.is_ok());
        } else {
            let matched = matches!(result, Err(WorkflowError::Unauthorized { .. }));
            prop_assert!(matched);
        }
    }

    /// HR and Admin decide for anyone, regardless of the manager chain.
    #[test]
    fn prop_hr_admin_decide_for_anyone(
        requester_id in arb_employee_id(),
        actor_id in arb_employee_id(),
        manager in arb_employee_id(),
        is_hr in any::<bool>(),
    ) {
        prop_assume!(requester_id != actor_id);
        let level = if is_hr { AccessLevel::Hr } else { AccessLevel::Admin };
        let requester = employee(requester_id, AccessLevel::Employee, Some(manager));
        let actor = employee(actor_id, level, None);
        let req = request(requester_id, RequestStatus::Pending);

        prop_assert!(ApprovalPolicy::authorize_decision(&req, &requester, &actor).is_ok());
    }

    /// No non-Pending request is ever decidable.
    #[test]
    fn prop_non_pending_never_decidable(
        requester_id in arb_employee_id(),
        actor_id in arb_employee_id(),
        level in arb_level(),
        status in arb_status(),
    ) {
        prop_assume!(requester_id != actor_id);
        prop_assume!(status != RequestStatus::Pending);
        let requester = employee(requester_id, AccessLevel::Employee, Some(actor_id));
        let actor = employee(actor_id, level, None);
        let req = request(requester_id, status);

        let result = ApprovalPolicy::authorize_decision(&req, &requester, &actor);
        let matched = matches!(
            result,
            Err(WorkflowError::AlreadyDecided) | Err(WorkflowError::NotPending { .. })
        );
        prop_assert!(matched);
    }

    /// A suspended or inactive actor is always refused.
    #[test]
    fn prop_inactive_actor_always_denied(
        requester_id in arb_employee_id(),
        actor_id in arb_employee_id(),
        level in arb_level(),
        suspended in any::<bool>(),
    ) {
        prop_assume!(requester_id != actor_id);
        let requester = employee(requester_id, AccessLevel::Employee, Some(actor_id));
        let mut actor = employee(actor_id, level, None);
        actor.status = if suspended {
            EmployeeStatus::Suspended
        } else {
            EmployeeStatus::Inactive
        };
        let req = request(requester_id, RequestStatus::Pending);

        let result = ApprovalPolicy::authorize_decision(&req, &requester, &actor);
        prop_assert!(matches!(result, Err(WorkflowError::EmployeeInactive(_))));
    }
}
