//! Approval policy for request decisions.
//!
//! Pure decision logic, no I/O: given a request, its requester, and the
//! acting employee, determine whether an approve/reject is permitted.
//! The rule is "your own manager, or any HR/Admin": never a peer, and
//! never the requester themself.

use crate::employee::types::{AccessLevel, Employee};
use crate::workflow::error::WorkflowError;
use crate::workflow::types::{Request, RequestStatus};

/// Stateless engine for evaluating decision authorization.
pub struct ApprovalPolicy;

impl ApprovalPolicy {
    /// Checks whether `actor` may decide `request`.
    ///
    /// # Returns
    /// * `Ok(())` if the actor may approve or reject the request
    /// * `Err(WorkflowError::EmployeeInactive)` if the actor cannot act
    /// * `Err(WorkflowError::SelfApproval)` for the requester themself,
    ///   regardless of access level
    /// * `Err(WorkflowError::AlreadyDecided)` / `Err(WorkflowError::NotPending)`
    ///   if the request left the Pending state
    /// * `Err(WorkflowError::Unauthorized)` for peers and non-managing managers
    pub fn authorize_decision(
        request: &Request,
        requester: &Employee,
        actor: &Employee,
    ) -> Result<(), WorkflowError> {
        if !actor.status.is_active() {
            return Err(WorkflowError::EmployeeInactive(actor.id));
        }

        // Self-approval is checked before anything else so that even an
        // Admin requester gets the same refusal.
        if actor.id == request.employee_id {
            return Err(WorkflowError::SelfApproval);
        }

        match request.status {
            RequestStatus::Pending => {}
            RequestStatus::Approved | RequestStatus::Rejected => {
                return Err(WorkflowError::AlreadyDecided);
            }
            RequestStatus::Cancelled => {
                return Err(WorkflowError::NotPending {
                    status: request.status,
                });
            }
        }

        if !actor.access_level.can_decide() {
            return Err(WorkflowError::Unauthorized { actor: actor.id });
        }

        // Managers decide for direct reports only; HR/Admin for anyone.
        if actor.access_level == AccessLevel::Manager
            && requester.manager_id != Some(actor.id)
        {
            return Err(WorkflowError::Unauthorized { actor: actor.id });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employee::types::EmployeeStatus;
    use chrono::{NaiveDate, Utc};
    use permio_shared::{EmployeeId, RequestId};
    use crate::workflow::types::RequestType;

    fn employee(level: AccessLevel, manager_id: Option<EmployeeId>) -> Employee {
        Employee {
            id: EmployeeId::new(),
            full_name: "Test Employee".to_string(),
            access_level: level,
            manager_id,
            status: EmployeeStatus::Active,
        }
    }

    fn pending_request(employee_id: EmployeeId) -> Request {
        Request {
            id: RequestId::new(),
            employee_id,
            request_type: RequestType::Vacation,
            start_date: NaiveDate::from_ymd_opt(2026, 9, 7).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 9, 11).unwrap().into(),
            requested_days: 5,
            status: RequestStatus::Pending,
            comments: None,
            approver_id: None,
            reservation_id: None,
            created_at: Utc::now(),
            decided_at: None,
            version: 0,
        }
    }

    #[test]
    fn test_direct_manager_may_decide() {
        let manager = employee(AccessLevel::Manager, None);
        let requester = employee(AccessLevel::Employee, Some(manager.id));
        let request = pending_request(requester.id);
        assert!(ApprovalPolicy::authorize_decision(&request, &requester, &manager).is_ok());
    }

    #[test]
    fn test_unrelated_manager_may_not_decide() {
        let manager = employee(AccessLevel::Manager, None);
        let other_manager = employee(AccessLevel::Manager, None);
        let requester = employee(AccessLevel::Employee, Some(manager.id));
        let request = pending_request(requester.id);
        let result = ApprovalPolicy::authorize_decision(&request, &requester, &other_manager);
        assert!(matches!(result, Err(WorkflowError::Unauthorized { .. })));
    }

    #[test]
    fn test_hr_and_admin_may_decide_for_anyone() {
        let manager = employee(AccessLevel::Manager, None);
        let requester = employee(AccessLevel::Employee, Some(manager.id));
        let request = pending_request(requester.id);

        for level in [AccessLevel::Hr, AccessLevel::Admin] {
            let actor = employee(level, None);
            assert!(
                ApprovalPolicy::authorize_decision(&request, &requester, &actor).is_ok(),
                "{level} should decide for anyone"
            );
        }
    }

    #[test]
    fn test_peer_may_not_decide() {
        let manager = employee(AccessLevel::Manager, None);
        let requester = employee(AccessLevel::Employee, Some(manager.id));
        let peer = employee(AccessLevel::Employee, Some(manager.id));
        let request = pending_request(requester.id);
        let result = ApprovalPolicy::authorize_decision(&request, &requester, &peer);
        assert!(matches!(result, Err(WorkflowError::Unauthorized { .. })));
    }

    #[test]
    fn test_self_approval_denied_even_for_admin() {
        let mut requester = employee(AccessLevel::Admin, None);
        requester.manager_id = None;
        let request = pending_request(requester.id);
        let result = ApprovalPolicy::authorize_decision(&request, &requester, &requester);
        assert!(matches!(result, Err(WorkflowError::SelfApproval)));
    }

    #[test]
    fn test_inactive_actor_denied() {
        let mut manager = employee(AccessLevel::Manager, None);
        manager.status = EmployeeStatus::Suspended;
        let requester = employee(AccessLevel::Employee, Some(manager.id));
        let request = pending_request(requester.id);
        let result = ApprovalPolicy::authorize_decision(&request, &requester, &manager);
        assert!(matches!(result, Err(WorkflowError::EmployeeInactive(_))));
    }

    #[test]
    fn test_decided_request_refused() {
        let manager = employee(AccessLevel::Manager, None);
        let requester = employee(AccessLevel::Employee, Some(manager.id));
        let mut request = pending_request(requester.id);
        request.status = RequestStatus::Approved;
        let result = ApprovalPolicy::authorize_decision(&request, &requester, &manager);
        assert!(matches!(result, Err(WorkflowError::AlreadyDecided)));
    }

    #[test]
    fn test_cancelled_request_refused() {
        let manager = employee(AccessLevel::Manager, None);
        let requester = employee(AccessLevel::Employee, Some(manager.id));
        let mut request = pending_request(requester.id);
        request.status = RequestStatus::Cancelled;
        let result = ApprovalPolicy::authorize_decision(&request, &requester, &manager);
        assert!(matches!(result, Err(WorkflowError::NotPending { .. })));
    }
}
