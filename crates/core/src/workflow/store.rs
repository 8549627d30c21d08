//! The request storage contract.

use async_trait::async_trait;
use permio_shared::{EmployeeId, RequestId};

use super::error::WorkflowError;
use super::types::{ApprovalDecision, NewRequest, Request, RequestAction};

/// Durable record of requests with optimistic concurrency.
///
/// `transition` is a compare-and-swap on the request's `version`: of N
/// concurrent transitions carrying the same expected version, exactly one
/// succeeds and the rest observe [`WorkflowError::ConcurrentModification`].
/// This is the mechanism that closes the double-approval bug class; callers
/// must re-read and re-validate before retrying.
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Persists a new request in Pending status at version 0.
    async fn create(&self, request: NewRequest) -> Result<Request, WorkflowError>;

    /// Loads a request by ID.
    async fn get(&self, id: RequestId) -> Result<Request, WorkflowError>;

    /// Applies `action` if the stored version still equals
    /// `expected_version`, bumping the version and persisting the
    /// action's [`ApprovalDecision`] (if any) in the same atomic unit.
    async fn transition(
        &self,
        id: RequestId,
        expected_version: i64,
        action: &RequestAction,
    ) -> Result<Request, WorkflowError>;

    /// Returns the decision recorded for a request, if any.
    async fn decision(&self, id: RequestId) -> Result<Option<ApprovalDecision>, WorkflowError>;

    /// All requests filed by one employee, newest first.
    async fn list_for_employee(&self, employee_id: EmployeeId)
    -> Result<Vec<Request>, WorkflowError>;

    /// All requests still awaiting a decision, oldest first.
    async fn list_pending(&self) -> Result<Vec<Request>, WorkflowError>;
}

#[async_trait]
impl<T> RequestStore for std::sync::Arc<T>
where
    T: RequestStore + ?Sized,
{
    async fn create(&self, request: NewRequest) -> Result<Request, WorkflowError> {
        (**self).create(request).await
    }

    async fn get(&self, id: RequestId) -> Result<Request, WorkflowError> {
        (**self).get(id).await
    }

    async fn transition(
        &self,
        id: RequestId,
        expected_version: i64,
        action: &RequestAction,
    ) -> Result<Request, WorkflowError> {
        (**self).transition(id, expected_version, action).await
    }

    async fn decision(&self, id: RequestId) -> Result<Option<ApprovalDecision>, WorkflowError> {
        (**self).decision(id).await
    }

    async fn list_for_employee(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<Request>, WorkflowError> {
        (**self).list_for_employee(employee_id).await
    }

    async fn list_pending(&self) -> Result<Vec<Request>, WorkflowError> {
        (**self).list_pending().await
    }
}
