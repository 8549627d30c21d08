//! In-memory request store.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use permio_shared::{EmployeeId, RequestId};
use tracing::debug;

use crate::memory::lock;
use crate::workflow::error::WorkflowError;
use crate::workflow::store::RequestStore;
use crate::workflow::types::{ApprovalDecision, NewRequest, Request, RequestAction, RequestStatus};

#[derive(Debug, Default)]
struct RequestInner {
    requests: HashMap<RequestId, Request>,
    decisions: HashMap<RequestId, ApprovalDecision>,
}

/// Mutex-guarded request store with compare-and-swap transitions.
#[derive(Debug, Default)]
pub struct InMemoryRequestStore {
    inner: Mutex<RequestInner>,
}

impl InMemoryRequestStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn create(&self, request: NewRequest) -> Result<Request, WorkflowError> {
        let stored = Request {
            id: request.id,
            employee_id: request.employee_id,
            request_type: request.request_type,
            start_date: request.start_date,
            end_date: request.end_date,
            requested_days: request.requested_days,
            status: RequestStatus::Pending,
            comments: request.comments,
            approver_id: None,
            reservation_id: request.reservation_id,
            created_at: Utc::now(),
            decided_at: None,
            version: 0,
        };
        let mut inner = lock(&self.inner);
        inner.requests.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: RequestId) -> Result<Request, WorkflowError> {
        lock(&self.inner)
            .requests
            .get(&id)
            .cloned()
            .ok_or(WorkflowError::RequestNotFound(id))
    }

    async fn transition(
        &self,
        id: RequestId,
        expected_version: i64,
        action: &RequestAction,
    ) -> Result<Request, WorkflowError> {
        let mut inner = lock(&self.inner);
        let request = inner
            .requests
            .get_mut(&id)
            .ok_or(WorkflowError::RequestNotFound(id))?;

        // The compare-and-swap: a stale version means another transition
        // won the race and this caller must re-read.
        if request.version != expected_version {
            debug!(
                request_id = %id,
                expected_version,
                actual_version = request.version,
                "transition lost the version race"
            );
            return Err(WorkflowError::ConcurrentModification);
        }

        match action {
            RequestAction::Approve {
                new_status,
                approver_id,
                decided_at,
                ..
            }
            | RequestAction::Reject {
                new_status,
                approver_id,
                decided_at,
                ..
            } => {
                request.status = *new_status;
                request.approver_id = Some(*approver_id);
                request.decided_at = Some(*decided_at);
            }
            RequestAction::Cancel {
                new_status,
                cancelled_at,
                ..
            } => {
                request.status = *new_status;
                request.decided_at = Some(*cancelled_at);
            }
        }
        request.version += 1;
        let updated = request.clone();

        if let Some(decision) = action.decision(id) {
            inner.decisions.insert(id, decision);
        }

        Ok(updated)
    }

    async fn decision(&self, id: RequestId) -> Result<Option<ApprovalDecision>, WorkflowError> {
        Ok(lock(&self.inner).decisions.get(&id).cloned())
    }

    async fn list_for_employee(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<Request>, WorkflowError> {
        let inner = lock(&self.inner);
        let mut requests: Vec<_> = inner
            .requests
            .values()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn list_pending(&self) -> Result<Vec<Request>, WorkflowError> {
        let inner = lock(&self.inner);
        let mut requests: Vec<_> = inner
            .requests
            .values()
            .filter(|r| r.status == RequestStatus::Pending)
            .cloned()
            .collect();
        requests.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(requests)
    }
}
