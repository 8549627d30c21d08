//! Request repository with optimistic concurrency.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tracing::debug;

use permio_core::workflow::store::RequestStore;
use permio_core::workflow::types::{
    ApprovalDecision, DecisionOutcome, NewRequest, Request, RequestAction, RequestStatus,
    RequestType,
};
use permio_core::workflow::WorkflowError;
use permio_shared::{DecisionId, EmployeeId, RequestId, ReservationId};

use crate::entities::{approval_decisions, requests, sea_orm_active_enums};

/// Postgres-backed [`RequestStore`].
///
/// `transition` serializes writers with a row lock and refuses stale
/// versions, so of N concurrent transitions exactly one succeeds.
#[derive(Debug, Clone)]
pub struct SeaOrmRequestStore {
    db: DatabaseConnection,
}

impl SeaOrmRequestStore {
    /// Creates a new request store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RequestStore for SeaOrmRequestStore {
    async fn create(&self, request: NewRequest) -> Result<Request, WorkflowError> {
        let now = Utc::now();
        let active = requests::ActiveModel {
            id: Set(request.id.into_inner()),
            employee_id: Set(request.employee_id.into_inner()),
            request_type: Set(type_to_db(request.request_type)),
            start_date: Set(request.start_date),
            end_date: Set(request.end_date),
            requested_days: Set(days_to_db(request.requested_days)?),
            status: Set(sea_orm_active_enums::RequestStatus::Pending),
            comments: Set(request.comments),
            approver_id: Set(None),
            reservation_id: Set(request.reservation_id.map(ReservationId::into_inner)),
            created_at: Set(now.into()),
            decided_at: Set(None),
            version: Set(0),
        };

        let model = active.insert(&self.db).await.map_err(db_err)?;
        debug!(request_id = %model.id, "request row created");
        model_to_core(model)
    }

    async fn get(&self, id: RequestId) -> Result<Request, WorkflowError> {
        let model = requests::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::RequestNotFound(id))?;
        model_to_core(model)
    }

    async fn transition(
        &self,
        id: RequestId,
        expected_version: i64,
        action: &RequestAction,
    ) -> Result<Request, WorkflowError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        // The row lock serializes concurrent writers; the version check
        // then tells latecomers that someone else already transitioned.
        let model = requests::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(WorkflowError::RequestNotFound(id))?;

        if model.version != expected_version {
            debug!(
                request_id = %id,
                expected_version,
                actual_version = model.version,
                "transition lost the version race"
            );
            return Err(WorkflowError::ConcurrentModification);
        }

        let mut active: requests::ActiveModel = model.into();
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
                active.status = Set(status_to_db(*new_status));
                active.approver_id = Set(Some(approver_id.into_inner()));
                active.decided_at = Set(Some((*decided_at).into()));
            }
            RequestAction::Cancel {
                new_status,
                cancelled_at,
                ..
            } => {
                active.status = Set(status_to_db(*new_status));
                active.decided_at = Set(Some((*cancelled_at).into()));
            }
        }
        active.version = Set(expected_version + 1);

        let updated = active.update(&txn).await.map_err(db_err)?;

        if let Some(decision) = action.decision(id) {
            let decision_row = approval_decisions::ActiveModel {
                id: Set(decision.id.into_inner()),
                request_id: Set(decision.request_id.into_inner()),
                approver_id: Set(decision.approver_id.into_inner()),
                outcome: Set(outcome_to_db(decision.outcome)),
                comments: Set(decision.comments),
                decided_at: Set(decision.decided_at.into()),
            };
            decision_row.insert(&txn).await.map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)?;
        model_to_core(updated)
    }

    async fn decision(&self, id: RequestId) -> Result<Option<ApprovalDecision>, WorkflowError> {
        let model = approval_decisions::Entity::find()
            .filter(approval_decisions::Column::RequestId.eq(id.into_inner()))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(decision_to_core))
    }

    async fn list_for_employee(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<Request>, WorkflowError> {
        let models = requests::Entity::find()
            .filter(requests::Column::EmployeeId.eq(employee_id.into_inner()))
            .order_by_desc(requests::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(model_to_core).collect()
    }

    async fn list_pending(&self) -> Result<Vec<Request>, WorkflowError> {
        let models = requests::Entity::find()
            .filter(requests::Column::Status.eq(sea_orm_active_enums::RequestStatus::Pending))
            .order_by_asc(requests::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(model_to_core).collect()
    }
}

// ============================================================================
// Conversion helpers
// ============================================================================

fn db_err(err: sea_orm::DbErr) -> WorkflowError {
    WorkflowError::Storage(err.to_string())
}

fn days_to_db(days: u32) -> Result<i32, WorkflowError> {
    i32::try_from(days).map_err(|_| WorkflowError::Storage("requested days out of range".into()))
}

fn type_to_db(value: RequestType) -> sea_orm_active_enums::RequestType {
    match value {
        RequestType::Vacation => sea_orm_active_enums::RequestType::Vacation,
        RequestType::Leave => sea_orm_active_enums::RequestType::Leave,
        RequestType::Certificate => sea_orm_active_enums::RequestType::Certificate,
    }
}

fn type_to_core(value: &sea_orm_active_enums::RequestType) -> RequestType {
    match value {
        sea_orm_active_enums::RequestType::Vacation => RequestType::Vacation,
        sea_orm_active_enums::RequestType::Leave => RequestType::Leave,
        sea_orm_active_enums::RequestType::Certificate => RequestType::Certificate,
    }
}

fn status_to_db(value: RequestStatus) -> sea_orm_active_enums::RequestStatus {
    match value {
        RequestStatus::Pending => sea_orm_active_enums::RequestStatus::Pending,
        RequestStatus::Approved => sea_orm_active_enums::RequestStatus::Approved,
        RequestStatus::Rejected => sea_orm_active_enums::RequestStatus::Rejected,
        RequestStatus::Cancelled => sea_orm_active_enums::RequestStatus::Cancelled,
    }
}

fn status_to_core(value: &sea_orm_active_enums::RequestStatus) -> RequestStatus {
    match value {
        sea_orm_active_enums::RequestStatus::Pending => RequestStatus::Pending,
        sea_orm_active_enums::RequestStatus::Approved => RequestStatus::Approved,
        sea_orm_active_enums::RequestStatus::Rejected => RequestStatus::Rejected,
        sea_orm_active_enums::RequestStatus::Cancelled => RequestStatus::Cancelled,
    }
}

fn outcome_to_db(value: DecisionOutcome) -> sea_orm_active_enums::DecisionOutcome {
    match value {
        DecisionOutcome::Approved => sea_orm_active_enums::DecisionOutcome::Approved,
        DecisionOutcome::Rejected => sea_orm_active_enums::DecisionOutcome::Rejected,
    }
}

fn outcome_to_core(value: &sea_orm_active_enums::DecisionOutcome) -> DecisionOutcome {
    match value {
        sea_orm_active_enums::DecisionOutcome::Approved => DecisionOutcome::Approved,
        sea_orm_active_enums::DecisionOutcome::Rejected => DecisionOutcome::Rejected,
    }
}

fn model_to_core(model: requests::Model) -> Result<Request, WorkflowError> {
    let requested_days = u32::try_from(model.requested_days)
        .map_err(|_| WorkflowError::Storage("negative requested_days in storage".into()))?;
    Ok(Request {
        id: RequestId::from_uuid(model.id),
        employee_id: EmployeeId::from_uuid(model.employee_id),
        request_type: type_to_core(&model.request_type),
        start_date: model.start_date,
        end_date: model.end_date,
        requested_days,
        status: status_to_core(&model.status),
        comments: model.comments,
        approver_id: model.approver_id.map(EmployeeId::from_uuid),
        reservation_id: model.reservation_id.map(ReservationId::from_uuid),
        created_at: model.created_at.with_timezone(&Utc),
        decided_at: model.decided_at.map(|dt| dt.with_timezone(&Utc)),
        version: model.version,
    })
}

fn decision_to_core(model: approval_decisions::Model) -> ApprovalDecision {
    ApprovalDecision {
        id: DecisionId::from_uuid(model.id),
        request_id: RequestId::from_uuid(model.request_id),
        approver_id: EmployeeId::from_uuid(model.approver_id),
        outcome: outcome_to_core(&model.outcome),
        comments: model.comments,
        decided_at: model.decided_at.with_timezone(&Utc),
    }
}
