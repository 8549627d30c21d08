//! The workflow engine: orchestration of request creation, decisions, and
//! cancellations.
//!
//! The engine never talks to storage directly. It drives the narrow
//! [`RequestStore`]/[`LedgerStore`]/[`NotificationSink`]/[`EmployeeDirectory`]
//! seams, which keeps it testable with in-memory fakes and safe to run on
//! any number of concurrent instances: it holds no shared mutable state of
//! its own.

use std::future::Future;
use std::time::Duration;

use chrono::{Datelike, Utc};
use permio_shared::config::WorkflowConfig;
use permio_shared::{EmployeeId, PageRequest, PageResponse, RequestId};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::employee::{Employee, EmployeeDirectory};
use crate::ledger::{LedgerStore, VacationBalance};
use crate::notification::{NotificationEvent, NotificationKind, NotificationSink};
use crate::workflow::calendar;
use crate::workflow::error::WorkflowError;
use crate::workflow::policy::ApprovalPolicy;
use crate::workflow::service::WorkflowService;
use crate::workflow::store::RequestStore;
use crate::workflow::types::{
    CancelRequest, CreateRequest, DecideRequest, DecisionOutcome, NewRequest, Request,
    RequestStatus,
};

/// Caller-supplied execution budget for one command.
///
/// Store calls that would run past the deadline fail with
/// [`WorkflowError::Timeout`] and leave state unchanged: every store
/// primitive is individually atomic, and the ledger settles are idempotent
/// given their stable reservation ID, so a timed-out command is safe to
/// retry.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandContext {
    deadline: Option<Instant>,
}

impl CommandContext {
    /// A context with no deadline.
    #[must_use]
    pub fn unbounded() -> Self {
        Self { deadline: None }
    }

    /// A context that expires `timeout` from now.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Remaining budget, if a deadline was set.
    fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}

/// Orchestrates the request lifecycle over the storage seams.
#[derive(Debug, Clone)]
pub struct WorkflowEngine<R, L, N, D> {
    requests: R,
    ledger: L,
    notifications: N,
    directory: D,
    config: WorkflowConfig,
}

impl<R, L, N, D> WorkflowEngine<R, L, N, D>
where
    R: RequestStore,
    L: LedgerStore,
    N: NotificationSink,
    D: EmployeeDirectory,
{
    /// Creates an engine over the given collaborators.
    pub fn new(requests: R, ledger: L, notifications: N, directory: D, config: WorkflowConfig) -> Self {
        Self {
            requests,
            ledger,
            notifications,
            directory,
            config,
        }
    }

    /// Runs a store call against the context's remaining deadline budget.
    async fn bounded<T, F>(
        &self,
        ctx: &CommandContext,
        what: &'static str,
        fut: F,
    ) -> Result<T, WorkflowError>
    where
        F: Future<Output = Result<T, WorkflowError>>,
    {
        match ctx.remaining() {
            None => fut.await,
            Some(remaining) if remaining.is_zero() => Err(WorkflowError::Timeout(what)),
            Some(remaining) => tokio::time::timeout(remaining, fut)
                .await
                .map_err(|_| WorkflowError::Timeout(what))?,
        }
    }

    async fn employee(
        &self,
        ctx: &CommandContext,
        id: EmployeeId,
    ) -> Result<Employee, WorkflowError> {
        self.bounded(ctx, "employee lookup", async {
            self.directory.get(id).await.map_err(WorkflowError::from)
        })
        .await
    }

    /// Files a new request.
    ///
    /// Computes the inclusive business-day count for vacation/leave, holds
    /// the days against the ledger, and persists the request in Pending
    /// status. Reservation and request creation succeed or fail together:
    /// if the persist fails, the freshly made reservation is released so no
    /// hold leaks.
    pub async fn create_request(
        &self,
        cmd: CreateRequest,
        ctx: &CommandContext,
    ) -> Result<Request, WorkflowError> {
        let requester = self.employee(ctx, cmd.employee_id).await?;
        if !requester.status.is_active() {
            return Err(WorkflowError::EmployeeInactive(requester.id));
        }

        let today = Utc::now().date_naive();
        calendar::validate_range(
            cmd.start_date,
            cmd.end_date,
            today,
            self.config.grace_period_days,
        )?;

        let requested_days = if cmd.request_type.requires_balance() {
            let end = cmd.end_date.ok_or_else(|| {
                WorkflowError::InvalidDateRange(format!(
                    "{} requests require an end date",
                    cmd.request_type
                ))
            })?;
            let days = calendar::business_days_between(cmd.start_date, end);
            if days == 0 {
                return Err(WorkflowError::InvalidDateRange(
                    "range contains no business days".to_string(),
                ));
            }
            days
        } else {
            0
        };

        let reservation_id = if cmd.request_type.requires_balance() {
            let year = cmd.start_date.year();
            let id = self
                .bounded(ctx, "balance reservation", async {
                    self.ledger
                        .reserve(cmd.employee_id, year, requested_days)
                        .await
                        .map_err(WorkflowError::from)
                })
                .await?;
            Some(id)
        } else {
            None
        };

        let new_request = NewRequest {
            id: RequestId::new(),
            employee_id: cmd.employee_id,
            request_type: cmd.request_type,
            start_date: cmd.start_date,
            end_date: cmd.end_date,
            requested_days,
            comments: cmd.comments,
            reservation_id,
        };
        let request_id = new_request.id;

        let created = match self
            .bounded(ctx, "request create", self.requests.create(new_request))
            .await
        {
            Ok(request) => request,
            Err(err) => {
                // Undo the hold so the reservation does not leak; release is
                // idempotent, so a duplicate undo after a timeout is harmless.
                if let Some(reservation_id) = reservation_id
                    && let Err(release_err) = self.ledger.release(reservation_id).await
                {
                    warn!(
                        %request_id,
                        %reservation_id,
                        error = %release_err,
                        "failed to release reservation after create failure"
                    );
                }
                return Err(err);
            }
        };

        info!(
            request_id = %created.id,
            employee_id = %created.employee_id,
            request_type = %created.request_type,
            requested_days = created.requested_days,
            "request created"
        );

        if let Some(manager_id) = requester.manager_id {
            self.notify(NotificationEvent::new(
                created.id,
                manager_id,
                NotificationKind::Submitted,
            ))
            .await;
        }

        Ok(created)
    }

    /// Approves or rejects a pending request.
    ///
    /// The repository transition is a compare-and-swap on the version read
    /// here; a concurrent decision makes this call fail with
    /// [`WorkflowError::ConcurrentModification`] without touching the
    /// ledger. The ledger settle runs only after the transition is durable.
    pub async fn decide(
        &self,
        cmd: DecideRequest,
        ctx: &CommandContext,
    ) -> Result<Request, WorkflowError> {
        let request = self
            .bounded(ctx, "request load", self.requests.get(cmd.request_id))
            .await?;

        // A previous attempt may have transitioned the request and then
        // failed before settling the ledger; finish that settlement before
        // reporting the duplicate decision.
        self.heal_settlement(&request, ctx).await?;

        let requester = self.employee(ctx, request.employee_id).await?;
        let actor = self.employee(ctx, cmd.actor_id).await?;

        ApprovalPolicy::authorize_decision(&request, &requester, &actor)?;

        let action = match cmd.outcome {
            DecisionOutcome::Approved => {
                WorkflowService::approve(request.status, actor.id, cmd.comments)?
            }
            DecisionOutcome::Rejected => WorkflowService::reject(
                request.status,
                actor.id,
                cmd.comments.unwrap_or_default(),
            )?,
        };

        let updated = self
            .bounded(
                ctx,
                "request transition",
                self.requests
                    .transition(request.id, request.version, &action),
            )
            .await?;

        if let Some(reservation_id) = updated.reservation_id {
            self.bounded(ctx, "ledger settle", async {
                match cmd.outcome {
                    DecisionOutcome::Approved => self.ledger.commit(reservation_id).await,
                    DecisionOutcome::Rejected => self.ledger.release(reservation_id).await,
                }
                .map_err(WorkflowError::from)
            })
            .await?;
        }

        info!(
            request_id = %updated.id,
            actor_id = %actor.id,
            outcome = cmd.outcome.as_str(),
            "request decided"
        );

        let kind = match cmd.outcome {
            DecisionOutcome::Approved => NotificationKind::Approved,
            DecisionOutcome::Rejected => NotificationKind::Rejected,
        };
        self.notify(NotificationEvent::new(updated.id, updated.employee_id, kind))
            .await;

        Ok(updated)
    }

    /// Withdraws a pending request. Requester only.
    pub async fn cancel(
        &self,
        cmd: CancelRequest,
        ctx: &CommandContext,
    ) -> Result<Request, WorkflowError> {
        let request = self
            .bounded(ctx, "request load", self.requests.get(cmd.request_id))
            .await?;

        self.heal_settlement(&request, ctx).await?;

        let action = WorkflowService::cancel(request.status, cmd.actor_id, request.employee_id)?;

        let updated = self
            .bounded(
                ctx,
                "request transition",
                self.requests
                    .transition(request.id, request.version, &action),
            )
            .await?;

        if let Some(reservation_id) = updated.reservation_id {
            self.bounded(ctx, "ledger settle", async {
                self.ledger
                    .release(reservation_id)
                    .await
                    .map_err(WorkflowError::from)
            })
            .await?;
        }

        info!(request_id = %updated.id, "request cancelled");

        // The approver who would have seen the request learns it is gone.
        match self.employee(ctx, updated.employee_id).await {
            Ok(requester) => {
                if let Some(manager_id) = requester.manager_id {
                    self.notify(NotificationEvent::new(
                        updated.id,
                        manager_id,
                        NotificationKind::Cancelled,
                    ))
                    .await;
                }
            }
            Err(err) => {
                warn!(request_id = %updated.id, error = %err, "skipping cancellation notification");
            }
        }

        Ok(updated)
    }

    /// Read-only balance projection for dashboards.
    pub async fn balance(
        &self,
        employee_id: EmployeeId,
        year: i32,
        ctx: &CommandContext,
    ) -> Result<VacationBalance, WorkflowError> {
        self.bounded(ctx, "balance read", async {
            self.ledger
                .balance(employee_id, year)
                .await
                .map_err(WorkflowError::from)
        })
        .await
    }

    /// Notification feed page for one employee, newest first.
    pub async fn notifications(
        &self,
        employee_id: EmployeeId,
        page: &PageRequest,
        ctx: &CommandContext,
    ) -> Result<PageResponse<NotificationEvent>, WorkflowError> {
        let events = self
            .bounded(ctx, "notification read", async {
                self.notifications
                    .for_recipient(employee_id)
                    .await
                    .map_err(WorkflowError::from)
            })
            .await?;

        let total = events.len() as u64;
        let start = usize::try_from(page.offset())
            .unwrap_or(usize::MAX)
            .min(events.len());
        let end = start
            .saturating_add(usize::try_from(page.limit()).unwrap_or(usize::MAX))
            .min(events.len());
        Ok(PageResponse::new(events[start..end].to_vec(), page, total))
    }

    /// All requests filed by one employee, newest first.
    pub async fn requests_for(
        &self,
        employee_id: EmployeeId,
        ctx: &CommandContext,
    ) -> Result<Vec<Request>, WorkflowError> {
        self.bounded(
            ctx,
            "request list",
            self.requests.list_for_employee(employee_id),
        )
        .await
    }

    /// Pending requests the given approver may decide.
    ///
    /// Managers see their direct reports' requests; HR and Admin see all.
    pub async fn pending_approvals(
        &self,
        approver_id: EmployeeId,
        ctx: &CommandContext,
    ) -> Result<Vec<Request>, WorkflowError> {
        let approver = self.employee(ctx, approver_id).await?;
        if !approver.access_level.can_decide() {
            return Err(WorkflowError::Unauthorized { actor: approver.id });
        }

        let pending = self
            .bounded(ctx, "pending list", self.requests.list_pending())
            .await?;

        if approver.access_level.decides_for_anyone() {
            return Ok(pending);
        }

        let mut mine = Vec::with_capacity(pending.len());
        for request in pending {
            match self.employee(ctx, request.employee_id).await {
                Ok(requester) if requester.manager_id == Some(approver.id) => mine.push(request),
                Ok(_) => {}
                Err(WorkflowError::EmployeeNotFound(id)) => {
                    debug!(request_id = %request.id, employee_id = %id, "requester missing from directory");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(mine)
    }

    /// Re-issues the ledger settle implied by an already-terminal request.
    ///
    /// Both settles are idempotent, so this is a no-op on the happy path
    /// and completes an interrupted decide/cancel otherwise.
    async fn heal_settlement(
        &self,
        request: &Request,
        ctx: &CommandContext,
    ) -> Result<(), WorkflowError> {
        let Some(reservation_id) = request.reservation_id else {
            return Ok(());
        };
        match request.status {
            RequestStatus::Pending => Ok(()),
            RequestStatus::Approved => {
                self.bounded(ctx, "ledger settle", async {
                    self.ledger
                        .commit(reservation_id)
                        .await
                        .map_err(WorkflowError::from)
                })
                .await
            }
            RequestStatus::Rejected | RequestStatus::Cancelled => {
                self.bounded(ctx, "ledger settle", async {
                    self.ledger
                        .release(reservation_id)
                        .await
                        .map_err(WorkflowError::from)
                })
                .await
            }
        }
    }

    /// Fire-and-forget dispatch: the transition is already durable, so a
    /// failure here is reported as degraded delivery, never escalated.
    async fn notify(&self, event: NotificationEvent) {
        if let Err(err) = self.notifications.dispatch(&event).await {
            warn!(
                request_id = %event.request_id,
                recipient_id = %event.recipient_id,
                kind = event.kind.as_str(),
                error = %err,
                "notification dispatch failed"
            );
        }
    }
}
