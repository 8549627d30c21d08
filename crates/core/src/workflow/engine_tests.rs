//! Engine tests over the in-memory stores.
//!
//! These exercise the full orchestration: creation with reservation,
//! decisions under optimistic concurrency, cancellation, and notification
//! fan-out.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Days, NaiveDate, Utc, Weekday};
use permio_shared::config::WorkflowConfig;
use permio_shared::{EmployeeId, PageRequest, RequestId};

use crate::employee::types::{AccessLevel, Employee, EmployeeStatus};
use crate::memory::{
    InMemoryDirectory, InMemoryLedgerStore, InMemoryNotificationSink, InMemoryRequestStore,
};
use crate::notification::sink::MockNotificationSink;
use crate::notification::{NotificationError, NotificationKind};
use crate::ledger::store::LedgerStore;
use crate::workflow::engine::{CommandContext, WorkflowEngine};
use crate::workflow::error::WorkflowError;
use crate::workflow::store::RequestStore;
use crate::workflow::types::{
    CancelRequest, CreateRequest, DecideRequest, DecisionOutcome, RequestStatus, RequestType,
};

type TestEngine = WorkflowEngine<
    Arc<InMemoryRequestStore>,
    Arc<InMemoryLedgerStore>,
    Arc<InMemoryNotificationSink>,
    Arc<InMemoryDirectory>,
>;

struct Harness {
    engine: TestEngine,
    ledger: Arc<InMemoryLedgerStore>,
    requests: Arc<InMemoryRequestStore>,
    sink: Arc<InMemoryNotificationSink>,
    directory: Arc<InMemoryDirectory>,
    manager: Employee,
    employee: Employee,
}

fn config() -> WorkflowConfig {
    WorkflowConfig {
        grace_period_days: 3,
        default_annual_days: 10,
        store_timeout_ms: 5_000,
    }
}

fn harness() -> Harness {
    let requests = Arc::new(InMemoryRequestStore::new());
    let ledger = Arc::new(InMemoryLedgerStore::new(10));
    let sink = Arc::new(InMemoryNotificationSink::new());
    let directory = Arc::new(InMemoryDirectory::new());

    let manager = Employee {
        id: EmployeeId::new(),
        full_name: "Mika Lindholm".to_string(),
        access_level: AccessLevel::Manager,
        manager_id: None,
        status: EmployeeStatus::Active,
    };
    let employee = Employee {
        id: EmployeeId::new(),
        full_name: "Ana Reyes".to_string(),
        access_level: AccessLevel::Employee,
        manager_id: Some(manager.id),
        status: EmployeeStatus::Active,
    };
    directory.insert(manager.clone());
    directory.insert(employee.clone());

    let engine = WorkflowEngine::new(
        Arc::clone(&requests),
        Arc::clone(&ledger),
        Arc::clone(&sink),
        Arc::clone(&directory),
        config(),
    );

    Harness {
        engine,
        ledger,
        requests,
        sink,
        directory,
        manager,
        employee,
    }
}

/// First Monday at least a week out, so ranges are always in the future.
fn next_monday() -> NaiveDate {
    let mut date = Utc::now().date_naive() + Days::new(7);
    while date.weekday() != Weekday::Mon {
        date = date.succ_opt().unwrap();
    }
    date
}

/// A Monday-to-Friday vacation command: exactly 5 business days.
fn five_day_vacation(employee_id: EmployeeId) -> CreateRequest {
    let monday = next_monday();
    CreateRequest {
        employee_id,
        request_type: RequestType::Vacation,
        start_date: monday,
        end_date: Some(monday + Days::new(4)),
        comments: Some("Summer break".to_string()),
    }
}

fn approve_cmd(request_id: RequestId, actor_id: EmployeeId) -> DecideRequest {
    DecideRequest {
        request_id,
        actor_id,
        outcome: DecisionOutcome::Approved,
        comments: None,
    }
}

fn reject_cmd(request_id: RequestId, actor_id: EmployeeId) -> DecideRequest {
    DecideRequest {
        request_id,
        actor_id,
        outcome: DecisionOutcome::Rejected,
        comments: Some("Coverage gap that week".to_string()),
    }
}

fn ctx() -> CommandContext {
    CommandContext::unbounded()
}

// ============================================================================
// Creation
// ============================================================================

#[tokio::test]
async fn test_create_reserves_days() {
    let h = harness();

    let created = h
        .engine
        .create_request(five_day_vacation(h.employee.id), &ctx())
        .await
        .unwrap();

    assert_eq!(created.status, RequestStatus::Pending);
    assert_eq!(created.requested_days, 5);
    assert!(created.reservation_id.is_some());

    let year = created.start_date.year();
    let balance = h.engine.balance(h.employee.id, year, &ctx()).await.unwrap();
    assert_eq!(balance.days_reserved, 5);
    assert_eq!(balance.days_taken, 0);
}

#[tokio::test]
async fn test_second_overlapping_request_is_refused() {
    let h = harness();

    h.engine
        .create_request(five_day_vacation(h.employee.id), &ctx())
        .await
        .unwrap();

    // 5 already reserved, 6 more would exceed the 10-day allowance.
    let monday = next_monday();
    let six_days = CreateRequest {
        employee_id: h.employee.id,
        request_type: RequestType::Vacation,
        start_date: monday,
        end_date: Some(monday + Days::new(7)),
        comments: None,
    };
    let err = h.engine.create_request(six_days, &ctx()).await.unwrap_err();
    assert_eq!(err.error_code(), "INSUFFICIENT_BALANCE");

    // The failed attempt reserved nothing.
    let year = monday.year();
    let balance = h.engine.balance(h.employee.id, year, &ctx()).await.unwrap();
    assert_eq!(balance.days_reserved, 5);
}

#[tokio::test]
async fn test_certificate_skips_the_ledger() {
    let h = harness();

    // Exhaust the balance first; a certificate must still go through.
    h.engine
        .create_request(
            CreateRequest {
                employee_id: h.employee.id,
                request_type: RequestType::Vacation,
                start_date: next_monday(),
                end_date: Some(next_monday() + Days::new(11)),
                comments: None,
            },
            &ctx(),
        )
        .await
        .unwrap();

    let certificate = CreateRequest {
        employee_id: h.employee.id,
        request_type: RequestType::Certificate,
        start_date: next_monday(),
        end_date: None,
        comments: Some("Salary certificate for the bank".to_string()),
    };
    let created = h.engine.create_request(certificate, &ctx()).await.unwrap();
    assert_eq!(created.requested_days, 0);
    assert!(created.reservation_id.is_none());
}

#[tokio::test]
async fn test_end_before_start_is_refused() {
    let h = harness();
    let monday = next_monday();
    let cmd = CreateRequest {
        employee_id: h.employee.id,
        request_type: RequestType::Vacation,
        start_date: monday,
        end_date: Some(monday - Days::new(3)),
        comments: None,
    };
    let err = h.engine.create_request(cmd, &ctx()).await.unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidDateRange(_)));
}

#[tokio::test]
async fn test_backdated_start_beyond_grace_is_refused() {
    let h = harness();
    let start = Utc::now().date_naive() - Days::new(10);
    let cmd = CreateRequest {
        employee_id: h.employee.id,
        request_type: RequestType::Leave,
        start_date: start,
        end_date: Some(start + Days::new(4)),
        comments: None,
    };
    let err = h.engine.create_request(cmd, &ctx()).await.unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidDateRange(_)));
}

#[tokio::test]
async fn test_vacation_without_end_date_is_refused() {
    let h = harness();
    let cmd = CreateRequest {
        employee_id: h.employee.id,
        request_type: RequestType::Vacation,
        start_date: next_monday(),
        end_date: None,
        comments: None,
    };
    let err = h.engine.create_request(cmd, &ctx()).await.unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidDateRange(_)));
}

#[tokio::test]
async fn test_weekend_only_range_is_refused() {
    let h = harness();
    let saturday = next_monday() + Days::new(5);
    let cmd = CreateRequest {
        employee_id: h.employee.id,
        request_type: RequestType::Vacation,
        start_date: saturday,
        end_date: Some(saturday + Days::new(1)),
        comments: None,
    };
    let err = h.engine.create_request(cmd, &ctx()).await.unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidDateRange(_)));
}

#[tokio::test]
async fn test_create_notifies_the_manager() {
    let h = harness();
    let created = h
        .engine
        .create_request(five_day_vacation(h.employee.id), &ctx())
        .await
        .unwrap();

    let feed = h
        .engine
        .notifications(h.manager.id, &PageRequest::default(), &ctx())
        .await
        .unwrap();
    assert_eq!(feed.meta.total, 1);
    assert_eq!(feed.data[0].kind, NotificationKind::Submitted);
    assert_eq!(feed.data[0].request_id, created.id);
}

#[tokio::test]
async fn test_create_without_manager_sends_nothing() {
    let h = harness();
    let loner = Employee {
        id: EmployeeId::new(),
        full_name: "Robin Vale".to_string(),
        access_level: AccessLevel::Employee,
        manager_id: None,
        status: EmployeeStatus::Active,
    };
    h.directory.insert(loner.clone());

    h.engine
        .create_request(five_day_vacation(loner.id), &ctx())
        .await
        .unwrap();
    assert!(h.sink.all().is_empty());
}

#[tokio::test]
async fn test_inactive_requester_is_refused() {
    let h = harness();
    let mut former = h.employee.clone();
    former.id = EmployeeId::new();
    former.status = EmployeeStatus::Inactive;
    h.directory.insert(former.clone());

    let err = h
        .engine
        .create_request(five_day_vacation(former.id), &ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::EmployeeInactive(_)));
}

// ============================================================================
// Decisions
// ============================================================================

#[tokio::test]
async fn test_manager_approval_settles_the_ledger() {
    let h = harness();
    let created = h
        .engine
        .create_request(five_day_vacation(h.employee.id), &ctx())
        .await
        .unwrap();

    let updated = h
        .engine
        .decide(approve_cmd(created.id, h.manager.id), &ctx())
        .await
        .unwrap();
    assert_eq!(updated.status, RequestStatus::Approved);
    assert_eq!(updated.approver_id, Some(h.manager.id));
    assert!(updated.decided_at.is_some());

    let year = created.start_date.year();
    let balance = h.engine.balance(h.employee.id, year, &ctx()).await.unwrap();
    assert_eq!(balance.days_taken, 5);
    assert_eq!(balance.days_reserved, 0);

    let feed = h
        .engine
        .notifications(h.employee.id, &PageRequest::default(), &ctx())
        .await
        .unwrap();
    assert_eq!(feed.meta.total, 1);
    assert_eq!(feed.data[0].kind, NotificationKind::Approved);

    let decision = h.requests.decision(created.id).await.unwrap().unwrap();
    assert_eq!(decision.outcome, DecisionOutcome::Approved);

    let reservation = h.ledger.reservation(created.reservation_id.unwrap()).unwrap();
    assert!(reservation.state.is_settled());
}

#[tokio::test]
async fn test_rejection_releases_the_hold() {
    let h = harness();
    let created = h
        .engine
        .create_request(five_day_vacation(h.employee.id), &ctx())
        .await
        .unwrap();

    let updated = h
        .engine
        .decide(reject_cmd(created.id, h.manager.id), &ctx())
        .await
        .unwrap();
    assert_eq!(updated.status, RequestStatus::Rejected);

    let year = created.start_date.year();
    let balance = h.engine.balance(h.employee.id, year, &ctx()).await.unwrap();
    assert_eq!(balance.days_taken, 0);
    assert_eq!(balance.days_reserved, 0);
    assert_eq!(balance.remaining(), 10);

    let feed = h
        .engine
        .notifications(h.employee.id, &PageRequest::default(), &ctx())
        .await
        .unwrap();
    assert_eq!(feed.data[0].kind, NotificationKind::Rejected);
}

#[tokio::test]
async fn test_rejection_without_comment_is_refused() {
    let h = harness();
    let created = h
        .engine
        .create_request(five_day_vacation(h.employee.id), &ctx())
        .await
        .unwrap();

    let cmd = DecideRequest {
        request_id: created.id,
        actor_id: h.manager.id,
        outcome: DecisionOutcome::Rejected,
        comments: None,
    };
    let err = h.engine.decide(cmd, &ctx()).await.unwrap_err();
    assert!(matches!(err, WorkflowError::MissingRejectionComment));

    // No side effects: still pending, still reserved.
    let reloaded = h.requests.get(created.id).await.unwrap();
    assert_eq!(reloaded.status, RequestStatus::Pending);
}

#[tokio::test]
async fn test_self_approval_is_refused() {
    let h = harness();
    let created = h
        .engine
        .create_request(five_day_vacation(h.employee.id), &ctx())
        .await
        .unwrap();

    let err = h
        .engine
        .decide(approve_cmd(created.id, h.employee.id), &ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::SelfApproval));
}

#[tokio::test]
async fn test_unrelated_manager_is_refused() {
    let h = harness();
    let other = Employee {
        id: EmployeeId::new(),
        full_name: "Noor Haddad".to_string(),
        access_level: AccessLevel::Manager,
        manager_id: None,
        status: EmployeeStatus::Active,
    };
    h.directory.insert(other.clone());

    let created = h
        .engine
        .create_request(five_day_vacation(h.employee.id), &ctx())
        .await
        .unwrap();

    let err = h
        .engine
        .decide(approve_cmd(created.id, other.id), &ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Unauthorized { .. }));
}

#[tokio::test]
async fn test_hr_decides_for_anyone() {
    let h = harness();
    let hr = Employee {
        id: EmployeeId::new(),
        full_name: "Sol Tanaka".to_string(),
        access_level: AccessLevel::Hr,
        manager_id: None,
        status: EmployeeStatus::Active,
    };
    h.directory.insert(hr.clone());

    let created = h
        .engine
        .create_request(five_day_vacation(h.employee.id), &ctx())
        .await
        .unwrap();

    let updated = h
        .engine
        .decide(approve_cmd(created.id, hr.id), &ctx())
        .await
        .unwrap();
    assert_eq!(updated.status, RequestStatus::Approved);
}

#[tokio::test]
async fn test_second_decision_is_refused() {
    let h = harness();
    let created = h
        .engine
        .create_request(five_day_vacation(h.employee.id), &ctx())
        .await
        .unwrap();

    h.engine
        .decide(approve_cmd(created.id, h.manager.id), &ctx())
        .await
        .unwrap();

    let err = h
        .engine
        .decide(reject_cmd(created.id, h.manager.id), &ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::AlreadyDecided));

    // Still exactly one decision row.
    let decision = h.requests.decision(created.id).await.unwrap().unwrap();
    assert_eq!(decision.outcome, DecisionOutcome::Approved);
}

#[tokio::test]
async fn test_decide_unknown_request() {
    let h = harness();
    let err = h
        .engine
        .decide(approve_cmd(RequestId::new(), h.manager.id), &ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::RequestNotFound(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_decisions_settle_exactly_once() {
    let h = harness();
    let created = h
        .engine
        .create_request(five_day_vacation(h.employee.id), &ctx())
        .await
        .unwrap();
    let year = created.start_date.year();

    let approve_engine = h.engine.clone();
    let reject_engine = h.engine.clone();
    let approve_cmd = approve_cmd(created.id, h.manager.id);
    let reject_cmd = reject_cmd(created.id, h.manager.id);

    let (approved, rejected) = tokio::join!(
        tokio::spawn(async move { approve_engine.decide(approve_cmd, &ctx()).await }),
        tokio::spawn(async move { reject_engine.decide(reject_cmd, &ctx()).await }),
    );
    let results = [approved.unwrap(), rejected.unwrap()];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one decision must win");
    for result in &results {
        if let Err(err) = result {
            assert!(
                matches!(
                    err,
                    WorkflowError::ConcurrentModification | WorkflowError::AlreadyDecided
                ),
                "loser saw unexpected error: {err}"
            );
        }
    }

    // The loser applied no ledger side effect: either committed or released,
    // never both, never twice.
    let balance = h.engine.balance(h.employee.id, year, &ctx()).await.unwrap();
    assert!(balance.holds_invariant());
    assert_eq!(balance.days_reserved, 0);
    let reloaded = h.requests.get(created.id).await.unwrap();
    match reloaded.status {
        RequestStatus::Approved => assert_eq!(balance.days_taken, 5),
        RequestStatus::Rejected => {
            assert_eq!(balance.days_taken, 0);
            assert_eq!(balance.remaining(), 10);
        }
        other => panic!("unexpected status after race: {other}"),
    }
    assert_eq!(reloaded.version, 1);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_requester_cancels_a_pending_request() {
    let h = harness();
    let created = h
        .engine
        .create_request(five_day_vacation(h.employee.id), &ctx())
        .await
        .unwrap();

    let updated = h
        .engine
        .cancel(
            CancelRequest {
                request_id: created.id,
                actor_id: h.employee.id,
            },
            &ctx(),
        )
        .await
        .unwrap();
    assert_eq!(updated.status, RequestStatus::Cancelled);

    let year = created.start_date.year();
    let balance = h.engine.balance(h.employee.id, year, &ctx()).await.unwrap();
    assert_eq!(balance.remaining(), 10);

    // The manager sees both the submission and the withdrawal.
    let feed = h
        .engine
        .notifications(h.manager.id, &PageRequest::default(), &ctx())
        .await
        .unwrap();
    let kinds: Vec<_> = feed.data.iter().map(|e| e.kind).collect();
    assert!(kinds.contains(&NotificationKind::Submitted));
    assert!(kinds.contains(&NotificationKind::Cancelled));
}

#[tokio::test]
async fn test_cancel_by_someone_else_is_refused() {
    let h = harness();
    let created = h
        .engine
        .create_request(five_day_vacation(h.employee.id), &ctx())
        .await
        .unwrap();

    let err = h
        .engine
        .cancel(
            CancelRequest {
                request_id: created.id,
                actor_id: h.manager.id,
            },
            &ctx(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NotRequester));
}

#[tokio::test]
async fn test_cancel_after_approval_is_refused() {
    let h = harness();
    let created = h
        .engine
        .create_request(five_day_vacation(h.employee.id), &ctx())
        .await
        .unwrap();
    h.engine
        .decide(approve_cmd(created.id, h.manager.id), &ctx())
        .await
        .unwrap();

    let err = h
        .engine
        .cancel(
            CancelRequest {
                request_id: created.id,
                actor_id: h.employee.id,
            },
            &ctx(),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::NotPending {
            status: RequestStatus::Approved
        }
    ));

    // The approved days stay taken.
    let year = created.start_date.year();
    let balance = h.engine.balance(h.employee.id, year, &ctx()).await.unwrap();
    assert_eq!(balance.days_taken, 5);
}

// ============================================================================
// Deadlines and degraded delivery
// ============================================================================

#[tokio::test]
async fn test_expired_deadline_leaves_state_unchanged() {
    let h = harness();
    let expired = CommandContext::with_timeout(Duration::ZERO);

    let err = h
        .engine
        .create_request(five_day_vacation(h.employee.id), &expired)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Timeout(_)));
    assert_eq!(err.status_code(), 504);

    let year = next_monday().year();
    let balance = h.engine.balance(h.employee.id, year, &ctx()).await.unwrap();
    assert_eq!(balance.days_reserved, 0);
    assert_eq!(balance.days_taken, 0);
}

#[tokio::test]
async fn test_notification_failure_does_not_block_the_transition() {
    let requests = Arc::new(InMemoryRequestStore::new());
    let ledger = Arc::new(InMemoryLedgerStore::new(10));
    let directory = Arc::new(InMemoryDirectory::new());

    let manager = Employee {
        id: EmployeeId::new(),
        full_name: "Mika Lindholm".to_string(),
        access_level: AccessLevel::Manager,
        manager_id: None,
        status: EmployeeStatus::Active,
    };
    let employee = Employee {
        id: EmployeeId::new(),
        full_name: "Ana Reyes".to_string(),
        access_level: AccessLevel::Employee,
        manager_id: Some(manager.id),
        status: EmployeeStatus::Active,
    };
    directory.insert(manager.clone());
    directory.insert(employee.clone());

    let mut sink = MockNotificationSink::new();
    sink.expect_dispatch()
        .returning(|_| Err(NotificationError::Storage("sink is down".to_string())));

    let engine = WorkflowEngine::new(
        Arc::clone(&requests),
        Arc::clone(&ledger),
        sink,
        Arc::clone(&directory),
        config(),
    );

    // Creation and decision both succeed despite the failing sink.
    let created = engine
        .create_request(five_day_vacation(employee.id), &ctx())
        .await
        .unwrap();
    let updated = engine
        .decide(approve_cmd(created.id, manager.id), &ctx())
        .await
        .unwrap();
    assert_eq!(updated.status, RequestStatus::Approved);

    let balance = ledger
        .balance(employee.id, created.start_date.year())
        .await
        .unwrap();
    assert_eq!(balance.days_taken, 5);
}

// ============================================================================
// Projections
// ============================================================================

#[tokio::test]
async fn test_pending_approvals_for_manager_and_hr() {
    let h = harness();
    let hr = Employee {
        id: EmployeeId::new(),
        full_name: "Sol Tanaka".to_string(),
        access_level: AccessLevel::Hr,
        manager_id: None,
        status: EmployeeStatus::Active,
    };
    let other_manager = Employee {
        id: EmployeeId::new(),
        full_name: "Noor Haddad".to_string(),
        access_level: AccessLevel::Manager,
        manager_id: None,
        status: EmployeeStatus::Active,
    };
    let other_report = Employee {
        id: EmployeeId::new(),
        full_name: "Imre Szabo".to_string(),
        access_level: AccessLevel::Employee,
        manager_id: Some(other_manager.id),
        status: EmployeeStatus::Active,
    };
    h.directory.insert(hr.clone());
    h.directory.insert(other_manager.clone());
    h.directory.insert(other_report.clone());

    h.engine
        .create_request(five_day_vacation(h.employee.id), &ctx())
        .await
        .unwrap();
    h.engine
        .create_request(five_day_vacation(other_report.id), &ctx())
        .await
        .unwrap();

    let for_manager = h
        .engine
        .pending_approvals(h.manager.id, &ctx())
        .await
        .unwrap();
    assert_eq!(for_manager.len(), 1);
    assert_eq!(for_manager[0].employee_id, h.employee.id);

    let for_hr = h.engine.pending_approvals(hr.id, &ctx()).await.unwrap();
    assert_eq!(for_hr.len(), 2);

    let err = h
        .engine
        .pending_approvals(h.employee.id, &ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Unauthorized { .. }));
}

#[tokio::test]
async fn test_requests_for_lists_own_requests() {
    let h = harness();
    h.engine
        .create_request(five_day_vacation(h.employee.id), &ctx())
        .await
        .unwrap();
    let certificate = CreateRequest {
        employee_id: h.employee.id,
        request_type: RequestType::Certificate,
        start_date: next_monday(),
        end_date: None,
        comments: None,
    };
    h.engine.create_request(certificate, &ctx()).await.unwrap();

    let mine = h.engine.requests_for(h.employee.id, &ctx()).await.unwrap();
    assert_eq!(mine.len(), 2);
    let manager_requests = h.engine.requests_for(h.manager.id, &ctx()).await.unwrap();
    assert!(manager_requests.is_empty());
}

#[tokio::test]
async fn test_balance_projection_creates_lazily() {
    let h = harness();
    let balance = h
        .engine
        .balance(h.employee.id, 2030, &ctx())
        .await
        .unwrap();
    assert_eq!(balance.available_days, 10);
    assert_eq!(balance.days_taken, 0);
    assert_eq!(balance.days_reserved, 0);
}
