//! Postgres enum types shared by the entities.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Access level in the organization hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "access_level")]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Can file and cancel their own requests.
    #[sea_orm(string_value = "employee")]
    Employee,
    /// Can decide requests of direct reports.
    #[sea_orm(string_value = "manager")]
    Manager,
    /// Can decide any employee's request.
    #[sea_orm(string_value = "hr")]
    Hr,
    /// Full access.
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// Employment status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "employee_status")]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    /// Employed and able to act.
    #[sea_orm(string_value = "active")]
    Active,
    /// No longer employed.
    #[sea_orm(string_value = "inactive")]
    Inactive,
    /// Temporarily barred from acting.
    #[sea_orm(string_value = "suspended")]
    Suspended,
}

/// Kind of request.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "request_type")]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    /// Paid vacation days.
    #[sea_orm(string_value = "vacation")]
    Vacation,
    /// Leave of absence.
    #[sea_orm(string_value = "leave")]
    Leave,
    /// A work/salary certificate.
    #[sea_orm(string_value = "certificate")]
    Certificate,
}

/// Request status in the approval workflow.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "request_status")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Awaiting a decision.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Decided in favour.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Decided against.
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Withdrawn by the requester.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Outcome recorded on an approval decision.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "decision_outcome")]
#[serde(rename_all = "lowercase")]
pub enum DecisionOutcome {
    /// The request was approved.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// The request was rejected.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Kind of notification event.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "notification_kind")]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// A request was filed.
    #[sea_orm(string_value = "submitted")]
    Submitted,
    /// The request was approved.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// The request was rejected.
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// The requester withdrew the request.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Lifecycle state of a reservation.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "reservation_state")]
#[serde(rename_all = "lowercase")]
pub enum ReservationState {
    /// Days are held against the balance.
    #[sea_orm(string_value = "held")]
    Held,
    /// Days were moved into `days_taken`.
    #[sea_orm(string_value = "committed")]
    Committed,
    /// The hold was cancelled.
    #[sea_orm(string_value = "released")]
    Released,
}
