//! Employee domain types.

use permio_shared::EmployeeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Access level in the organization hierarchy.
///
/// Levels are ordered from lowest to highest privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Can file and cancel their own requests.
    Employee = 0,
    /// Can decide requests of direct reports.
    Manager = 1,
    /// Can decide any employee's request.
    Hr = 2,
    /// Full access, can decide any employee's request.
    Admin = 3,
}

impl AccessLevel {
    /// Parses an access level from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "employee" => Some(Self::Employee),
            "manager" => Some(Self::Manager),
            "hr" => Some(Self::Hr),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns the string representation of the level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Manager => "manager",
            Self::Hr => "hr",
            Self::Admin => "admin",
        }
    }

    /// Returns true if this level may decide requests at all.
    #[must_use]
    pub fn can_decide(&self) -> bool {
        matches!(self, Self::Manager | Self::Hr | Self::Admin)
    }

    /// Returns true if this level may decide requests from any employee,
    /// not just direct reports.
    #[must_use]
    pub fn decides_for_anyone(&self) -> bool {
        matches!(self, Self::Hr | Self::Admin)
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Employment status of an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    /// Employed and able to act in the workflow.
    Active,
    /// No longer employed.
    Inactive,
    /// Temporarily barred from acting.
    Suspended,
}

impl EmployeeStatus {
    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "suspended" => Some(Self::Suspended),
            _ => None,
        }
    }

    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
        }
    }

    /// Returns true if the employee may act in the workflow.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// An employee as resolved from the HR directory.
///
/// Owned by the HR-management subsystem; the workflow only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier.
    pub id: EmployeeId,
    /// Display name.
    pub full_name: String,
    /// Access level in the hierarchy.
    pub access_level: AccessLevel,
    /// Direct manager, if any.
    pub manager_id: Option<EmployeeId>,
    /// Employment status.
    pub status: EmployeeStatus,
}
