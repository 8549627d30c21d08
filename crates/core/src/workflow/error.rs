//! Workflow error types for the request lifecycle.
//!
//! Every guard failure is a typed, user-facing reason; none is fatal to the
//! process. Callers map `status_code()`/`error_code()` onto their transport.

use permio_shared::{EmployeeId, RequestId};
use thiserror::Error;

use crate::employee::DirectoryError;
use crate::ledger::LedgerError;
use crate::notification::NotificationError;
use crate::workflow::types::RequestStatus;

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The requested date range is unusable.
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    /// A rejection was attempted without an explanation.
    #[error("A rejection requires an explanatory comment")]
    MissingRejectionComment,

    /// The request left the Pending state and can no longer transition.
    #[error("Request is not pending (current status: {status})")]
    NotPending {
        /// The status the request is actually in.
        status: RequestStatus,
    },

    /// The request already carries a decision.
    #[error("Request was already decided")]
    AlreadyDecided,

    /// Employees may never decide their own requests.
    #[error("Employees may not decide their own requests")]
    SelfApproval,

    /// The actor is not this requester's manager nor HR/Admin.
    #[error("Employee {actor} is not authorized to decide this request")]
    Unauthorized {
        /// The employee who attempted the decision.
        actor: EmployeeId,
    },

    /// Only the original requester may cancel a request.
    #[error("Only the requester may cancel a pending request")]
    NotRequester,

    /// Ledger failure, including the expected insufficient-balance outcome.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The request changed under the caller; re-read and retry the decision.
    #[error("Request was modified concurrently; retry the read-decide cycle")]
    ConcurrentModification,

    /// No request with the given ID exists.
    #[error("Request {0} not found")]
    RequestNotFound(RequestId),

    /// No employee with the given ID exists.
    #[error("Employee {0} not found")]
    EmployeeNotFound(EmployeeId),

    /// The employee exists but may not act in the workflow.
    #[error("Employee {0} is not active")]
    EmployeeInactive(EmployeeId),

    /// A store call exceeded the caller's deadline; state is unchanged.
    #[error("{0} timed out")]
    Timeout(&'static str),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidDateRange(_) | Self::MissingRejectionComment => 400,

            Self::SelfApproval
            | Self::Unauthorized { .. }
            | Self::NotRequester
            | Self::EmployeeInactive(_) => 403,

            Self::RequestNotFound(_) | Self::EmployeeNotFound(_) => 404,

            Self::NotPending { .. } | Self::AlreadyDecided | Self::ConcurrentModification => 409,

            Self::Ledger(e) => e.status_code(),

            Self::Timeout(_) => 504,

            Self::Storage(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange(_) => "INVALID_DATE_RANGE",
            Self::MissingRejectionComment => "MISSING_REJECTION_COMMENT",
            Self::NotPending { .. } => "NOT_PENDING",
            Self::AlreadyDecided => "ALREADY_DECIDED",
            Self::SelfApproval => "SELF_APPROVAL",
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::NotRequester => "NOT_REQUESTER",
            Self::Ledger(e) => e.error_code(),
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::RequestNotFound(_) => "REQUEST_NOT_FOUND",
            Self::EmployeeNotFound(_) => "EMPLOYEE_NOT_FOUND",
            Self::EmployeeInactive(_) => "EMPLOYEE_INACTIVE",
            Self::Timeout(_) => "TIMEOUT",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns true when the caller may safely retry the same command.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConcurrentModification | Self::Timeout(_) | Self::Storage(_)
        )
    }
}

impl From<DirectoryError> for WorkflowError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound(id) => Self::EmployeeNotFound(id),
            DirectoryError::Unavailable(msg) => Self::Storage(msg),
        }
    }
}

impl From<NotificationError> for WorkflowError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::Storage(msg) => Self::Storage(msg),
        }
    }
}
