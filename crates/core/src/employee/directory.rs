//! Read-only access to the HR employee directory.

use async_trait::async_trait;
use permio_shared::EmployeeId;
use thiserror::Error;

use super::types::Employee;

/// Errors from the employee directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// No employee with the given ID exists.
    #[error("Employee {0} not found")]
    NotFound(EmployeeId),

    /// The directory could not be reached.
    #[error("Directory unavailable: {0}")]
    Unavailable(String),
}

/// Resolves employee identities for the workflow.
///
/// The engine trusts the resolved identity and never parses raw tokens;
/// authentication happens upstream.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Looks up an employee by ID.
    async fn get(&self, id: EmployeeId) -> Result<Employee, DirectoryError>;
}

#[async_trait]
impl<T> EmployeeDirectory for std::sync::Arc<T>
where
    T: EmployeeDirectory + ?Sized,
{
    async fn get(&self, id: EmployeeId) -> Result<Employee, DirectoryError> {
        (**self).get(id).await
    }
}
