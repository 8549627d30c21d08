//! In-memory employee directory.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use permio_shared::EmployeeId;

use crate::employee::directory::{DirectoryError, EmployeeDirectory};
use crate::employee::types::Employee;
use crate::memory::lock;

/// Mutex-guarded employee map for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    inner: Mutex<HashMap<EmployeeId, Employee>>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an employee record.
    pub fn insert(&self, employee: Employee) {
        lock(&self.inner).insert(employee.id, employee);
    }
}

#[async_trait]
impl EmployeeDirectory for InMemoryDirectory {
    async fn get(&self, id: EmployeeId) -> Result<Employee, DirectoryError> {
        lock(&self.inner)
            .get(&id)
            .cloned()
            .ok_or(DirectoryError::NotFound(id))
    }
}
