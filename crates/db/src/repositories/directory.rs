//! Employee directory repository (read-only).

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait};

use permio_core::employee::directory::{DirectoryError, EmployeeDirectory};
use permio_core::employee::types::{AccessLevel, Employee, EmployeeStatus};
use permio_shared::EmployeeId;

use crate::entities::{employees, sea_orm_active_enums};

/// Postgres-backed [`EmployeeDirectory`].
///
/// The employees table is owned by the HR-management subsystem; the
/// workflow only reads it.
#[derive(Debug, Clone)]
pub struct SeaOrmEmployeeDirectory {
    db: DatabaseConnection,
}

impl SeaOrmEmployeeDirectory {
    /// Creates a new directory.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EmployeeDirectory for SeaOrmEmployeeDirectory {
    async fn get(&self, id: EmployeeId) -> Result<Employee, DirectoryError> {
        let model = employees::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?
            .ok_or(DirectoryError::NotFound(id))?;
        Ok(model_to_core(model))
    }
}

fn level_to_core(value: &sea_orm_active_enums::AccessLevel) -> AccessLevel {
    match value {
        sea_orm_active_enums::AccessLevel::Employee => AccessLevel::Employee,
        sea_orm_active_enums::AccessLevel::Manager => AccessLevel::Manager,
        sea_orm_active_enums::AccessLevel::Hr => AccessLevel::Hr,
        sea_orm_active_enums::AccessLevel::Admin => AccessLevel::Admin,
    }
}

fn status_to_core(value: &sea_orm_active_enums::EmployeeStatus) -> EmployeeStatus {
    match value {
        sea_orm_active_enums::EmployeeStatus::Active => EmployeeStatus::Active,
        sea_orm_active_enums::EmployeeStatus::Inactive => EmployeeStatus::Inactive,
        sea_orm_active_enums::EmployeeStatus::Suspended => EmployeeStatus::Suspended,
    }
}

fn model_to_core(model: employees::Model) -> Employee {
    Employee {
        id: EmployeeId::from_uuid(model.id),
        full_name: model.full_name,
        access_level: level_to_core(&model.access_level),
        manager_id: model.manager_id.map(EmployeeId::from_uuid),
        status: status_to_core(&model.status),
    }
}
