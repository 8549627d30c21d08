//! `SeaORM` Entity for the employees table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{AccessLevel, EmployeeStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub full_name: String,
    pub access_level: AccessLevel,
    pub manager_id: Option<Uuid>,
    pub status: EmployeeStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ManagerId",
        to = "Column::Id"
    )]
    Manager,
    #[sea_orm(has_many = "super::requests::Entity")]
    Requests,
    #[sea_orm(has_many = "super::vacation_balances::Entity")]
    VacationBalances,
}

impl Related<super::requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requests.def()
    }
}

impl Related<super::vacation_balances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VacationBalances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
