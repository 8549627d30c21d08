//! `SeaORM` Entity for the requests table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{RequestStatus, RequestType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub employee_id: Uuid,
    pub request_type: RequestType,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub requested_days: i32,
    pub status: RequestStatus,
    pub comments: Option<String>,
    pub approver_id: Option<Uuid>,
    pub reservation_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub decided_at: Option<DateTimeWithTimeZone>,
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employees::Entity",
        from = "Column::EmployeeId",
        to = "super::employees::Column::Id"
    )]
    Requester,
    #[sea_orm(
        belongs_to = "super::employees::Entity",
        from = "Column::ApproverId",
        to = "super::employees::Column::Id"
    )]
    Approver,
    #[sea_orm(
        belongs_to = "super::reservations::Entity",
        from = "Column::ReservationId",
        to = "super::reservations::Column::Id"
    )]
    Reservations,
    #[sea_orm(has_many = "super::notification_events::Entity")]
    NotificationEvents,
}

impl Related<super::employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requester.def()
    }
}

impl Related<super::reservations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl Related<super::notification_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NotificationEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
