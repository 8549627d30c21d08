//! `SeaORM` entity definitions.

pub mod approval_decisions;
pub mod employees;
pub mod notification_events;
pub mod requests;
pub mod reservations;
pub mod sea_orm_active_enums;
pub mod vacation_balances;
