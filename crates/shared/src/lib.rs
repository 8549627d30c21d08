//! Shared types, errors, and configuration for Permio.
//!
//! This crate holds everything the other workspace members have in common:
//! typed entity IDs, pagination types, the application-wide error type, and
//! configuration loading.

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, DatabaseConfig, WorkflowConfig};
pub use error::{AppError, AppResult};
pub use types::{
    DecisionId, EmployeeId, NotificationId, PageRequest, PageResponse, RequestId, ReservationId,
};
