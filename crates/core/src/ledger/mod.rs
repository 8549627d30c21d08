//! Vacation-day ledger for Permio.
//!
//! The ledger is the durable record of each employee's vacation-day balance
//! per year. Days move through three buckets: available, reserved (a pending
//! request holds them), and taken (an approved request consumed them). The
//! invariant `days_taken + days_reserved <= available_days` must hold after
//! every operation.
//!
//! # Modules
//!
//! - `types` - Balance and reservation domain types
//! - `error` - Ledger-specific error types
//! - `store` - The atomic reserve/commit/release storage contract

pub mod error;
pub mod store;
pub mod types;

#[cfg(test)]
mod balance_props;

pub use error::LedgerError;
pub use store::LedgerStore;
pub use types::{Reservation, ReservationState, VacationBalance};
