//! Ledger error types.

use permio_shared::ReservationId;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The requested days exceed what the balance has left.
    ///
    /// A normal, expected outcome of a reservation attempt, not a bug.
    #[error("Insufficient balance: requested {requested} days, {remaining} remaining")]
    InsufficientBalance {
        /// Days the reservation asked for.
        requested: u32,
        /// Days the balance still had open.
        remaining: u32,
    },

    /// No reservation with the given ID exists.
    #[error("Reservation {0} not found")]
    ReservationNotFound(ReservationId),

    /// A reservation must cover at least one day.
    #[error("Reservation must cover at least one day")]
    ZeroDayReservation,

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InsufficientBalance { .. } => 409,
            Self::ReservationNotFound(_) => 404,
            Self::ZeroDayReservation => 400,
            Self::Storage(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::ReservationNotFound(_) => "RESERVATION_NOT_FOUND",
            Self::ZeroDayReservation => "ZERO_DAY_RESERVATION",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}
