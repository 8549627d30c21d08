//! Ledger domain types.

use permio_shared::{EmployeeId, ReservationId};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::LedgerError;

/// An employee's vacation-day balance for one year.
///
/// Created lazily on the first request of a year; never deleted, only
/// superseded by the next year's record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationBalance {
    /// The employee this balance belongs to.
    pub employee_id: EmployeeId,
    /// Calendar year.
    pub year: i32,
    /// Days granted for the year.
    pub available_days: u32,
    /// Days consumed by approved requests.
    pub days_taken: u32,
    /// Days held by pending requests.
    pub days_reserved: u32,
}

impl VacationBalance {
    /// Creates a fresh balance with the full allowance untouched.
    #[must_use]
    pub fn new(employee_id: EmployeeId, year: i32, available_days: u32) -> Self {
        Self {
            employee_id,
            year,
            available_days,
            days_taken: 0,
            days_reserved: 0,
        }
    }

    /// Days still open for new reservations.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.available_days
            .saturating_sub(self.days_taken)
            .saturating_sub(self.days_reserved)
    }

    /// Returns true if `days_taken + days_reserved <= available_days`.
    #[must_use]
    pub fn holds_invariant(&self) -> bool {
        self.days_taken + self.days_reserved <= self.available_days
    }

    /// Attempts to reserve `days`, checking availability first.
    ///
    /// This is the single check-and-increment the stores must apply under
    /// a lock or row-level equivalent.
    pub fn try_reserve(&mut self, days: u32) -> Result<(), LedgerError> {
        if days == 0 {
            return Err(LedgerError::ZeroDayReservation);
        }
        let remaining = self.remaining();
        if days > remaining {
            return Err(LedgerError::InsufficientBalance {
                requested: days,
                remaining,
            });
        }
        self.days_reserved += days;
        Ok(())
    }

    /// Settles a held reservation into taken days (reserved -> taken).
    pub fn settle_commit(&mut self, days: u32) {
        self.days_reserved = self.days_reserved.saturating_sub(days);
        self.days_taken += days;
    }

    /// Releases a held reservation (reserved -> available).
    pub fn settle_release(&mut self, days: u32) {
        self.days_reserved = self.days_reserved.saturating_sub(days);
    }
}

/// Lifecycle state of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationState {
    /// Days are held against the balance.
    Held,
    /// Days were moved into `days_taken`.
    Committed,
    /// The hold was cancelled without consuming days.
    Released,
}

impl ReservationState {
    /// Parses a state from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "held" => Some(Self::Held),
            "committed" => Some(Self::Committed),
            "released" => Some(Self::Released),
            _ => None,
        }
    }

    /// Returns the string representation of the state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Held => "held",
            Self::Committed => "committed",
            Self::Released => "released",
        }
    }

    /// Returns true once the reservation can no longer change.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Committed | Self::Released)
    }
}

impl fmt::Display for ReservationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A hold of vacation days against one (employee, year) balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique identifier, the stable handle for retries.
    pub id: ReservationId,
    /// The employee whose balance is debited.
    pub employee_id: EmployeeId,
    /// The balance year the hold applies to.
    pub year: i32,
    /// Number of days held.
    pub days: u32,
    /// Current lifecycle state.
    pub state: ReservationState,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(available: u32) -> VacationBalance {
        VacationBalance::new(EmployeeId::new(), 2026, available)
    }

    #[test]
    fn test_reserve_within_availability() {
        let mut b = balance(10);
        assert!(b.try_reserve(5).is_ok());
        assert_eq!(b.days_reserved, 5);
        assert_eq!(b.remaining(), 5);
        assert!(b.holds_invariant());
    }

    #[test]
    fn test_reserve_beyond_availability_fails() {
        let mut b = balance(10);
        b.try_reserve(5).unwrap();
        let err = b.try_reserve(6).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientBalance {
                requested: 6,
                remaining: 5
            }
        ));
        // Failed reservation leaves the balance untouched
        assert_eq!(b.days_reserved, 5);
    }

    #[test]
    fn test_reserve_zero_days_fails() {
        let mut b = balance(10);
        assert!(matches!(
            b.try_reserve(0),
            Err(LedgerError::ZeroDayReservation)
        ));
    }

    #[test]
    fn test_commit_moves_reserved_to_taken() {
        let mut b = balance(10);
        b.try_reserve(5).unwrap();
        b.settle_commit(5);
        assert_eq!(b.days_taken, 5);
        assert_eq!(b.days_reserved, 0);
        assert_eq!(b.remaining(), 5);
        assert!(b.holds_invariant());
    }

    #[test]
    fn test_release_restores_availability() {
        let mut b = balance(10);
        b.try_reserve(5).unwrap();
        b.settle_release(5);
        assert_eq!(b.days_taken, 0);
        assert_eq!(b.days_reserved, 0);
        assert_eq!(b.remaining(), 10);
    }

    #[test]
    fn test_exact_fit_reservation() {
        let mut b = balance(10);
        assert!(b.try_reserve(10).is_ok());
        assert_eq!(b.remaining(), 0);
        assert!(b.try_reserve(1).is_err());
    }

    #[test]
    fn test_reservation_state_settled() {
        assert!(!ReservationState::Held.is_settled());
        assert!(ReservationState::Committed.is_settled());
        assert!(ReservationState::Released.is_settled());
    }

    #[test]
    fn test_reservation_state_parse_roundtrip() {
        for state in [
            ReservationState::Held,
            ReservationState::Committed,
            ReservationState::Released,
        ] {
            assert_eq!(ReservationState::parse(state.as_str()), Some(state));
        }
        assert_eq!(ReservationState::parse("pending"), None);
    }
}
