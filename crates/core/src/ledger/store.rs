//! The ledger storage contract.

use async_trait::async_trait;
use permio_shared::{EmployeeId, ReservationId};

use super::error::LedgerError;
use super::types::VacationBalance;

/// Atomic vacation-day ledger operations.
///
/// Implementations must make `reserve` a single atomic read-modify-write
/// (row-level lock, compare-and-swap, or a mutex over the map): two
/// concurrent reservations for the same (employee, year) must not both
/// succeed if their combined total exceeds availability.
///
/// `commit` and `release` are idempotent: settling an already-settled
/// reservation leaves the ledger unchanged, so a timed-out attempt is safe
/// to retry given the stable [`ReservationId`].
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Holds `days` against the (employee, year) balance.
    ///
    /// Creates the year's balance lazily with the configured allowance.
    /// Fails with [`LedgerError::InsufficientBalance`] when
    /// `available_days - days_taken - days_reserved < days`.
    async fn reserve(
        &self,
        employee_id: EmployeeId,
        year: i32,
        days: u32,
    ) -> Result<ReservationId, LedgerError>;

    /// Moves a held reservation's days into `days_taken`.
    async fn commit(&self, reservation_id: ReservationId) -> Result<(), LedgerError>;

    /// Cancels a held reservation without touching `days_taken`.
    async fn release(&self, reservation_id: ReservationId) -> Result<(), LedgerError>;

    /// Reads the (employee, year) balance, creating it lazily when absent.
    async fn balance(
        &self,
        employee_id: EmployeeId,
        year: i32,
    ) -> Result<VacationBalance, LedgerError>;
}

#[async_trait]
impl<T> LedgerStore for std::sync::Arc<T>
where
    T: LedgerStore + ?Sized,
{
    async fn reserve(
        &self,
        employee_id: EmployeeId,
        year: i32,
        days: u32,
    ) -> Result<ReservationId, LedgerError> {
        (**self).reserve(employee_id, year, days).await
    }

    async fn commit(&self, reservation_id: ReservationId) -> Result<(), LedgerError> {
        (**self).commit(reservation_id).await
    }

    async fn release(&self, reservation_id: ReservationId) -> Result<(), LedgerError> {
        (**self).release(reservation_id).await
    }

    async fn balance(
        &self,
        employee_id: EmployeeId,
        year: i32,
    ) -> Result<VacationBalance, LedgerError> {
        (**self).balance(employee_id, year).await
    }
}
