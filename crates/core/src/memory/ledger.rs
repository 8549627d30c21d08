//! In-memory vacation-day ledger.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use permio_shared::{EmployeeId, ReservationId};
use tracing::debug;

use crate::ledger::error::LedgerError;
use crate::ledger::store::LedgerStore;
use crate::ledger::types::{Reservation, ReservationState, VacationBalance};
use crate::memory::lock;

#[derive(Debug, Default)]
struct LedgerInner {
    balances: HashMap<(EmployeeId, i32), VacationBalance>,
    reservations: HashMap<ReservationId, Reservation>,
}

/// Mutex-guarded ledger; every operation runs atomically under the lock.
#[derive(Debug)]
pub struct InMemoryLedgerStore {
    default_annual_days: u32,
    inner: Mutex<LedgerInner>,
}

impl InMemoryLedgerStore {
    /// Creates an empty ledger that grants `default_annual_days` to each
    /// lazily created balance year.
    #[must_use]
    pub fn new(default_annual_days: u32) -> Self {
        Self {
            default_annual_days,
            inner: Mutex::new(LedgerInner::default()),
        }
    }

    /// Overrides one (employee, year) balance, for seeding tests.
    pub fn set_balance(&self, balance: VacationBalance) {
        let mut inner = lock(&self.inner);
        inner
            .balances
            .insert((balance.employee_id, balance.year), balance);
    }

    /// Returns a reservation snapshot, for assertions in tests.
    #[must_use]
    pub fn reservation(&self, id: ReservationId) -> Option<Reservation> {
        lock(&self.inner).reservations.get(&id).cloned()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn reserve(
        &self,
        employee_id: EmployeeId,
        year: i32,
        days: u32,
    ) -> Result<ReservationId, LedgerError> {
        let mut inner = lock(&self.inner);
        let default_days = self.default_annual_days;
        let balance = inner
            .balances
            .entry((employee_id, year))
            .or_insert_with(|| VacationBalance::new(employee_id, year, default_days));
        balance.try_reserve(days)?;

        let reservation = Reservation {
            id: ReservationId::new(),
            employee_id,
            year,
            days,
            state: ReservationState::Held,
        };
        let id = reservation.id;
        inner.reservations.insert(id, reservation);
        debug!(%employee_id, year, days, reservation_id = %id, "days reserved");
        Ok(id)
    }

    async fn commit(&self, reservation_id: ReservationId) -> Result<(), LedgerError> {
        let mut inner = lock(&self.inner);
        let reservation = inner
            .reservations
            .get(&reservation_id)
            .cloned()
            .ok_or(LedgerError::ReservationNotFound(reservation_id))?;

        // Settled reservations are left untouched so retries are no-ops.
        if reservation.state.is_settled() {
            return Ok(());
        }

        if let Some(balance) = inner
            .balances
            .get_mut(&(reservation.employee_id, reservation.year))
        {
            balance.settle_commit(reservation.days);
        }
        if let Some(stored) = inner.reservations.get_mut(&reservation_id) {
            stored.state = ReservationState::Committed;
        }
        Ok(())
    }

    async fn release(&self, reservation_id: ReservationId) -> Result<(), LedgerError> {
        let mut inner = lock(&self.inner);
        let reservation = inner
            .reservations
            .get(&reservation_id)
            .cloned()
            .ok_or(LedgerError::ReservationNotFound(reservation_id))?;

        if reservation.state.is_settled() {
            return Ok(());
        }

        if let Some(balance) = inner
            .balances
            .get_mut(&(reservation.employee_id, reservation.year))
        {
            balance.settle_release(reservation.days);
        }
        if let Some(stored) = inner.reservations.get_mut(&reservation_id) {
            stored.state = ReservationState::Released;
        }
        Ok(())
    }

    async fn balance(
        &self,
        employee_id: EmployeeId,
        year: i32,
    ) -> Result<VacationBalance, LedgerError> {
        let mut inner = lock(&self.inner);
        let default_days = self.default_annual_days;
        Ok(inner
            .balances
            .entry((employee_id, year))
            .or_insert_with(|| VacationBalance::new(employee_id, year, default_days))
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_reserve_and_commit() {
        let store = InMemoryLedgerStore::new(10);
        let employee = EmployeeId::new();

        let id = store.reserve(employee, 2026, 5).await.unwrap();
        let balance = store.balance(employee, 2026).await.unwrap();
        assert_eq!(balance.days_reserved, 5);

        store.commit(id).await.unwrap();
        let balance = store.balance(employee, 2026).await.unwrap();
        assert_eq!(balance.days_taken, 5);
        assert_eq!(balance.days_reserved, 0);
    }

    #[tokio::test]
    async fn test_overdraw_fails() {
        let store = InMemoryLedgerStore::new(10);
        let employee = EmployeeId::new();

        store.reserve(employee, 2026, 5).await.unwrap();
        let err = store.reserve(employee, 2026, 6).await.unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
    }

    #[tokio::test]
    async fn test_commit_is_idempotent() {
        let store = InMemoryLedgerStore::new(10);
        let employee = EmployeeId::new();
        let id = store.reserve(employee, 2026, 4).await.unwrap();

        store.commit(id).await.unwrap();
        store.commit(id).await.unwrap();

        let balance = store.balance(employee, 2026).await.unwrap();
        assert_eq!(balance.days_taken, 4);
        assert_eq!(balance.days_reserved, 0);
        assert!(balance.holds_invariant());
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let store = InMemoryLedgerStore::new(10);
        let employee = EmployeeId::new();
        let id = store.reserve(employee, 2026, 4).await.unwrap();

        store.release(id).await.unwrap();
        store.release(id).await.unwrap();

        let balance = store.balance(employee, 2026).await.unwrap();
        assert_eq!(balance.days_taken, 0);
        assert_eq!(balance.days_reserved, 0);
        assert_eq!(balance.remaining(), 10);
    }

    #[tokio::test]
    async fn test_unknown_reservation_errors() {
        let store = InMemoryLedgerStore::new(10);
        let err = store.commit(ReservationId::new()).await.unwrap_err();
        assert!(matches!(err, LedgerError::ReservationNotFound(_)));
    }

    #[tokio::test]
    async fn test_years_are_independent() {
        let store = InMemoryLedgerStore::new(10);
        let employee = EmployeeId::new();

        store.reserve(employee, 2026, 10).await.unwrap();
        assert!(store.reserve(employee, 2027, 10).await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reserves_never_overdraw() {
        let store = Arc::new(InMemoryLedgerStore::new(10));
        let employee = EmployeeId::new();

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.reserve(employee, 2026, 3).await })
            })
            .collect();

        let results = join_all(tasks).await;
        let successes = results
            .into_iter()
            .filter(|r| matches!(r, Ok(Ok(_))))
            .count();

        // 3 reservations of 3 days fit into 10; the 4th would overdraw.
        assert_eq!(successes, 3);
        let balance = store.balance(employee, 2026).await.unwrap();
        assert_eq!(balance.days_reserved, 9);
        assert!(balance.holds_invariant());
    }
}
