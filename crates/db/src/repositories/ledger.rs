//! Ledger repository with row-level locking.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use permio_core::ledger::store::LedgerStore;
use permio_core::ledger::types::VacationBalance;
use permio_core::ledger::LedgerError;
use permio_shared::{EmployeeId, ReservationId};

use crate::entities::{reservations, sea_orm_active_enums::ReservationState, vacation_balances};

/// Postgres-backed [`LedgerStore`].
///
/// `reserve` takes a `SELECT ... FOR UPDATE` on the balance row so two
/// concurrent reservations for the same (employee, year) serialize; the
/// check-and-increment itself is the shared [`VacationBalance`] arithmetic.
#[derive(Debug, Clone)]
pub struct SeaOrmLedgerStore {
    db: DatabaseConnection,
    default_annual_days: u32,
}

impl SeaOrmLedgerStore {
    /// Creates a new ledger store granting `default_annual_days` to each
    /// lazily created balance year.
    #[must_use]
    pub const fn new(db: DatabaseConnection, default_annual_days: u32) -> Self {
        Self {
            db,
            default_annual_days,
        }
    }

    /// Locks the (employee, year) balance row, inserting it first if this
    /// is the year's first touch.
    async fn lock_balance(
        &self,
        txn: &DatabaseTransaction,
        employee_id: EmployeeId,
        year: i32,
    ) -> Result<vacation_balances::Model, LedgerError> {
        let existing = vacation_balances::Entity::find()
            .filter(vacation_balances::Column::EmployeeId.eq(employee_id.into_inner()))
            .filter(vacation_balances::Column::Year.eq(year))
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(db_err)?;

        if let Some(model) = existing {
            return Ok(model);
        }

        // First touch of this year. A concurrent first touch may race the
        // insert; ON CONFLICT DO NOTHING lets the loser fall through to the
        // re-select, which then blocks on the winner's lock.
        let now = Utc::now();
        let fresh = vacation_balances::ActiveModel {
            id: Set(Uuid::now_v7()),
            employee_id: Set(employee_id.into_inner()),
            year: Set(year),
            available_days: Set(days_to_db(self.default_annual_days)?),
            days_taken: Set(0),
            days_reserved: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        vacation_balances::Entity::insert(fresh)
            .on_conflict(
                OnConflict::columns([
                    vacation_balances::Column::EmployeeId,
                    vacation_balances::Column::Year,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(txn)
            .await
            .map_err(db_err)?;

        vacation_balances::Entity::find()
            .filter(vacation_balances::Column::EmployeeId.eq(employee_id.into_inner()))
            .filter(vacation_balances::Column::Year.eq(year))
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| LedgerError::Storage("balance row missing after insert".into()))
    }

    /// Settles a held reservation; `commit` moves days into `days_taken`,
    /// otherwise they return to availability. Settled reservations are left
    /// untouched so retries are no-ops.
    async fn settle(&self, reservation_id: ReservationId, commit: bool) -> Result<(), LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let reservation = reservations::Entity::find_by_id(reservation_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::ReservationNotFound(reservation_id))?;

        if matches!(
            reservation.state,
            ReservationState::Committed | ReservationState::Released
        ) {
            return Ok(());
        }

        let employee_id = EmployeeId::from_uuid(reservation.employee_id);
        let balance_model = self
            .lock_balance(&txn, employee_id, reservation.year)
            .await?;
        let mut balance = model_to_balance(&balance_model)?;
        let days = days_to_core(reservation.days)?;
        if commit {
            balance.settle_commit(days);
        } else {
            balance.settle_release(days);
        }

        let now = Utc::now();
        let mut balance_active: vacation_balances::ActiveModel = balance_model.into();
        balance_active.days_taken = Set(days_to_db(balance.days_taken)?);
        balance_active.days_reserved = Set(days_to_db(balance.days_reserved)?);
        balance_active.updated_at = Set(now.into());
        balance_active.update(&txn).await.map_err(db_err)?;

        let mut reservation_active: reservations::ActiveModel = reservation.into();
        reservation_active.state = Set(if commit {
            ReservationState::Committed
        } else {
            ReservationState::Released
        });
        reservation_active.updated_at = Set(now.into());
        reservation_active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        debug!(%reservation_id, commit, "reservation settled");
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for SeaOrmLedgerStore {
    async fn reserve(
        &self,
        employee_id: EmployeeId,
        year: i32,
        days: u32,
    ) -> Result<ReservationId, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let balance_model = self.lock_balance(&txn, employee_id, year).await?;
        let mut balance = model_to_balance(&balance_model)?;
        balance.try_reserve(days)?;

        let now = Utc::now();
        let mut balance_active: vacation_balances::ActiveModel = balance_model.into();
        balance_active.days_reserved = Set(days_to_db(balance.days_reserved)?);
        balance_active.updated_at = Set(now.into());
        balance_active.update(&txn).await.map_err(db_err)?;

        let reservation_id = ReservationId::new();
        let reservation = reservations::ActiveModel {
            id: Set(reservation_id.into_inner()),
            employee_id: Set(employee_id.into_inner()),
            year: Set(year),
            days: Set(days_to_db(days)?),
            state: Set(ReservationState::Held),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        reservation.insert(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        debug!(%employee_id, year, days, %reservation_id, "days reserved");
        Ok(reservation_id)
    }

    async fn commit(&self, reservation_id: ReservationId) -> Result<(), LedgerError> {
        self.settle(reservation_id, true).await
    }

    async fn release(&self, reservation_id: ReservationId) -> Result<(), LedgerError> {
        self.settle(reservation_id, false).await
    }

    async fn balance(
        &self,
        employee_id: EmployeeId,
        year: i32,
    ) -> Result<VacationBalance, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let model = self.lock_balance(&txn, employee_id, year).await?;
        txn.commit().await.map_err(db_err)?;
        model_to_balance(&model)
    }
}

// ============================================================================
// Conversion helpers
// ============================================================================

fn db_err(err: sea_orm::DbErr) -> LedgerError {
    LedgerError::Storage(err.to_string())
}

fn days_to_db(days: u32) -> Result<i32, LedgerError> {
    i32::try_from(days).map_err(|_| LedgerError::Storage("day count out of range".into()))
}

fn days_to_core(days: i32) -> Result<u32, LedgerError> {
    u32::try_from(days).map_err(|_| LedgerError::Storage("negative day count in storage".into()))
}

fn model_to_balance(model: &vacation_balances::Model) -> Result<VacationBalance, LedgerError> {
    Ok(VacationBalance {
        employee_id: EmployeeId::from_uuid(model.employee_id),
        year: model.year,
        available_days: days_to_core(model.available_days)?,
        days_taken: days_to_core(model.days_taken)?,
        days_reserved: days_to_core(model.days_reserved)?,
    })
}
