//! In-memory store implementations.
//!
//! Mutex-guarded maps satisfying the same atomic/optimistic contracts as
//! the SQL repositories: `reserve` is a single check-and-increment under
//! the lock, `transition` is a compare-and-swap on the version, and the
//! notification sink deduplicates on `(request_id, kind)`. They back the
//! engine test-suite and double as reference semantics for any other
//! storage implementation.

pub mod directory;
pub mod ledger;
pub mod notification;
pub mod request;

pub use directory::InMemoryDirectory;
pub use ledger::InMemoryLedgerStore;
pub use notification::InMemoryNotificationSink;
pub use request::InMemoryRequestStore;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks a mutex, recovering the guard from a poisoned lock.
///
/// The in-memory stores hold the lock only for short, non-panicking
/// critical sections; if a test thread panicked anyway, the data is still
/// the most recent consistent snapshot.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
