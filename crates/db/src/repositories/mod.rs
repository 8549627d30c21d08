//! Repository implementations of the core storage contracts.
//!
//! Each repository satisfies one of the `permio-core` traits against
//! Postgres, hiding the `SeaORM` details from the rest of the application:
//! the ledger uses row-level locks for its atomic reserve, the request
//! store uses the version column for optimistic concurrency, and the
//! notification sink relies on the `(request_id, kind)` unique key for
//! receiver-side deduplication.

pub mod directory;
pub mod ledger;
pub mod notification;
pub mod request;

pub use directory::SeaOrmEmployeeDirectory;
pub use ledger::SeaOrmLedgerStore;
pub use notification::SeaOrmNotificationSink;
pub use request::SeaOrmRequestStore;
