//! Employee identity and directory access.
//!
//! The HR employee directory is an external collaborator; the workflow only
//! reads it through the [`EmployeeDirectory`] seam.

pub mod directory;
pub mod types;

pub use directory::{DirectoryError, EmployeeDirectory};
pub use types::{AccessLevel, Employee, EmployeeStatus};
