//! Storage abstraction for the mailcast address book.
//!
//! Backend crates (e.g., mailcast-store-memory) implement the [`Store`]
//! trait so `mailcast-core` doesn't depend on any specific database engine
//! or schema details.

use thiserror::Error;

mod store;
pub mod types;

pub use store::Store;
pub use types::*;

#[cfg(feature = "test-support")]
pub use store::MockStore;

/// Uniform error type for all storage backends.
///
/// `Duplicate` is the consistency-violation signal: a lookup by a
/// supposedly-unique key matched more than one row. Backends must surface
/// it as-is; it is never folded into `NotFound` or resolved silently.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("duplicate rows for unique key")]
    Duplicate,
    #[error("backend error: {0}")]
    Backend(String),
}
