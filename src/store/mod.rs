//! User-record storage.
//!
//! The authentication workflow only talks to the [`UserStore`] trait. Two adapters ship
//! with the crate: [`MemoryUserStore`] for tests and single-process deployments, and
//! [`PgUserStore`] backed by Postgres.
//!
//! Both adapters enforce username uniqueness on `insert` and report a clash as
//! [`StoreError::Conflict`]. Neither makes "count then insert" atomic, so two concurrent
//! registrations into an empty store can both be granted the admin role.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::models::{NewUser, User, UserUpdate};

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

/// Failures reported by a [`UserStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with this username.
    #[error("user '{0}' not found")]
    NotFound(String),
    /// A record with this username already exists.
    #[error("user '{0}' already exists")]
    Conflict(String),
    /// Any other backend failure, opaque to callers.
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Converts `sqlx::Error` into `StoreError`.
///
/// `RowNotFound` has no username to report, so callers that can produce
/// it should map it themselves.
impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        StoreError::Backend(error.to_string())
    }
}

/// Persistence contract consumed by the authentication workflow.
///
/// Implementations own their connection handling and must be safe to share
/// between request handlers.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Looks up a record by username. `Ok(None)` when absent.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Persists a new record and returns it with its assigned id.
    /// Fails with [`StoreError::Conflict`] if the username is taken.
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    /// Applies `update` to the record for `username`.
    /// Fails with [`StoreError::NotFound`] if there is no such record.
    async fn update_fields(&self, username: &str, update: UserUpdate) -> Result<(), StoreError>;

    /// Number of stored records.
    async fn count(&self) -> Result<u64, StoreError>;
}
