//! Persistence of waitlist entries. The service only ever needs a point lookup
//! and an insert, so every backend sits behind `WaitlistStore` and the signup
//! flow never knows which one it talks to.

mod memory;
mod postgres;
mod rest;

use std::fmt::Debug;

use async_trait::async_trait;
pub use memory::MemoryWaitlistStore;
pub use postgres::PgWaitlistStore;
pub use rest::RestWaitlistStore;

use crate::domain::WaitlistEmail;
use crate::domain::WaitlistEntry;
use crate::utils::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum StoreError {
    /// The store's uniqueness constraint rejected the insert. This, and not
    /// the preceding lookup, is the authoritative duplicate signal.
    #[error("{0} is already on the waitlist")]
    Duplicate(WaitlistEmail),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for StoreError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[async_trait]
pub trait WaitlistStore: Send + Sync {
    /// Exact-match lookup on the (already normalised) email
    async fn find_by_email(
        &self,
        email: &WaitlistEmail,
    ) -> Result<Option<WaitlistEntry>, StoreError>;

    /// Insert one entry; `StoreError::Duplicate` if it already exists
    async fn insert(
        &self,
        email: &WaitlistEmail,
    ) -> Result<WaitlistEntry, StoreError>;
}
