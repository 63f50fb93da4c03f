use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;

use super::StoreError;
use super::WaitlistStore;
use crate::domain::WaitlistEmail;
use crate::domain::WaitlistEntry;

/// Process-local store, used for local development and tests. The check and
/// the insert happen under one lock, which gives the same uniqueness guarantee
/// as a `UNIQUE` column.
#[derive(Default)]
pub struct MemoryWaitlistStore {
    entries: Mutex<BTreeSet<WaitlistEmail>>,
}

impl MemoryWaitlistStore {
    pub fn new() -> Self { Self::default() }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeSet<WaitlistEmail>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("waitlist mutex was poisoned").into())
    }

    /// Snapshot of every recorded email, in order
    pub fn emails(&self) -> Vec<String> {
        match self.entries.lock() {
            Ok(entries) => entries.iter().map(|e| e.as_ref().to_string()).collect(),
            Err(poisoned) => poisoned
                .into_inner()
                .iter()
                .map(|e| e.as_ref().to_string())
                .collect(),
        }
    }
}

#[async_trait]
impl WaitlistStore for MemoryWaitlistStore {
    async fn find_by_email(
        &self,
        email: &WaitlistEmail,
    ) -> Result<Option<WaitlistEntry>, StoreError> {
        let found = self.lock()?.get(email).cloned();
        Ok(found.map(|email| WaitlistEntry { email }))
    }

    async fn insert(
        &self,
        email: &WaitlistEmail,
    ) -> Result<WaitlistEntry, StoreError> {
        match self.lock()?.insert(email.clone()) {
            true => Ok(WaitlistEntry {
                email: email.clone(),
            }),
            false => Err(StoreError::Duplicate(email.clone())),
        }
    }
}
