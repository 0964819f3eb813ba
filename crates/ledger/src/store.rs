use crate::account::{AccountSnapshot, AccountState};
use core_types::AccountId;
use dashmap::DashMap;
use std::sync::Arc;

/// Display name given to an account the first time a trade references it.
pub fn default_account_name(id: AccountId) -> String {
    format!("User-{id}")
}

/// Concurrency-safe registry of every account seen during a run.
///
/// Lookups only lock the shard holding the key, so readers of one account never
/// wait on unrelated accounts. Accounts are never removed.
#[derive(Debug, Default)]
pub struct AccountStore {
    accounts: DashMap<AccountId, Arc<AccountState>>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the single `AccountState` for `id`, creating it on first reference.
    ///
    /// Racing callers on an unseen id all receive the same instance. `make_name`
    /// runs before the map's shard lock is taken, so it may read the store; when
    /// callers race, each may build a name but only the winner's is kept.
    pub fn get_or_create<F>(&self, id: AccountId, make_name: F) -> Arc<AccountState>
    where
        F: FnOnce(AccountId) -> String,
    {
        if let Some(existing) = self.accounts.get(&id) {
            return Arc::clone(existing.value());
        }

        let name = make_name(id);
        let entry = self.accounts.entry(id).or_insert_with(|| {
            tracing::debug!(account_id = id, "Creating account.");
            Arc::new(AccountState::new(id, name))
        });
        Arc::clone(entry.value())
    }

    pub fn get(&self, id: AccountId) -> Option<Arc<AccountState>> {
        self.accounts.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Snapshots of every account, ordered by account id.
    ///
    /// Only meaningful as a final view once ingestion has fully drained.
    pub fn snapshot(&self) -> Vec<AccountSnapshot> {
        let accounts: Vec<Arc<AccountState>> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut snapshots: Vec<AccountSnapshot> =
            accounts.iter().map(|account| account.snapshot()).collect();
        snapshots.sort_by_key(|snapshot| snapshot.account_id);
        snapshots
    }
}
