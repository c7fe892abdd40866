use parking_lot::RwLock;
use solana_sdk::pubkey::Pubkey;
use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use crate::scan::{AccountCategory, ClassifiedAccount};

/// One owner's classified accounts at a point in time. Immutable once
/// installed; readers hold an `Arc` and are never torn by a refresh.
#[derive(Debug, Clone)]
pub struct InventorySnapshot {
    pub owner: Pubkey,
    /// Issuance ticket of the refresh that produced this snapshot.
    pub generation: u64,
    pub accounts: Vec<ClassifiedAccount>,
    pub unresolved: usize,
    pub taken_at: Instant,
}

impl InventorySnapshot {
    pub fn accounts_in(
        &self,
        category: AccountCategory,
    ) -> impl Iterator<Item = &ClassifiedAccount> {
        self.accounts.iter().filter(move |account| account.category == category)
    }

    pub fn find(&self, account_address: &Pubkey) -> Option<&ClassifiedAccount> {
        self.accounts.iter().find(|account| account.record.account_address == *account_address)
    }

    pub fn reclaimable_lamports(&self) -> u64 {
        self.accounts_in(AccountCategory::Cleanable).map(|a| a.record.rent_lamports).sum()
    }
}

/// Whole-snapshot cache with monotonic issuance tickets. Refreshes may
/// finish out of order; only the newest generation is ever installed.
pub struct InventoryCache {
    snapshot: RwLock<Option<Arc<InventorySnapshot>>>,
    ticket: AtomicU64,
    max_age: Duration,
}

impl InventoryCache {
    pub fn new(max_age: Duration) -> Self {
        Self { snapshot: RwLock::new(None), ticket: AtomicU64::new(0), max_age }
    }

    /// Reserve the generation for a refresh about to start.
    pub fn next_ticket(&self) -> u64 {
        self.ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Install a finished snapshot unless a newer generation already
    /// landed. Returns the snapshot readers now see.
    pub fn install(&self, snapshot: InventorySnapshot) -> Arc<InventorySnapshot> {
        let mut guard = self.snapshot.write();
        match guard.as_ref() {
            Some(current) if current.generation >= snapshot.generation => {
                log::debug!(
                    "Dropping stale inventory generation {} (current {})",
                    snapshot.generation,
                    current.generation
                );
                Arc::clone(current)
            }
            _ => {
                let installed = Arc::new(snapshot);
                *guard = Some(Arc::clone(&installed));
                installed
            }
        }
    }

    pub fn get(&self) -> Option<Arc<InventorySnapshot>> {
        self.snapshot.read().clone()
    }

    pub fn clear(&self) {
        *self.snapshot.write() = None;
    }

    pub fn is_stale(&self) -> bool {
        match self.get() {
            Some(snapshot) => snapshot.taken_at.elapsed() >= self.max_age,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{scan::TokenAccountRecord, token::TokenProgramVariant};

    fn classified(category: AccountCategory, rent_lamports: u64) -> ClassifiedAccount {
        ClassifiedAccount {
            record: TokenAccountRecord {
                account_address: Pubkey::new_unique(),
                mint_address: Pubkey::new_unique(),
                raw_amount: if category == AccountCategory::Cleanable { 0 } else { 1 },
                owner_program: TokenProgramVariant::Spl,
                rent_lamports,
            },
            decimals: 0,
            category,
        }
    }

    fn snapshot(generation: u64, accounts: Vec<ClassifiedAccount>) -> InventorySnapshot {
        InventorySnapshot {
            owner: Pubkey::new_unique(),
            generation,
            accounts,
            unresolved: 0,
            taken_at: Instant::now(),
        }
    }

    #[test]
    fn test_install_and_get() {
        let cache = InventoryCache::new(Duration::from_secs(30));
        assert!(cache.get().is_none());

        let ticket = cache.next_ticket();
        cache.install(snapshot(ticket, vec![]));
        assert_eq!(cache.get().unwrap().generation, ticket);
    }

    #[test]
    fn test_stale_refresh_result_is_dropped() {
        let cache = InventoryCache::new(Duration::from_secs(30));
        let first = cache.next_ticket();
        let second = cache.next_ticket();

        // The later refresh finishes first
        cache.install(snapshot(second, vec![classified(AccountCategory::Cleanable, 100)]));
        let seen = cache.install(snapshot(first, vec![]));

        assert_eq!(seen.generation, second);
        assert_eq!(cache.get().unwrap().generation, second);
        assert_eq!(cache.get().unwrap().accounts.len(), 1);
    }

    #[test]
    fn test_clear_empties_the_cache() {
        let cache = InventoryCache::new(Duration::from_secs(30));
        let ticket = cache.next_ticket();
        cache.install(snapshot(ticket, vec![]));

        cache.clear();
        assert!(cache.get().is_none());
        assert!(cache.is_stale());
    }

    #[test]
    fn test_staleness_tracks_age() {
        let cache = InventoryCache::new(Duration::from_millis(0));
        let ticket = cache.next_ticket();
        cache.install(snapshot(ticket, vec![]));
        assert!(cache.is_stale());

        let cache = InventoryCache::new(Duration::from_secs(3600));
        let ticket = cache.next_ticket();
        cache.install(snapshot(ticket, vec![]));
        assert!(!cache.is_stale());
    }

    #[test]
    fn test_snapshot_views() {
        let cleanable = classified(AccountCategory::Cleanable, 2_039_280);
        let nft = classified(AccountCategory::Nft, 2_039_280);
        let target = cleanable.record.account_address;
        let snap = snapshot(1, vec![cleanable, nft]);

        assert_eq!(snap.accounts_in(AccountCategory::Cleanable).count(), 1);
        assert_eq!(snap.accounts_in(AccountCategory::FungibleToken).count(), 0);
        assert_eq!(snap.reclaimable_lamports(), 2_039_280);
        assert!(snap.find(&target).is_some());
        assert!(snap.find(&Pubkey::new_unique()).is_none());
    }
}
