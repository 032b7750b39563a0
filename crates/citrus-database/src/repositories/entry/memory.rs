//! In-memory entry backend.
//!
//! Each owner gets an [`EntryTable`] behind its own async `RwLock`. A
//! transaction holds the owner's write guard for its whole lifetime and
//! mutates a private copy, which replaces the shared table on commit.
//! An owner's slot is dropped again once its table is empty and no other
//! task holds it.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};
use tracing::debug;

use citrus_core::error::AppError;
use citrus_core::result::AppResult;
use citrus_core::types::{EntryId, OwnerId};
use citrus_entity::entry::{Entry, EntryTable};

use super::{EntryRepository, EntryTransaction};

type SharedTable = Arc<RwLock<EntryTable>>;
type OwnerTables = Arc<DashMap<OwnerId, SharedTable>>;

/// Process-local entry repository.
#[derive(Debug, Default)]
pub struct MemoryEntryRepository {
    owners: OwnerTables,
}

impl MemoryEntryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of owners currently holding a table.
    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }

    fn table(&self, owner_id: OwnerId) -> SharedTable {
        // The DashMap shard lock is released before any await.
        self.owners.entry(owner_id).or_default().value().clone()
    }

    fn existing_table(&self, owner_id: OwnerId) -> Option<SharedTable> {
        self.owners.get(&owner_id).map(|t| t.value().clone())
    }
}

#[async_trait]
impl EntryRepository for MemoryEntryRepository {
    fn backend(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn find_by_id(&self, owner_id: OwnerId, id: EntryId) -> AppResult<Option<Entry>> {
        let Some(table) = self.existing_table(owner_id) else {
            return Ok(None);
        };
        let table = table.read().await;
        Ok(table.get(id).cloned())
    }

    async fn list_children(
        &self,
        owner_id: OwnerId,
        parent_id: Option<EntryId>,
    ) -> AppResult<Vec<Entry>> {
        let Some(table) = self.existing_table(owner_id) else {
            return Ok(Vec::new());
        };
        let table = table.read().await;
        Ok(table.children_of(parent_id).into_iter().cloned().collect())
    }

    async fn snapshot(&self, owner_id: OwnerId) -> AppResult<EntryTable> {
        let Some(table) = self.existing_table(owner_id) else {
            return Ok(EntryTable::new());
        };
        let table = table.read().await;
        Ok(EntryTable::clone(&table))
    }

    async fn begin(&self, owner_id: OwnerId) -> AppResult<Box<dyn EntryTransaction>> {
        let guard = self.table(owner_id).write_owned().await;
        let working = EntryTable::clone(&guard);
        debug!(owner_id = %owner_id, entries = working.len(), "Entry transaction started");
        Ok(Box::new(MemoryEntryTransaction {
            owner_id,
            owners: self.owners.clone(),
            guard,
            working,
        }))
    }
}

/// Write transaction over one owner's table.
struct MemoryEntryTransaction {
    owner_id: OwnerId,
    owners: OwnerTables,
    guard: OwnedRwLockWriteGuard<EntryTable>,
    working: EntryTable,
}

impl Drop for MemoryEntryTransaction {
    fn drop(&mut self) {
        if !self.guard.is_empty() {
            return;
        }
        // One reference lives in the map and one in our guard; any other
        // holder is a reader or a queued writer that still needs the slot.
        let removed = self
            .owners
            .remove_if(&self.owner_id, |_, table| Arc::strong_count(table) == 2);
        if removed.is_some() {
            debug!(owner_id = %self.owner_id, "Released empty owner table");
        }
    }
}

#[async_trait]
impl EntryTransaction for MemoryEntryTransaction {
    fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    async fn get(&mut self, id: EntryId) -> AppResult<Option<Entry>> {
        Ok(self.working.get(id).cloned())
    }

    async fn ancestors(&mut self, id: EntryId) -> AppResult<Vec<EntryId>> {
        Ok(self.working.ancestors(id))
    }

    async fn subtree(&mut self, id: EntryId) -> AppResult<Vec<Entry>> {
        Ok(self
            .working
            .subtree_post_order(id)
            .into_iter()
            .filter_map(|id| self.working.get(id).cloned())
            .collect())
    }

    async fn insert(&mut self, entry: &Entry) -> AppResult<()> {
        if self.working.contains(entry.id) {
            return Err(AppError::internal(format!("Entry {} already exists", entry.id)));
        }
        self.working.upsert(entry.clone());
        Ok(())
    }

    async fn update(&mut self, entry: &Entry) -> AppResult<()> {
        if !self.working.contains(entry.id) {
            return Err(
                AppError::not_found(format!("Entry {} not found", entry.id)).for_entry(entry.id)
            );
        }
        self.working.upsert(entry.clone());
        Ok(())
    }

    async fn delete(&mut self, ids: &[EntryId]) -> AppResult<u64> {
        let removed = ids
            .iter()
            .filter(|id| self.working.remove(**id).is_some())
            .count();
        Ok(removed as u64)
    }

    async fn count_blob_refs(&mut self, blob_key: &str, excluding: &[EntryId]) -> AppResult<u64> {
        let count = self
            .working
            .iter()
            .filter(|e| !excluding.contains(&e.id))
            .filter(|e| e.content.as_ref().is_some_and(|c| c.blob_key == blob_key))
            .count();
        Ok(count as u64)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let mut tx = self;
        let working = std::mem::take(&mut tx.working);
        *tx.guard = working;
        debug!(owner_id = %tx.owner_id, entries = tx.guard.len(), "Entry transaction committed");
        Ok(())
    }
}
