//! Entry persistence seam.
//!
//! Reads go through [`EntryRepository`] and observe a consistent snapshot.
//! Every mutation runs inside an [`EntryTransaction`] that serializes writers
//! of the same owner; dropping a transaction without committing discards
//! everything it did.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use citrus_core::result::AppResult;
use citrus_core::types::{EntryId, OwnerId};
use citrus_entity::entry::{Entry, EntryTable};

pub use memory::MemoryEntryRepository;
pub use postgres::PgEntryRepository;

/// Storage backend for one or more owners' entry trees.
#[async_trait]
pub trait EntryRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Backend name (e.g., "postgres", "memory").
    fn backend(&self) -> &str;

    /// Check whether the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Find an entry owned by `owner_id`.
    async fn find_by_id(&self, owner_id: OwnerId, id: EntryId) -> AppResult<Option<Entry>>;

    /// Direct children of `parent_id` (None for the root level), in listing order.
    async fn list_children(
        &self,
        owner_id: OwnerId,
        parent_id: Option<EntryId>,
    ) -> AppResult<Vec<Entry>>;

    /// Consistent copy of every entry the owner has.
    async fn snapshot(&self, owner_id: OwnerId) -> AppResult<EntryTable>;

    /// Open a write transaction for `owner_id`, waiting for any other writer
    /// of the same owner to finish first.
    async fn begin(&self, owner_id: OwnerId) -> AppResult<Box<dyn EntryTransaction>>;
}

/// Unit of work over a single owner's entries.
#[async_trait]
pub trait EntryTransaction: Send {
    /// The owner this transaction is scoped to.
    fn owner_id(&self) -> OwnerId;

    /// Load an entry of this owner.
    async fn get(&mut self, id: EntryId) -> AppResult<Option<Entry>>;

    /// Ancestor ids of `id`, nearest first, excluding `id` itself.
    async fn ancestors(&mut self, id: EntryId) -> AppResult<Vec<EntryId>>;

    /// `id` and all of its descendants, every child before its parent.
    async fn subtree(&mut self, id: EntryId) -> AppResult<Vec<Entry>>;

    /// Insert a new entry.
    async fn insert(&mut self, entry: &Entry) -> AppResult<()>;

    /// Overwrite the mutable columns of an existing entry.
    async fn update(&mut self, entry: &Entry) -> AppResult<()>;

    /// Remove the given entries. Returns how many rows went away.
    async fn delete(&mut self, ids: &[EntryId]) -> AppResult<u64>;

    /// Number of this owner's entries, outside `excluding`, that reference `blob_key`.
    async fn count_blob_refs(&mut self, blob_key: &str, excluding: &[EntryId]) -> AppResult<u64>;

    /// Make every change visible atomically.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}
