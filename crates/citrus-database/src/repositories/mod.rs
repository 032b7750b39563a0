//! Repository implementations for CitrusNotes entities.

pub mod entry;

pub use entry::{EntryRepository, EntryTransaction, MemoryEntryRepository, PgEntryRepository};
