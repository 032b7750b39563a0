//! # citrus-database
//!
//! Entry store backends for CitrusNotes: a PostgreSQL implementation built
//! on sqlx and an in-memory implementation used for development and tests.
//! Both expose the same [`EntryRepository`] / [`EntryTransaction`] seam so
//! that all validation logic lives once, in the service layer.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::entry::{
    EntryRepository, EntryTransaction, MemoryEntryRepository, PgEntryRepository,
};
