//! # citrus-entity
//!
//! Domain entity models for the CitrusNotes virtual file system. An
//! [`entry::Entry`] is a file or folder; the tree is expressed purely through
//! `parent_id` back-references and navigated through the flat
//! [`entry::EntryTable`] arena.

pub mod entry;

pub use entry::{ContentRef, Entry, EntryNode, EntryTable, NewEntry, TagSet};
