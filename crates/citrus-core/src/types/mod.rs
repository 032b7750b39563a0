//! Core type definitions used across the CitrusNotes workspace.

pub mod id;

pub use id::{EntryId, OwnerId};
