//! # citrus-service
//!
//! Business logic for CitrusNotes. [`EntryService`] owns every tree
//! invariant (valid parents, no cycles, cascading deletes, tag uniqueness)
//! and computes the favorites view; storage backends only persist what it
//! decides.
//!
//! Services follow constructor injection: all dependencies are provided at
//! construction time via `Arc` references.

pub mod context;
pub mod entry;

pub use context::RequestContext;
pub use entry::{CreateEntryRequest, EntryService, UploadFileRequest};
