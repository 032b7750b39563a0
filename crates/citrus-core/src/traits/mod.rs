//! Collaborator traits defined in `citrus-core` and implemented by other crates.

pub mod blob;

pub use blob::BlobStore;
