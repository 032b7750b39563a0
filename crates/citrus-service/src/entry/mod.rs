//! Entry tree operations.

pub mod favorites;
pub mod service;

pub use favorites::favorites_forest;
pub use service::{CreateEntryRequest, EntryService, UploadFileRequest};
