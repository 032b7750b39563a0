//! Custom Axum extractors.

pub mod owner;
pub mod path;

pub use owner::Owner;
pub use path::parse_entry_id;
