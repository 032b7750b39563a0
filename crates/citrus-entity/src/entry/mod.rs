//! File and folder entry entities.

pub mod model;
pub mod table;
pub mod tags;
pub mod tree;

pub use model::{ContentRef, Entry, NewEntry};
pub use table::EntryTable;
pub use tags::TagSet;
pub use tree::EntryNode;
