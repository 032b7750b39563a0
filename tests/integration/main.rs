//! End-to-end tests of the CitrusNotes HTTP API and service invariants.

mod helpers;

mod entries_test;
mod favorites_test;
mod tree_properties_test;
