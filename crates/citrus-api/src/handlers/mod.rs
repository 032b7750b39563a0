//! HTTP request handlers.

pub mod entry;
pub mod favorites;
pub mod health;
