//! Persistent storage
//!
//! A generic key-value layer plus the adapter that maps the reminder record
//! onto a fixed set of keys.

pub mod kv;
pub mod reminder_store;

pub use kv::{JsonFileStore, KeyValueStore};
#[cfg(test)]
pub use kv::MemoryStore;
pub use reminder_store::{ReminderPatch, ReminderStore};
