//! The DataStore capability boundary.
//!
//! Operation builders depend only on [`DataStoreProvider`], the narrow raw
//! contract (`get_raw`, `set_raw`, `compare_and_set_raw`, `increment_raw`,
//! `touch_raw`, `enumerate_raw`). Anything that can honour it, from an
//! embedded engine to a network client, can sit behind a [`DataStore`].
//!
//! # Backends
//!
//! - **In-Memory**: [`memory::InMemoryDataStore`], an ordered concurrent map
//!   with TTL expiry and per-entry versions, for tests and embedded use

mod data_store;
pub mod memory;

pub use data_store::*;

#[cfg(test)]
pub(crate) use data_store::tests::recording_store;
