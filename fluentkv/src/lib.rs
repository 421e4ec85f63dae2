//! # FluentKV - Fluent Key-Value Requests
//!
//! FluentKV puts a small, typed builder layer in front of any key-value
//! backend that implements [`store::DataStoreProvider`]. Callers describe a
//! request through chained setters and finish it with a terminal call that
//! picks the value encoding.
//!
//! ## Operations
//!
//! - **get**: read a key as bytes, text, a counter or a protobuf message
//! - **set**: write a key unconditionally, with an optional TTL
//! - **compare_and_set**: write only if the stored version still matches
//! - **increment**: atomically add to a counter, seeding absent keys
//! - **touch**: replace a key's expiry
//! - **enumerate**: stream a key prefix in either direction
//!
//! ## Quick Start
//!
//! ```rust
//! use fluentkv::context::Context;
//! use fluentkv::store::memory::InMemoryDataStore;
//! use fluentkv::store::DataStore;
//!
//! # fn main() -> fluentkv::errors::StoreResult<()> {
//! let store = DataStore::new(InMemoryDataStore::default());
//! let ctx = Context::background();
//!
//! store.set(&ctx).by_key(format_args!("user:{}", 1)).with_ttl(60).string("ada")?;
//! assert_eq!(store.get(&ctx).by_key("user:1").to_string()?, "ada");
//!
//! let previous = store.increment(&ctx).by_key("logins").execute()?;
//! assert_eq!(previous, 0);
//! assert_eq!(store.get(&ctx).by_key("logins").to_counter()?, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`codec`] - Value encodings (binary, text, counter, protobuf)
//! - [`context`] - Cancellation and deadlines
//! - [`entry`] - Entry types and the found/not-found result
//! - [`errors`] - Error types and result definitions
//! - [`operation`] - The request builders
//! - [`store`] - The DataStore contract and the in-memory backend

pub mod codec;
pub mod context;
pub mod entry;
pub mod errors;
pub mod operation;
pub mod store;

pub use context::Context;
pub use entry::{CounterEntry, Lookup, ProtoEntry, RawEntry};
pub use errors::{ErrorKind, StoreError, StoreResult};
pub use store::{DataStore, DataStoreProvider};
