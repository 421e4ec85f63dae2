use crate::codec::{format_key, Payload};
use crate::context::Context;
use crate::errors::StoreResult;
use crate::store::DataStore;
use prost::Message;
use std::fmt::Display;

/// Writes one key only if its stored version still matches.
///
/// Terminal calls return `Ok(false)` when the version check fails, which is
/// an expected outcome rather than an error. The default version is 0, which
/// only succeeds when the key does not exist yet.
///
/// ```rust
/// use fluentkv::context::Context;
/// use fluentkv::store::memory::InMemoryDataStore;
/// use fluentkv::store::DataStore;
///
/// let store = DataStore::new(InMemoryDataStore::default());
/// let ctx = Context::background();
///
/// assert!(store.compare_and_set(&ctx).by_key("lock").string("a").unwrap());
/// assert!(!store.compare_and_set(&ctx).by_key("lock").string("b").unwrap());
///
/// let version = store.get(&ctx).by_key("lock").to_entry().unwrap().into_option().unwrap().version;
/// assert!(store
///     .compare_and_set(&ctx)
///     .by_key("lock")
///     .with_version(version)
///     .string("b")
///     .unwrap());
/// ```
pub struct CompareAndSetOperation {
    store: DataStore,
    ctx: Context,
    key: Vec<u8>,
    ttl_seconds: u32,
    version: u64,
}

impl CompareAndSetOperation {
    pub fn new(store: DataStore, ctx: Context) -> CompareAndSetOperation {
        CompareAndSetOperation {
            store,
            ctx,
            key: Vec::new(),
            ttl_seconds: 0,
            version: 0,
        }
    }

    /// Selects the key from anything displayable.
    pub fn by_key<K: Display>(mut self, key: K) -> CompareAndSetOperation {
        self.key = format_key(key);
        self
    }

    /// Selects the key as raw bytes, used verbatim.
    pub fn by_raw_key<K: Into<Vec<u8>>>(mut self, key: K) -> CompareAndSetOperation {
        self.key = key.into();
        self
    }

    /// Seconds until the entry expires if the write applies; 0 never expires.
    pub fn with_ttl(mut self, ttl_seconds: u32) -> CompareAndSetOperation {
        self.ttl_seconds = ttl_seconds;
        self
    }

    /// The version the stored entry must currently have, as read from a
    /// previous `to_entry` call.
    ///
    /// # Arguments
    /// * `version` - Expected version; 0 means the key must not exist
    pub fn with_version(mut self, version: u64) -> CompareAndSetOperation {
        self.version = version;
        self
    }

    pub fn binary<V: Into<Vec<u8>>>(self, value: V) -> StoreResult<bool> {
        self.payload(Payload::Binary(value.into()))
    }

    pub fn string<V: Into<String>>(self, value: V) -> StoreResult<bool> {
        self.payload(Payload::Text(value.into()))
    }

    pub fn counter(self, value: u64) -> StoreResult<bool> {
        self.payload(Payload::Counter(value))
    }

    pub fn proto<M: Message>(self, msg: &M) -> StoreResult<bool> {
        let payload = Payload::message(msg)?;
        self.payload(payload)
    }

    /// Conditionally writes an already chosen [`Payload`].
    ///
    /// # Returns
    /// * `Ok(true)` if the write was applied
    /// * `Ok(false)` if the stored version did not match
    pub fn payload(self, payload: Payload) -> StoreResult<bool> {
        let applied = self.store.compare_and_set_raw(
            &self.ctx,
            &self.key,
            payload.into_bytes(),
            self.ttl_seconds,
            self.version,
        )?;
        if !applied {
            log::debug!(
                "Compare-and-set on {} rejected at version {}",
                String::from_utf8_lossy(&self.key),
                self.version
            );
        }
        Ok(applied)
    }
}
