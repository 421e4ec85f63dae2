use crate::codec::format_key;
use crate::context::Context;
use crate::errors::StoreResult;
use crate::store::DataStore;
use std::fmt::Display;

/// Replaces a key's expiry, leaving its value and version alone.
///
/// ```rust
/// use fluentkv::context::Context;
/// use fluentkv::store::memory::InMemoryDataStore;
/// use fluentkv::store::DataStore;
///
/// let store = DataStore::new(InMemoryDataStore::default());
/// let ctx = Context::background();
///
/// store.set(&ctx).by_key("session").with_ttl(30).string("token").unwrap();
/// store.touch(&ctx).by_key("session").with_ttl(0).execute().unwrap();
/// let entry = store.get(&ctx).by_key("session").to_entry().unwrap();
/// assert_eq!(entry.into_option().unwrap().ttl, None);
///
/// assert!(store.touch(&ctx).by_key("missing").execute().unwrap_err().is_not_found());
/// ```
pub struct TouchOperation {
    store: DataStore,
    ctx: Context,
    key: Vec<u8>,
    ttl_seconds: u32,
}

impl TouchOperation {
    pub fn new(store: DataStore, ctx: Context) -> TouchOperation {
        TouchOperation {
            store,
            ctx,
            key: Vec::new(),
            ttl_seconds: 0,
        }
    }

    /// Selects the key from anything displayable.
    pub fn by_key<K: Display>(mut self, key: K) -> TouchOperation {
        self.key = format_key(key);
        self
    }

    /// Selects the key as raw bytes, used verbatim.
    pub fn by_raw_key<K: Into<Vec<u8>>>(mut self, key: K) -> TouchOperation {
        self.key = key.into();
        self
    }

    /// New TTL in seconds; 0 removes the expiry.
    pub fn with_ttl(mut self, ttl_seconds: u32) -> TouchOperation {
        self.ttl_seconds = ttl_seconds;
        self
    }

    /// Fails with `NotFound` when the key is absent or already expired.
    pub fn execute(self) -> StoreResult<()> {
        self.store.touch_raw(&self.ctx, &self.key, self.ttl_seconds)
    }
}
