use crate::codec::format_key;
use crate::context::Context;
use crate::errors::StoreResult;
use crate::store::DataStore;
use std::fmt::Display;

/// Step applied when no delta is configured.
pub const DEFAULT_DELTA: i64 = 1;

/// Atomically adds to a counter and returns its value before the addition.
///
/// An absent key is seeded with the initial value (0 unless configured), so
/// the first call returns the seed and stores `seed + delta`.
///
/// ```rust
/// use fluentkv::context::Context;
/// use fluentkv::store::memory::InMemoryDataStore;
/// use fluentkv::store::DataStore;
///
/// let store = DataStore::new(InMemoryDataStore::default());
/// let ctx = Context::background();
///
/// let previous = store
///     .increment(&ctx)
///     .by_key("stock")
///     .with_initial_value(10)
///     .with_delta(-3)
///     .execute()
///     .unwrap();
/// assert_eq!(previous, 10);
/// assert_eq!(store.increment(&ctx).by_key("stock").execute().unwrap(), 7);
/// assert_eq!(store.get(&ctx).by_key("stock").to_counter().unwrap(), 8);
/// ```
pub struct IncrementOperation {
    store: DataStore,
    ctx: Context,
    key: Vec<u8>,
    ttl_seconds: u32,
    initial: i64,
    delta: i64,
}

impl IncrementOperation {
    pub fn new(store: DataStore, ctx: Context) -> IncrementOperation {
        IncrementOperation {
            store,
            ctx,
            key: Vec::new(),
            ttl_seconds: 0,
            initial: 0,
            delta: DEFAULT_DELTA,
        }
    }

    /// Selects the key from anything displayable.
    pub fn by_key<K: Display>(mut self, key: K) -> IncrementOperation {
        self.key = format_key(key);
        self
    }

    /// Selects the key as raw bytes, used verbatim.
    pub fn by_raw_key<K: Into<Vec<u8>>>(mut self, key: K) -> IncrementOperation {
        self.key = key.into();
        self
    }

    /// Expiry applied to the counter on every increment; 0 never expires.
    pub fn with_ttl(mut self, ttl_seconds: u32) -> IncrementOperation {
        self.ttl_seconds = ttl_seconds;
        self
    }

    /// Value the counter is seeded with when the key is absent. Ignored once
    /// the key exists.
    pub fn with_initial_value(mut self, initial: i64) -> IncrementOperation {
        self.initial = initial;
        self
    }

    /// Amount to add, negative to decrement. Defaults to [`DEFAULT_DELTA`].
    pub fn with_delta(mut self, delta: i64) -> IncrementOperation {
        self.delta = delta;
        self
    }

    /// Applies the increment.
    ///
    /// # Returns
    /// * `Ok(previous)` - the counter value before the delta was added
    pub fn execute(self) -> StoreResult<i64> {
        self.store.increment_raw(
            &self.ctx,
            &self.key,
            self.initial,
            self.delta,
            self.ttl_seconds,
        )
    }
}
