use crate::context::Context;
use crate::entry::{Lookup, RawEntry};
use crate::errors::StoreResult;
use crate::operation::{
    CompareAndSetOperation, EnumerateOperation, GetOperation, IncrementOperation, SetOperation,
    TouchOperation,
};
use std::ops::Deref;
use std::sync::Arc;

/// Raw capability contract every key-value backend implements.
///
/// # Purpose
/// The operation builders never touch storage themselves: they marshal their
/// configuration into one of these calls and decode what comes back. Storing
/// bytes, expiring entries, resolving versions and iterating key ranges are
/// all the provider's job.
///
/// # Contract
/// - Every method receives the caller's [`Context`] and should return a
///   cancellation error promptly once it is done.
/// - A `ttl_seconds` of 0 means the entry never expires.
/// - Versions are opaque, monotonically advancing tokens. Version 0 is never
///   assigned to a stored entry.
///
/// # Thread Safety
/// Implementers must be `Send + Sync`; independently constructed operations
/// may call into the same provider concurrently.
pub trait DataStoreProvider: Send + Sync {
    /// Reads a key.
    ///
    /// # Arguments
    /// * `ctx` - Cancellation scope
    /// * `key` - The key to read
    /// * `required` - When true a miss is an error instead of `NotFound`
    ///
    /// # Returns
    /// * `Ok(Lookup::Found(entry))` with value, remaining TTL and version
    /// * `Ok(Lookup::NotFound)` if the key is absent and `required` is false
    /// * `Err(StoreError)` of kind `NotFound` if absent and `required` is true
    fn get_raw(&self, ctx: &Context, key: &[u8], required: bool) -> StoreResult<Lookup<RawEntry>>;

    /// Unconditionally writes `value` under `key`.
    fn set_raw(&self, ctx: &Context, key: &[u8], value: Vec<u8>, ttl_seconds: u32) -> StoreResult<()>;

    /// Writes `value` only if the stored version equals `expected_version`.
    ///
    /// An `expected_version` of 0 means the key must not exist yet.
    ///
    /// # Returns
    /// * `Ok(true)` if the write was applied
    /// * `Ok(false)` if the version did not match; nothing was written
    /// * `Err(StoreError)` for any genuine failure
    fn compare_and_set_raw(
        &self,
        ctx: &Context,
        key: &[u8],
        value: Vec<u8>,
        ttl_seconds: u32,
        expected_version: u64,
    ) -> StoreResult<bool>;

    /// Atomically adds `delta` to the counter stored under `key`, seeding it
    /// with `initial` when absent.
    ///
    /// # Returns
    /// * `Ok(previous)` - the value before `delta` was applied
    fn increment_raw(
        &self,
        ctx: &Context,
        key: &[u8],
        initial: i64,
        delta: i64,
        ttl_seconds: u32,
    ) -> StoreResult<i64>;

    /// Replaces the expiry of `key` without touching its value or version.
    fn touch_raw(&self, ctx: &Context, key: &[u8], ttl_seconds: u32) -> StoreResult<()>;

    /// Streams every live entry whose key starts with `prefix`.
    ///
    /// # Arguments
    /// * `prefix` - Range root; only keys starting with it are visited
    /// * `seek` - Position to start from; forward scans begin at the first key
    ///   `>= seek`, reverse scans at the last key `<= seek` (or at the end of
    ///   the prefix range when `seek` equals `prefix`)
    /// * `batch_size` - Entries fetched per round trip, never zero
    /// * `reverse` - Descending key order when true
    /// * `only_keys` - Skip value transfer; entries carry an empty value
    /// * `callback` - Invoked once per entry in order; returning `false`
    ///   stops the scan without error
    #[allow(clippy::too_many_arguments)]
    fn enumerate_raw(
        &self,
        ctx: &Context,
        prefix: &[u8],
        seek: &[u8],
        batch_size: usize,
        reverse: bool,
        only_keys: bool,
        callback: &mut dyn FnMut(RawEntry) -> bool,
    ) -> StoreResult<()>;
}

/// Shared handle to a [`DataStoreProvider`] and the entry point for building
/// operations against it.
///
/// ```rust
/// use fluentkv::context::Context;
/// use fluentkv::store::memory::InMemoryDataStore;
/// use fluentkv::store::DataStore;
///
/// let store = DataStore::new(InMemoryDataStore::default());
/// let ctx = Context::background();
///
/// store.set(&ctx).by_key(format_args!("user:{}", 42)).string("ada").unwrap();
/// let name = store.get(&ctx).by_key("user:42").to_string().unwrap();
/// assert_eq!(name, "ada");
/// ```
#[derive(Clone)]
pub struct DataStore {
    inner: Arc<dyn DataStoreProvider>,
}

impl DataStore {
    pub fn new<T: DataStoreProvider + 'static>(inner: T) -> Self {
        DataStore { inner: Arc::new(inner) }
    }

    pub fn from_arc(inner: Arc<dyn DataStoreProvider>) -> Self {
        DataStore { inner }
    }

    pub fn get(&self, ctx: &Context) -> GetOperation {
        GetOperation::new(self.clone(), ctx.clone())
    }

    pub fn set(&self, ctx: &Context) -> SetOperation {
        SetOperation::new(self.clone(), ctx.clone())
    }

    pub fn compare_and_set(&self, ctx: &Context) -> CompareAndSetOperation {
        CompareAndSetOperation::new(self.clone(), ctx.clone())
    }

    pub fn increment(&self, ctx: &Context) -> IncrementOperation {
        IncrementOperation::new(self.clone(), ctx.clone())
    }

    pub fn touch(&self, ctx: &Context) -> TouchOperation {
        TouchOperation::new(self.clone(), ctx.clone())
    }

    pub fn enumerate(&self, ctx: &Context) -> EnumerateOperation {
        EnumerateOperation::new(self.clone(), ctx.clone())
    }
}

impl Deref for DataStore {
    type Target = Arc<dyn DataStoreProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
