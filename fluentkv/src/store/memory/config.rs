use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default upper bound on key length, in bytes.
pub const DEFAULT_MAX_KEY_SIZE: usize = 65_000;
/// Default upper bound on value length, in bytes.
pub const DEFAULT_MAX_VALUE_SIZE: usize = 1 << 20;

/// Clock used for TTL bookkeeping, in milliseconds since the Unix epoch.
pub type TimeSource = Arc<dyn Fn() -> u128 + Send + Sync>;

/// Current wall-clock time in milliseconds, or 0 if the clock is before the
/// epoch.
#[inline]
pub fn current_time_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Configuration for an [`InMemoryDataStore`](super::InMemoryDataStore).
///
/// # Usage
/// ```text
/// let config = InMemoryStoreConfig::new()
///     .max_key_size(256)
///     .max_value_size(64 * 1024);
/// let store = InMemoryDataStore::new(config);
/// ```
#[derive(Clone)]
pub struct InMemoryStoreConfig {
    pub(crate) max_key_size: usize,
    pub(crate) max_value_size: usize,
    pub(crate) read_only: bool,
    pub(crate) time_source: TimeSource,
}

impl InMemoryStoreConfig {
    pub fn new() -> InMemoryStoreConfig {
        InMemoryStoreConfig {
            max_key_size: DEFAULT_MAX_KEY_SIZE,
            max_value_size: DEFAULT_MAX_VALUE_SIZE,
            read_only: false,
            time_source: Arc::new(current_time_millis),
        }
    }

    /// Keys longer than this are rejected with `InvalidKey`.
    pub fn max_key_size(mut self, max_key_size: usize) -> InMemoryStoreConfig {
        self.max_key_size = max_key_size;
        self
    }

    /// Values longer than this are rejected with `InvalidRequest`.
    pub fn max_value_size(mut self, max_value_size: usize) -> InMemoryStoreConfig {
        self.max_value_size = max_value_size;
        self
    }

    /// A read-only store rejects every write with `ReadOnlyTransaction`.
    pub fn read_only(mut self, read_only: bool) -> InMemoryStoreConfig {
        self.read_only = read_only;
        self
    }

    /// Replaces the wall clock, mostly so tests can move time forward.
    pub fn time_source(mut self, time_source: TimeSource) -> InMemoryStoreConfig {
        self.time_source = time_source;
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn get_max_key_size(&self) -> usize {
        self.max_key_size
    }

    pub fn get_max_value_size(&self) -> usize {
        self.max_value_size
    }

    #[inline]
    pub(crate) fn now(&self) -> u128 {
        (self.time_source)()
    }
}

impl Default for InMemoryStoreConfig {
    fn default() -> Self {
        InMemoryStoreConfig::new()
    }
}

impl Debug for InMemoryStoreConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStoreConfig")
            .field("max_key_size", &self.max_key_size)
            .field("max_value_size", &self.max_value_size)
            .field("read_only", &self.read_only)
            .finish_non_exhaustive()
    }
}
