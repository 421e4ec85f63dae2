use super::InMemoryStoreConfig;
use crate::codec::{decode_counter, encode_counter};
use crate::context::Context;
use crate::entry::{Lookup, RawEntry};
use crate::errors::{ErrorKind, StoreError, StoreResult};
use crate::store::DataStoreProvider;
use crossbeam_skiplist::SkipMap;
use parking_lot::Mutex;
use std::ops::Bound::{self, Excluded, Included, Unbounded};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// In-memory [`DataStoreProvider`] backed by a concurrent skip list.
///
/// # Purpose
/// `InMemoryDataStore` keeps every entry in an ordered map so prefix scans run
/// in key order, stamps each write with a store-wide monotonically increasing
/// version, and expires entries lazily against its configured clock.
///
/// # Characteristics
/// - **Thread-Safe**: cheap to clone; clones share the same data
/// - **Lock-free reads**: `get_raw` and `enumerate_raw` only take the write
///   lock to purge expired entries they come across
/// - **Atomic read-modify-write**: compare-and-set, increment and touch are
///   serialised by a single write lock
/// - **No Persistence**: all data is lost when the store is dropped or closed
///
/// # Usage
/// ```text
/// let store = DataStore::new(InMemoryDataStore::new(InMemoryStoreConfig::new()));
/// store.set(&ctx).by_key("greeting").string("hello")?;
/// ```
#[derive(Clone, Default)]
pub struct InMemoryDataStore {
    inner: Arc<InMemoryDataStoreInner>,
}

impl InMemoryDataStore {
    pub fn new(config: InMemoryStoreConfig) -> InMemoryDataStore {
        InMemoryDataStore {
            inner: Arc::new(InMemoryDataStoreInner::new(config)),
        }
    }

    pub fn config(&self) -> &InMemoryStoreConfig {
        &self.inner.config
    }

    /// Closes the store and drops its contents. Every later call fails with
    /// `StoreAlreadyClosed`.
    pub fn close(&self) -> StoreResult<()> {
        self.inner.close()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> StoreResult<usize> {
        self.inner.len()
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl DataStoreProvider for InMemoryDataStore {
    fn get_raw(&self, ctx: &Context, key: &[u8], required: bool) -> StoreResult<Lookup<RawEntry>> {
        self.inner.get(ctx, key, required)
    }

    fn set_raw(&self, ctx: &Context, key: &[u8], value: Vec<u8>, ttl_seconds: u32) -> StoreResult<()> {
        self.inner.set(ctx, key, value, ttl_seconds)
    }

    fn compare_and_set_raw(
        &self,
        ctx: &Context,
        key: &[u8],
        value: Vec<u8>,
        ttl_seconds: u32,
        expected_version: u64,
    ) -> StoreResult<bool> {
        self.inner
            .compare_and_set(ctx, key, value, ttl_seconds, expected_version)
    }

    fn increment_raw(
        &self,
        ctx: &Context,
        key: &[u8],
        initial: i64,
        delta: i64,
        ttl_seconds: u32,
    ) -> StoreResult<i64> {
        self.inner.increment(ctx, key, initial, delta, ttl_seconds)
    }

    fn touch_raw(&self, ctx: &Context, key: &[u8], ttl_seconds: u32) -> StoreResult<()> {
        self.inner.touch(ctx, key, ttl_seconds)
    }

    fn enumerate_raw(
        &self,
        ctx: &Context,
        prefix: &[u8],
        seek: &[u8],
        batch_size: usize,
        reverse: bool,
        only_keys: bool,
        callback: &mut dyn FnMut(RawEntry) -> bool,
    ) -> StoreResult<()> {
        self.inner
            .enumerate(ctx, prefix, seek, batch_size, reverse, only_keys, callback)
    }
}

#[derive(Clone)]
struct StoredValue {
    value: Vec<u8>,
    expires_at: Option<u128>,
    version: u64,
}

impl StoredValue {
    #[inline]
    fn is_expired(&self, now: u128) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at <= now)
    }

    /// Remaining lifetime in whole seconds, rounded up.
    fn remaining_ttl(&self, now: u128) -> Option<u32> {
        self.expires_at.map(|expires_at| {
            let millis = expires_at.saturating_sub(now);
            u32::try_from(millis.div_ceil(1000)).unwrap_or(u32::MAX)
        })
    }

    fn to_entry(&self, key: &[u8], now: u128, only_keys: bool) -> RawEntry {
        RawEntry {
            key: key.to_vec(),
            value: if only_keys { Vec::new() } else { self.value.clone() },
            ttl: self.remaining_ttl(now),
            version: self.version,
        }
    }
}

struct InMemoryDataStoreInner {
    backing_map: SkipMap<Vec<u8>, StoredValue>,
    write_lock: Mutex<()>,
    last_version: AtomicU64,
    closed: AtomicBool,
    config: InMemoryStoreConfig,
}

impl Default for InMemoryDataStoreInner {
    fn default() -> Self {
        InMemoryDataStoreInner::new(InMemoryStoreConfig::default())
    }
}

impl InMemoryDataStoreInner {
    fn new(config: InMemoryStoreConfig) -> InMemoryDataStoreInner {
        InMemoryDataStoreInner {
            backing_map: SkipMap::new(),
            write_lock: Mutex::new(()),
            last_version: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            config,
        }
    }

    fn check_opened(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            log::error!("In-memory store is closed");
            return Err(StoreError::new(
                "In-memory store is closed",
                ErrorKind::StoreAlreadyClosed,
            ));
        }
        Ok(())
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.config.read_only {
            log::error!("Write attempted on a read-only in-memory store");
            return Err(StoreError::new(
                "In-memory store is read-only",
                ErrorKind::ReadOnlyTransaction,
            ));
        }
        Ok(())
    }

    fn validate_key(&self, key: &[u8]) -> StoreResult<()> {
        if key.is_empty() {
            log::error!("Empty key rejected");
            return Err(StoreError::new("Key must not be empty", ErrorKind::EmptyKey));
        }
        if key.len() > self.config.max_key_size {
            log::error!(
                "Key of {} bytes exceeds the limit of {} bytes",
                key.len(),
                self.config.max_key_size
            );
            return Err(StoreError::new(
                &format!(
                    "Key of {} bytes exceeds the limit of {} bytes",
                    key.len(),
                    self.config.max_key_size
                ),
                ErrorKind::InvalidKey,
            ));
        }
        Ok(())
    }

    fn validate_value(&self, value: &[u8]) -> StoreResult<()> {
        if value.len() > self.config.max_value_size {
            log::error!(
                "Value of {} bytes exceeds the limit of {} bytes",
                value.len(),
                self.config.max_value_size
            );
            return Err(StoreError::new(
                &format!(
                    "Value of {} bytes exceeds the limit of {} bytes",
                    value.len(),
                    self.config.max_value_size
                ),
                ErrorKind::InvalidRequest,
            ));
        }
        Ok(())
    }

    /// Common preamble of every write verb.
    fn begin_write(&self, ctx: &Context, key: &[u8]) -> StoreResult<()> {
        self.check_opened()?;
        ctx.check()?;
        self.check_writable()?;
        self.validate_key(key)
    }

    #[inline]
    fn next_version(&self) -> u64 {
        self.last_version.fetch_add(1, Ordering::AcqRel) + 1
    }

    #[inline]
    fn expiry(&self, now: u128, ttl_seconds: u32) -> Option<u128> {
        match ttl_seconds {
            0 => None,
            ttl => Some(now + u128::from(ttl) * 1000),
        }
    }

    /// Live value for `key`. Must be called with the write lock held; expired
    /// entries found on the way are purged.
    fn live_locked(&self, key: &[u8], now: u128) -> Option<StoredValue> {
        let stored = self.backing_map.get(key)?.value().clone();
        if stored.is_expired(now) {
            self.backing_map.remove(key);
            return None;
        }
        Some(stored)
    }

    /// Removes each of `keys` that is still expired once the write lock is
    /// held. A key rewritten since it was seen expired is kept.
    fn purge_expired(&self, keys: &[Vec<u8>]) {
        if keys.is_empty() {
            return;
        }
        let _guard = self.write_lock.lock();
        let now = self.config.now();
        let mut purged = 0;
        for key in keys {
            let expired = self
                .backing_map
                .get(key.as_slice())
                .is_some_and(|entry| entry.value().is_expired(now));
            if expired {
                self.backing_map.remove(key.as_slice());
                purged += 1;
            }
        }
        log::debug!("Purged {} expired entries", purged);
    }

    fn write_locked(&self, key: &[u8], value: Vec<u8>, expires_at: Option<u128>) {
        let stored = StoredValue {
            value,
            expires_at,
            version: self.next_version(),
        };
        self.backing_map.insert(key.to_vec(), stored);
    }

    fn get(&self, ctx: &Context, key: &[u8], required: bool) -> StoreResult<Lookup<RawEntry>> {
        self.check_opened()?;
        ctx.check()?;
        self.validate_key(key)?;

        let now = self.config.now();
        let found = match self.backing_map.get(key).map(|entry| entry.value().clone()) {
            Some(stored) if stored.is_expired(now) => {
                self.purge_expired(&[key.to_vec()]);
                None
            }
            found => found,
        };

        match found {
            Some(stored) => Ok(Lookup::Found(stored.to_entry(key, now, false))),
            None if required => Err(StoreError::new(
                &format!("Key {} not found", String::from_utf8_lossy(key)),
                ErrorKind::NotFound,
            )),
            None => Ok(Lookup::NotFound),
        }
    }

    fn set(&self, ctx: &Context, key: &[u8], value: Vec<u8>, ttl_seconds: u32) -> StoreResult<()> {
        self.begin_write(ctx, key)?;
        self.validate_value(&value)?;

        let _guard = self.write_lock.lock();
        self.check_opened()?;
        let now = self.config.now();
        self.write_locked(key, value, self.expiry(now, ttl_seconds));
        Ok(())
    }

    fn compare_and_set(
        &self,
        ctx: &Context,
        key: &[u8],
        value: Vec<u8>,
        ttl_seconds: u32,
        expected_version: u64,
    ) -> StoreResult<bool> {
        self.begin_write(ctx, key)?;
        self.validate_value(&value)?;

        let _guard = self.write_lock.lock();
        self.check_opened()?;
        let now = self.config.now();
        let current_version = self.live_locked(key, now).map(|stored| stored.version);

        let applies = match current_version {
            None => expected_version == 0,
            Some(version) => version == expected_version,
        };
        if !applies {
            log::debug!(
                "Compare-and-set on {} skipped: expected version {}, found {:?}",
                String::from_utf8_lossy(key),
                expected_version,
                current_version
            );
            return Ok(false);
        }

        self.write_locked(key, value, self.expiry(now, ttl_seconds));
        Ok(true)
    }

    fn increment(
        &self,
        ctx: &Context,
        key: &[u8],
        initial: i64,
        delta: i64,
        ttl_seconds: u32,
    ) -> StoreResult<i64> {
        self.begin_write(ctx, key)?;

        let _guard = self.write_lock.lock();
        self.check_opened()?;
        let now = self.config.now();
        let previous = match self.live_locked(key, now) {
            Some(stored) => decode_counter(&stored.value) as i64,
            None => initial,
        };
        let next = previous.wrapping_add(delta);
        self.write_locked(
            key,
            encode_counter(next as u64).to_vec(),
            self.expiry(now, ttl_seconds),
        );
        Ok(previous)
    }

    fn touch(&self, ctx: &Context, key: &[u8], ttl_seconds: u32) -> StoreResult<()> {
        self.begin_write(ctx, key)?;

        let _guard = self.write_lock.lock();
        self.check_opened()?;
        let now = self.config.now();
        match self.live_locked(key, now) {
            Some(mut stored) => {
                stored.expires_at = self.expiry(now, ttl_seconds);
                self.backing_map.insert(key.to_vec(), stored);
                Ok(())
            }
            None => {
                log::error!("Touch on missing key {}", String::from_utf8_lossy(key));
                Err(StoreError::new(
                    &format!("Key {} not found", String::from_utf8_lossy(key)),
                    ErrorKind::NotFound,
                ))
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn enumerate(
        &self,
        ctx: &Context,
        prefix: &[u8],
        seek: &[u8],
        batch_size: usize,
        reverse: bool,
        only_keys: bool,
        callback: &mut dyn FnMut(RawEntry) -> bool,
    ) -> StoreResult<()> {
        self.check_opened()?;
        if batch_size == 0 {
            log::error!("Enumeration requested with a batch size of 0");
            return Err(StoreError::new(
                "Batch size must be greater than 0",
                ErrorKind::InvalidRequest,
            ));
        }

        let prefix_end = prefix_successor(prefix);
        let mut cursor = match initial_cursor(prefix, prefix_end.as_deref(), seek, reverse) {
            Some(cursor) => cursor,
            None => return Ok(()),
        };

        loop {
            ctx.check()?;
            self.check_opened()?;

            let now = self.config.now();
            let (batch, expired) = self.fetch_batch(
                prefix,
                prefix_end.as_deref(),
                &cursor,
                batch_size,
                reverse,
                only_keys,
                now,
            );
            self.purge_expired(&expired);
            let fetched = batch.len();

            let mut last_key = None;
            for entry in batch {
                last_key = Some(entry.key.clone());
                if !callback(entry) {
                    log::debug!(
                        "Enumeration of prefix {} stopped by callback",
                        String::from_utf8_lossy(prefix)
                    );
                    return Ok(());
                }
            }

            match last_key {
                Some(key) if fetched == batch_size => cursor = Cursor::After(key),
                _ => return Ok(()),
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn fetch_batch(
        &self,
        prefix: &[u8],
        prefix_end: Option<&[u8]>,
        cursor: &Cursor,
        batch_size: usize,
        reverse: bool,
        only_keys: bool,
        now: u128,
    ) -> (Vec<RawEntry>, Vec<Vec<u8>>) {
        let end_bound: Bound<&[u8]> = match prefix_end {
            Some(end) => Excluded(end),
            None => Unbounded,
        };

        let mut expired = Vec::new();
        let to_entry = |entry: crossbeam_skiplist::map::Entry<'_, Vec<u8>, StoredValue>| {
            let stored = entry.value();
            if stored.is_expired(now) {
                expired.push(entry.key().clone());
                None
            } else {
                Some(stored.to_entry(entry.key(), now, only_keys))
            }
        };

        let batch: Vec<RawEntry> = if reverse {
            let upper = match cursor {
                Cursor::At(key) => Included(key.as_slice()),
                Cursor::After(key) => Excluded(key.as_slice()),
                Cursor::Boundary => end_bound,
            };
            self.backing_map
                .range::<[u8], _>((Included(prefix), upper))
                .rev()
                .filter_map(to_entry)
                .take(batch_size)
                .collect()
        } else {
            let lower = match cursor {
                Cursor::At(key) => Included(key.as_slice()),
                Cursor::After(key) => Excluded(key.as_slice()),
                Cursor::Boundary => Included(prefix),
            };
            self.backing_map
                .range::<[u8], _>((lower, end_bound))
                .filter_map(to_entry)
                .take(batch_size)
                .collect()
        };
        (batch, expired)
    }

    fn close(&self) -> StoreResult<()> {
        let _guard = self.write_lock.lock();
        self.closed.store(true, Ordering::Release);
        self.backing_map.clear();
        log::debug!("In-memory store closed");
        Ok(())
    }

    fn len(&self) -> StoreResult<usize> {
        self.check_opened()?;
        let now = self.config.now();
        let mut live = 0;
        let mut expired = Vec::new();
        for entry in self.backing_map.iter() {
            if entry.value().is_expired(now) {
                expired.push(entry.key().clone());
            } else {
                live += 1;
            }
        }
        self.purge_expired(&expired);
        Ok(live)
    }
}

/// Position a batch starts from. `After` excludes the key itself, and
/// `Boundary` is the edge of the prefix range the scan direction starts at.
enum Cursor {
    At(Vec<u8>),
    After(Vec<u8>),
    Boundary,
}

/// Smallest byte string greater than every key starting with `prefix`, or
/// `None` when no such bound exists (empty or all-`0xFF` prefix).
fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

/// Where the first batch starts, or `None` when the seek position leaves
/// nothing to visit in the prefix range.
fn initial_cursor(
    prefix: &[u8],
    prefix_end: Option<&[u8]>,
    seek: &[u8],
    reverse: bool,
) -> Option<Cursor> {
    let past_end = matches!(prefix_end, Some(end) if seek >= end);

    if reverse {
        // seek == prefix is the unset default: walk the whole range from the top
        if seek == prefix || past_end {
            Some(Cursor::Boundary)
        } else if seek < prefix {
            None
        } else {
            Some(Cursor::At(seek.to_vec()))
        }
    } else if seek <= prefix {
        Some(Cursor::Boundary)
    } else if past_end {
        None
    } else {
        Some(Cursor::At(seek.to_vec()))
    }
}
