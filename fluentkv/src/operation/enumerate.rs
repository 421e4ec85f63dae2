use crate::codec::{decode_counter, decode_message, format_key};
use crate::context::Context;
use crate::entry::{CounterEntry, ProtoEntry, RawEntry};
use crate::errors::{StoreError, StoreResult};
use crate::store::DataStore;
use prost::Message;
use std::fmt::Display;

/// Entries fetched per round trip when no batch size is configured.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Streams every entry under a key prefix, in key order.
///
/// The scan starts at the seek position, which defaults to the prefix itself.
/// Callbacks return `true` to continue and `false` to stop early; stopping is
/// not an error.
///
/// # Examples
///
/// ```rust
/// use fluentkv::context::Context;
/// use fluentkv::store::memory::InMemoryDataStore;
/// use fluentkv::store::DataStore;
///
/// let store = DataStore::new(InMemoryDataStore::default());
/// let ctx = Context::background();
/// for id in 1..=3 {
///     store.set(&ctx).by_key(format_args!("user:{}", id)).counter(id).unwrap();
/// }
///
/// let mut total = 0;
/// store
///     .enumerate(&ctx)
///     .by_prefix("user:")
///     .for_each_counter(|entry| {
///         total += entry.value;
///         true
///     })
///     .unwrap();
/// assert_eq!(total, 6);
/// ```
pub struct EnumerateOperation {
    store: DataStore,
    ctx: Context,
    prefix: Vec<u8>,
    seek: Option<Vec<u8>>,
    batch_size: usize,
    only_keys: bool,
    reverse: bool,
}

impl EnumerateOperation {
    pub fn new(store: DataStore, ctx: Context) -> EnumerateOperation {
        EnumerateOperation {
            store,
            ctx,
            prefix: Vec::new(),
            seek: None,
            batch_size: DEFAULT_BATCH_SIZE,
            only_keys: false,
            reverse: false,
        }
    }

    /// Restricts the scan to keys starting with `prefix`. An empty prefix
    /// visits every key.
    pub fn by_prefix<P: Display>(mut self, prefix: P) -> EnumerateOperation {
        self.prefix = format_key(prefix);
        self
    }

    /// Raw-byte form of [`by_prefix`](Self::by_prefix).
    pub fn by_raw_prefix<P: Into<Vec<u8>>>(mut self, prefix: P) -> EnumerateOperation {
        self.prefix = prefix.into();
        self
    }

    /// Starting position inside the prefix range.
    ///
    /// Forward scans begin at the first key `>= seek`; reverse scans at the
    /// last key `<= seek`, or at the top of the range when `seek` lies past it.
    pub fn seek<S: Display>(mut self, seek: S) -> EnumerateOperation {
        self.seek = Some(format_key(seek));
        self
    }

    /// Raw-byte form of [`seek`](Self::seek).
    pub fn seek_raw<S: Into<Vec<u8>>>(mut self, seek: S) -> EnumerateOperation {
        self.seek = Some(seek.into());
        self
    }

    /// A batch size of 0 falls back to [`DEFAULT_BATCH_SIZE`].
    pub fn with_batch_size(mut self, batch_size: usize) -> EnumerateOperation {
        self.batch_size = if batch_size == 0 {
            DEFAULT_BATCH_SIZE
        } else {
            batch_size
        };
        self
    }

    /// Visits keys only; entries arrive with an empty value.
    pub fn only_keys(mut self) -> EnumerateOperation {
        self.only_keys = true;
        self
    }

    /// Visits keys in descending order.
    pub fn reverse(mut self) -> EnumerateOperation {
        self.reverse = true;
        self
    }

    /// Runs the scan with the raw entries.
    ///
    /// # Arguments
    /// * `callback` - Called once per entry in order; return `false` to stop
    pub fn for_each<F>(self, mut callback: F) -> StoreResult<()>
    where
        F: FnMut(RawEntry) -> bool,
    {
        self.scan(&mut callback)
    }

    /// Decodes each value as `M`. The first value that fails to decode stops
    /// the scan and its error is returned, unless the store itself failed.
    pub fn for_each_proto<M, F>(self, mut callback: F) -> StoreResult<()>
    where
        M: Message + Default,
        F: FnMut(ProtoEntry<M>) -> bool,
    {
        let mut decode_error: Option<StoreError> = None;
        self.scan(&mut |entry: RawEntry| match decode_message::<M>(&entry.value) {
            Ok(value) => callback(ProtoEntry {
                key: entry.key,
                value,
                ttl: entry.ttl,
                version: entry.version,
            }),
            Err(err) => {
                log::warn!(
                    "Failed to decode value of {}: {}",
                    String::from_utf8_lossy(&entry.key),
                    err
                );
                decode_error = Some(err);
                false
            }
        })?;

        match decode_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Decodes each value as a counter; values shorter than 8 bytes read as 0.
    pub fn for_each_counter<F>(self, mut callback: F) -> StoreResult<()>
    where
        F: FnMut(CounterEntry) -> bool,
    {
        self.scan(&mut |entry: RawEntry| {
            callback(CounterEntry {
                value: decode_counter(&entry.value),
                key: entry.key,
                ttl: entry.ttl,
                version: entry.version,
            })
        })
    }

    /// Collects the keys of every entry in range.
    pub fn keys(self) -> StoreResult<Vec<Vec<u8>>> {
        let mut keys = Vec::new();
        self.only_keys().for_each(|entry| {
            keys.push(entry.key);
            true
        })?;
        Ok(keys)
    }

    fn scan(self, callback: &mut dyn FnMut(RawEntry) -> bool) -> StoreResult<()> {
        let seek = self.seek.unwrap_or_else(|| self.prefix.clone());
        self.store.enumerate_raw(
            &self.ctx,
            &self.prefix,
            &seek,
            self.batch_size,
            self.reverse,
            self.only_keys,
            callback,
        )
    }
}
