use crate::codec::{decode_counter, decode_message, format_key};
use crate::context::Context;
use crate::entry::{CounterEntry, Lookup, ProtoEntry, RawEntry};
use crate::errors::{ErrorKind, StoreError, StoreResult};
use crate::store::DataStore;
use prost::Message;
use std::fmt::Display;

/// Reads one key and decodes its value.
///
/// By default a missing key is not an error: every terminal method returns
/// its "no value" form (`None`, `""`, `0`, `Lookup::NotFound`). Call
/// [`required`](GetOperation::required) to turn a miss into an
/// [`ErrorKind::NotFound`] error instead.
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
///
/// store.set(&ctx).by_key("visits").counter(3).unwrap();
/// assert_eq!(store.get(&ctx).by_key("visits").to_counter().unwrap(), 3);
/// assert_eq!(store.get(&ctx).by_key("missing").to_counter().unwrap(), 0);
/// assert!(store.get(&ctx).by_key("missing").required().to_counter().is_err());
/// ```
pub struct GetOperation {
    store: DataStore,
    ctx: Context,
    key: Vec<u8>,
    required: bool,
}

impl GetOperation {
    pub fn new(store: DataStore, ctx: Context) -> GetOperation {
        GetOperation {
            store,
            ctx,
            key: Vec::new(),
            required: false,
        }
    }

    /// Fails with `NotFound` instead of returning an empty result on a miss.
    pub fn required(mut self) -> GetOperation {
        self.required = true;
        self
    }

    /// Selects the key from anything displayable, typically
    /// `format_args!("user:{}", id)`.
    pub fn by_key<K: Display>(mut self, key: K) -> GetOperation {
        self.key = format_key(key);
        self
    }

    /// Selects the key as raw bytes, used verbatim.
    pub fn by_raw_key<K: Into<Vec<u8>>>(mut self, key: K) -> GetOperation {
        self.key = key.into();
        self
    }

    /// The key this operation will read.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    fn fetch(&self) -> StoreResult<Lookup<RawEntry>> {
        let lookup = self
            .store
            .get_raw(&self.ctx, &self.key, self.required)?;
        if self.required && lookup.is_not_found() {
            log::error!("Required key {} not found", String::from_utf8_lossy(&self.key));
            return Err(StoreError::new(
                &format!("Key {} not found", String::from_utf8_lossy(&self.key)),
                ErrorKind::NotFound,
            ));
        }
        Ok(lookup)
    }

    /// The stored bytes, unchanged. `None` on a miss.
    pub fn to_binary(self) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.fetch()?.map(|entry| entry.value).into_option())
    }

    /// The stored bytes as UTF-8 text. An empty string on a miss.
    pub fn to_string(self) -> StoreResult<String> {
        match self.fetch()? {
            Lookup::Found(entry) => Ok(String::from_utf8(entry.value)?),
            Lookup::NotFound => Ok(String::new()),
        }
    }

    /// The first eight bytes as a big-endian counter. 0 on a miss or when the
    /// value is shorter than eight bytes.
    pub fn to_counter(self) -> StoreResult<u64> {
        Ok(self
            .fetch()?
            .map(|entry| decode_counter(&entry.value))
            .unwrap_or_default())
    }

    /// The value decoded as a protobuf message. `None` on a miss.
    pub fn to_proto<M: Message + Default>(self) -> StoreResult<Option<M>> {
        let lookup = self
            .fetch()?
            .try_map(|entry| decode_message::<M>(&entry.value))?;
        Ok(lookup.into_option())
    }

    /// Merges the stored message into `container`, leaving it untouched on a
    /// miss. Returns whether the key was found.
    pub fn to_proto_into<M: Message>(self, container: &mut M) -> StoreResult<bool> {
        match self.fetch()? {
            Lookup::Found(entry) => {
                container.merge(entry.value.as_slice())?;
                Ok(true)
            }
            Lookup::NotFound => Ok(false),
        }
    }

    /// The value together with its remaining TTL and version.
    pub fn to_entry(self) -> StoreResult<Lookup<RawEntry>> {
        self.fetch()
    }

    /// Like [`to_entry`](Self::to_entry), with the value decoded as `M`.
    pub fn to_proto_entry<M: Message + Default>(self) -> StoreResult<Lookup<ProtoEntry<M>>> {
        self.fetch()?.try_map(|entry| {
            Ok(ProtoEntry {
                value: decode_message::<M>(&entry.value)?,
                key: entry.key,
                ttl: entry.ttl,
                version: entry.version,
            })
        })
    }

    /// Like [`to_entry`](Self::to_entry), with the value decoded as a counter.
    pub fn to_counter_entry(self) -> StoreResult<Lookup<CounterEntry>> {
        Ok(self.fetch()?.map(|entry| CounterEntry {
            value: decode_counter(&entry.value),
            key: entry.key,
            ttl: entry.ttl,
            version: entry.version,
        }))
    }
}
