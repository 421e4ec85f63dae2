use crate::codec::{format_key, Payload};
use crate::context::Context;
use crate::errors::StoreResult;
use crate::store::DataStore;
use prost::Message;
use std::fmt::Display;

/// Unconditionally writes one key.
///
/// The value encoding is chosen by the terminal call: [`binary`](Self::binary),
/// [`string`](Self::string), [`counter`](Self::counter) or
/// [`proto`](Self::proto). A TTL of 0 (the default) never expires.
pub struct SetOperation {
    store: DataStore,
    ctx: Context,
    key: Vec<u8>,
    ttl_seconds: u32,
}

impl SetOperation {
    pub fn new(store: DataStore, ctx: Context) -> SetOperation {
        SetOperation {
            store,
            ctx,
            key: Vec::new(),
            ttl_seconds: 0,
        }
    }

    /// Selects the key from anything displayable.
    pub fn by_key<K: Display>(mut self, key: K) -> SetOperation {
        self.key = format_key(key);
        self
    }

    /// Selects the key as raw bytes, used verbatim.
    pub fn by_raw_key<K: Into<Vec<u8>>>(mut self, key: K) -> SetOperation {
        self.key = key.into();
        self
    }

    /// Seconds until the entry expires.
    ///
    /// # Arguments
    /// * `ttl_seconds` - Lifetime of the written entry; 0 never expires
    pub fn with_ttl(mut self, ttl_seconds: u32) -> SetOperation {
        self.ttl_seconds = ttl_seconds;
        self
    }

    /// Stores `value` unchanged.
    pub fn binary<V: Into<Vec<u8>>>(self, value: V) -> StoreResult<()> {
        self.payload(Payload::Binary(value.into()))
    }

    /// Stores the UTF-8 bytes of `value`.
    pub fn string<V: Into<String>>(self, value: V) -> StoreResult<()> {
        self.payload(Payload::Text(value.into()))
    }

    /// Stores `value` as 8 big-endian bytes.
    pub fn counter(self, value: u64) -> StoreResult<()> {
        self.payload(Payload::Counter(value))
    }

    /// Encodes `msg` first; an encoding failure never reaches the store.
    pub fn proto<M: Message>(self, msg: &M) -> StoreResult<()> {
        let payload = Payload::message(msg)?;
        self.payload(payload)
    }

    /// Writes an already chosen [`Payload`].
    pub fn payload(self, payload: Payload) -> StoreResult<()> {
        self.store
            .set_raw(&self.ctx, &self.key, payload.into_bytes(), self.ttl_seconds)
    }
}
