//! Payload encodings shared by the operation builders.
//!
//! Values cross the DataStore boundary as plain bytes. The builders pick one
//! of a closed set of strategies at their terminal call:
//!
//! - **binary**: bytes are passed through untouched
//! - **text**: the UTF-8 bytes of a string
//! - **counter**: a fixed 8-byte big-endian `u64`
//! - **message**: the protobuf wire encoding of a `prost::Message`

use crate::errors::StoreResult;
use prost::Message;
use std::fmt::Display;

/// Width of an encoded counter.
pub const COUNTER_SIZE: usize = 8;

/// A value ready to be written, tagged with how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Binary(Vec<u8>),
    Text(String),
    Counter(u64),
    /// Already-encoded protobuf bytes.
    Message(Vec<u8>),
}

impl Payload {
    /// Encodes `msg` up front so a marshalling failure surfaces before the
    /// store is contacted.
    pub fn message<M: Message>(msg: &M) -> StoreResult<Payload> {
        Ok(Payload::Message(encode_message(msg)?))
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Payload::Binary(bytes) | Payload::Message(bytes) => bytes,
            Payload::Text(text) => text.into_bytes(),
            Payload::Counter(value) => encode_counter(value).to_vec(),
        }
    }
}

#[inline]
pub fn encode_counter(value: u64) -> [u8; COUNTER_SIZE] {
    value.to_be_bytes()
}

/// Reads the first eight bytes as a big-endian `u64`. Shorter input decodes
/// to 0 and trailing bytes are ignored.
#[inline]
pub fn decode_counter(bytes: &[u8]) -> u64 {
    match bytes.get(..COUNTER_SIZE) {
        Some(head) => {
            let mut buf = [0u8; COUNTER_SIZE];
            buf.copy_from_slice(head);
            u64::from_be_bytes(buf)
        }
        None => 0,
    }
}

pub fn encode_message<M: Message>(msg: &M) -> StoreResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(msg.encoded_len());
    msg.encode(&mut buf)?;
    Ok(buf)
}

pub fn decode_message<M: Message + Default>(bytes: &[u8]) -> StoreResult<M> {
    Ok(M::decode(bytes)?)
}

/// Renders a formatted key to bytes.
///
/// `format_key(format_args!("user:{}", 42))` yields exactly `b"user:42"`, the
/// same bytes a caller would get from `format!("user:{}", 42).into_bytes()`.
pub fn format_key<K: Display>(key: K) -> Vec<u8> {
    key.to_string().into_bytes()
}
