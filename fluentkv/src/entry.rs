/// An entry exactly as the DataStore returned it.
///
/// `ttl` is the number of whole seconds left before the entry expires, or
/// `None` when it never expires. `version` is the store's optimistic
/// concurrency token; pass it to
/// [`CompareAndSetOperation::with_version`](crate::operation::CompareAndSetOperation::with_version).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawEntry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub ttl: Option<u32>,
    pub version: u64,
}

/// An entry whose value has been decoded into a protobuf message.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProtoEntry<M> {
    pub key: Vec<u8>,
    pub value: M,
    pub ttl: Option<u32>,
    pub version: u64,
}

/// An entry whose value has been decoded as a big-endian `u64` counter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CounterEntry {
    pub key: Vec<u8>,
    pub value: u64,
    pub ttl: Option<u32>,
    pub version: u64,
}

/// Outcome of a read that may legitimately miss.
///
/// Optional reads resolve to `NotFound` instead of failing; required reads
/// turn a miss into an [`ErrorKind::NotFound`](crate::errors::ErrorKind::NotFound)
/// error before a `Lookup` is ever produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Lookup::NotFound)
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Lookup<U> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::NotFound => Lookup::NotFound,
        }
    }

    /// Like [`Lookup::map`] for fallible conversions.
    pub fn try_map<U, E, F: FnOnce(T) -> Result<U, E>>(self, f: F) -> Result<Lookup<U>, E> {
        match self {
            Lookup::Found(value) => Ok(Lookup::Found(f(value)?)),
            Lookup::NotFound => Ok(Lookup::NotFound),
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }

    pub fn as_ref(&self) -> Lookup<&T> {
        match self {
            Lookup::Found(value) => Lookup::Found(value),
            Lookup::NotFound => Lookup::NotFound,
        }
    }

    pub fn found_or_else<E, F: FnOnce() -> E>(self, err: F) -> Result<T, E> {
        match self {
            Lookup::Found(value) => Ok(value),
            Lookup::NotFound => Err(err()),
        }
    }
}

impl<T: Default> Lookup<T> {
    /// The found value, or `T::default()` on a miss.
    pub fn unwrap_or_default(self) -> T {
        match self {
            Lookup::Found(value) => value,
            Lookup::NotFound => T::default(),
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Lookup::Found(value),
            None => Lookup::NotFound,
        }
    }
}

impl<T> From<Lookup<T>> for Option<T> {
    fn from(value: Lookup<T>) -> Self {
        value.into_option()
    }
}
