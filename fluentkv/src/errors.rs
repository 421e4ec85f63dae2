use backtrace::Backtrace;
use parking_lot::RwLock;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for fluentkv operations.
///
/// The kinds are grouped the way callers usually branch on them: a missing
/// key, malformed input, payload encoding, cancellation, transaction limits
/// reported by the store, and opaque store faults.
///
/// A compare-and-set version mismatch is deliberately absent. It is reported
/// as `Ok(false)` by [`CompareAndSetOperation`](crate::operation::CompareAndSetOperation).
///
/// # Examples
///
/// ```rust
/// use fluentkv::errors::{ErrorKind, StoreError, StoreResult};
///
/// fn lookup() -> StoreResult<()> {
///     Err(StoreError::new("key user:1 not found", ErrorKind::NotFound))
/// }
///
/// assert!(lookup().unwrap_err().is_not_found());
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Lookup
    /// A required read hit an absent or expired key
    NotFound,

    // Input validation
    /// The request is malformed (bad batch size, oversized value, ...)
    InvalidRequest,
    /// The key is malformed or too large
    InvalidKey,
    /// An empty key was supplied
    EmptyKey,

    // Payload
    /// Marshalling or unmarshalling a payload failed
    EncodingError,

    // Cancellation
    /// The operation's context was cancelled
    Cancelled,
    /// The operation's context deadline passed
    DeadlineExceeded,

    // Transactions, as reported by the store
    /// The store detected a conflicting concurrent transaction
    ConcurrentTransaction,
    /// A write was attempted on a read-only store or transaction
    ReadOnlyTransaction,
    /// A discarded transaction was reused
    DiscardedTransaction,
    /// Too many writes for a single transaction
    TransactionTooBig,

    // Store faults
    /// The store has already been closed
    StoreAlreadyClosed,
    /// Generic IO error
    IOError,
    /// Error surfaced opaquely from a storage backend
    BackendError,
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::InvalidRequest => write!(f, "Invalid request"),
            ErrorKind::InvalidKey => write!(f, "Invalid key"),
            ErrorKind::EmptyKey => write!(f, "Empty key"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::Cancelled => write!(f, "Cancelled"),
            ErrorKind::DeadlineExceeded => write!(f, "Deadline exceeded"),
            ErrorKind::ConcurrentTransaction => write!(f, "Concurrent transaction"),
            ErrorKind::ReadOnlyTransaction => write!(f, "Read-only transaction"),
            ErrorKind::DiscardedTransaction => write!(f, "Discarded transaction"),
            ErrorKind::TransactionTooBig => write!(f, "Transaction too big"),
            ErrorKind::StoreAlreadyClosed => write!(f, "Store already closed"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::BackendError => write!(f, "Backend error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Error type returned by every fallible fluentkv call.
///
/// `StoreError` carries a message, an [`ErrorKind`], an optional cause and the
/// backtrace captured where it was created.
///
/// ```rust
/// use fluentkv::errors::{ErrorKind, StoreError};
///
/// let cause = StoreError::new("disk unplugged", ErrorKind::IOError);
/// let err = StoreError::new_with_cause("set failed", ErrorKind::BackendError, cause);
/// assert_eq!(err.cause().map(|c| c.kind().clone()), Some(ErrorKind::IOError));
/// ```
#[derive(Clone)]
pub struct StoreError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<StoreError>>,
    backtrace: Arc<RwLock<Backtrace>>,
}

impl StoreError {
    /// Creates a new `StoreError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        StoreError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(RwLock::new(Backtrace::new())),
        }
    }

    /// Creates a new `StoreError` wrapping the error that caused it.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: StoreError) -> Self {
        StoreError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(RwLock::new(Backtrace::new())),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&StoreError> {
        self.cause.as_deref()
    }

    pub fn is_not_found(&self) -> bool {
        self.error_kind == ErrorKind::NotFound
    }

    /// True when the operation stopped because its context was cancelled or
    /// its deadline passed.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self.error_kind,
            ErrorKind::Cancelled | ErrorKind::DeadlineExceeded
        )
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// Shorthand for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<prost::DecodeError> for StoreError {
    fn from(err: prost::DecodeError) -> Self {
        StoreError::new(
            &format!("Failed to decode message: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<prost::EncodeError> for StoreError {
    fn from(err: prost::EncodeError) -> Self {
        StoreError::new(
            &format!("Failed to encode message: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<std::string::FromUtf8Error> for StoreError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        StoreError::new(
            &format!("UTF-8 encoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::new(&format!("IO error: {}", err), ErrorKind::IOError)
    }
}

impl From<String> for StoreError {
    fn from(msg: String) -> Self {
        StoreError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for StoreError {
    fn from(msg: &str) -> Self {
        StoreError::new(msg, ErrorKind::InternalError)
    }
}
