use crate::errors::{ErrorKind, StoreError, StoreResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cancellation and deadline scope threaded through every DataStore call.
///
/// A `Context` is cheap to clone; clones share the same cancellation flag.
/// Derived contexts (`with_cancel`, `with_timeout`, `with_deadline`) are done
/// as soon as they or any of their ancestors are done, so cancelling a parent
/// stops every operation running under one of its children.
///
/// # Examples
///
/// ```rust
/// use fluentkv::context::Context;
/// use std::time::Duration;
///
/// let root = Context::background();
/// let ctx = root.with_timeout(Duration::from_secs(5));
/// assert!(ctx.check().is_ok());
///
/// root.cancel();
/// assert!(ctx.check().unwrap_err().is_cancelled());
/// ```
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    cancelled: AtomicBool,
    deadline: Option<Instant>,
    parent: Option<Context>,
}

impl Context {
    /// A root context that is never done unless cancelled explicitly.
    pub fn background() -> Context {
        Context {
            inner: Arc::new(ContextInner {
                cancelled: AtomicBool::new(false),
                deadline: None,
                parent: None,
            }),
        }
    }

    /// Derives a child that can be cancelled independently of `self`.
    pub fn with_cancel(&self) -> Context {
        self.child(None)
    }

    /// Derives a child whose deadline is `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Context {
        self.child(Instant::now().checked_add(timeout))
    }

    /// Derives a child that expires at `deadline`.
    pub fn with_deadline(&self, deadline: Instant) -> Context {
        self.child(Some(deadline))
    }

    fn child(&self, deadline: Option<Instant>) -> Context {
        Context {
            inner: Arc::new(ContextInner {
                cancelled: AtomicBool::new(false),
                deadline,
                parent: Some(self.clone()),
            }),
        }
    }

    /// Cancels this context and, through it, every context derived from it.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    /// The earliest deadline along the ancestor chain.
    pub fn deadline(&self) -> Option<Instant> {
        let parent_deadline = self.inner.parent.as_ref().and_then(|p| p.deadline());
        match (self.inner.deadline, parent_deadline) {
            (Some(own), Some(parent)) => Some(own.min(parent)),
            (own, parent) => own.or(parent),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        if self.inner.cancelled.load(Ordering::Acquire) {
            return true;
        }
        match &self.inner.parent {
            Some(parent) => parent.is_cancelled(),
            None => false,
        }
    }

    pub fn is_done(&self) -> bool {
        self.check().is_err()
    }

    /// Returns `Err(Cancelled)` or `Err(DeadlineExceeded)` once the context
    /// is done, `Ok(())` otherwise.
    pub fn check(&self) -> StoreResult<()> {
        if self.is_cancelled() {
            return Err(StoreError::new("context cancelled", ErrorKind::Cancelled));
        }
        if let Some(deadline) = self.deadline() {
            if Instant::now() >= deadline {
                return Err(StoreError::new(
                    "context deadline exceeded",
                    ErrorKind::DeadlineExceeded,
                ));
            }
        }
        Ok(())
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::background()
    }
}
