//! Deterministic release of resources.
//!
//! [`Dispose`] is implemented by types that own something needing explicit
//! cleanup. [`Disposer<T>`] wraps such a value and guarantees the cleanup runs
//! exactly once: either through an explicit [`Disposer::dispose`] call or when
//! the guard is dropped. After disposal the value is gone and access returns
//! [`CoreError::Disposed`].
//!
//! ```
//! use framework_core::dispose::{Dispose, Disposer};
//!
//! struct Connection { open: bool }
//!
//! impl Dispose for Connection {
//!     fn dispose(&mut self) {
//!         self.open = false;
//!     }
//! }
//!
//! let mut conn = Disposer::new(Connection { open: true });
//! assert!(conn.get().unwrap().open);
//! conn.dispose();
//! conn.dispose(); // no-op
//! assert!(conn.is_disposed());
//! assert!(conn.get().is_err());
//! ```

use std::fmt;

use crate::error::{CoreError, Result};
use crate::logging::targets;

/// A resource with explicit cleanup.
pub trait Dispose {
    /// Release the resource. Called at most once by [`Disposer`].
    fn dispose(&mut self);
}

/// An RAII guard that disposes its value once.
pub struct Disposer<T: Dispose> {
    inner: Option<T>,
}

impl<T: Dispose> Disposer<T> {
    /// Wrap a value.
    pub fn new(value: T) -> Self {
        Self { inner: Some(value) }
    }

    /// Whether the value has already been released.
    pub fn is_disposed(&self) -> bool {
        self.inner.is_none()
    }

    /// Borrow the value.
    pub fn get(&self) -> Result<&T> {
        self.inner.as_ref().ok_or(CoreError::Disposed)
    }

    /// Mutably borrow the value.
    pub fn get_mut(&mut self) -> Result<&mut T> {
        self.inner.as_mut().ok_or(CoreError::Disposed)
    }

    /// Release the value now. Subsequent calls do nothing.
    pub fn dispose(&mut self) {
        if let Some(mut value) = self.inner.take() {
            tracing::trace!(target: targets::DISPOSE, type_name = std::any::type_name::<T>(), "disposing");
            value.dispose();
        }
    }

    /// Take the value out without disposing it.
    pub fn into_inner(mut self) -> Result<T> {
        self.inner.take().ok_or(CoreError::Disposed)
    }
}

impl<T: Dispose> Drop for Disposer<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<T: Dispose + fmt::Debug> fmt::Debug for Disposer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposer").field("inner", &self.inner).finish()
    }
}
