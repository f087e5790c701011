//! Caller-side mutual exclusion
//!
//! Containers are unsynchronized. Callers sharing one between threads wrap it
//! in [`Shared`], which serializes every access behind a mutex.

use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Cloneable handle to a container guarded by a mutex
pub struct Shared<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Shared<T> {
    /// Wrap a value
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    /// Acquire the lock; released when the guard drops
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }

    /// Run a closure while holding the lock
    #[inline]
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    /// Unwrap the value if this is the last handle
    pub fn try_unwrap(self) -> std::result::Result<T, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
