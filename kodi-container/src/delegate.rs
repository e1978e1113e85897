//! Lazy cache cells over value-producing closures.
//!
//! [`ImmutableDelegate`] evaluates its closure on first access and keeps
//! the result forever, even if the registry entry it came from changes.
//! [`MutableDelegate`] caches the same way and can be overwritten.
//!
//! ```rust
//! use std::sync::Arc;
//! use kodi_container::prelude::*;
//!
//! let kodi = Arc::new(Kodi::new());
//! kodi.bind_tag("greeting").unwrap().constant(String::from("hi")).unwrap();
//!
//! let greeting = kodi.immutable_instance::<String>(Some("greeting"));
//! assert!(!greeting.is_set());
//! assert_eq!(greeting.get().unwrap().as_str(), "hi");
//! assert!(greeting.is_set());
//! ```

use std::fmt;

use parking_lot::Mutex;

use crate::error::{KodiError, Result};

/// A cache slot: either holding a value or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Optional<T> {
    Some(T),
    None,
}

impl<T> Optional<T> {
    /// Borrows the value.
    ///
    /// # Errors
    /// [`KodiError::EmptyOptional`] on `None`.
    pub fn get(&self) -> Result<&T> {
        match self {
            Optional::Some(value) => Ok(value),
            Optional::None => Err(KodiError::EmptyOptional),
        }
    }

    pub fn is_some(&self) -> bool {
        matches!(self, Optional::Some(_))
    }
}

impl<T> Default for Optional<T> {
    fn default() -> Self {
        Optional::None
    }
}

type Init<T> = Box<dyn Fn() -> Result<T> + Send + Sync>;

/// Evaluate-once cell.
pub struct ImmutableDelegate<T> {
    init: Init<T>,
    value: Mutex<Optional<T>>,
}

impl<T: Clone> ImmutableDelegate<T> {
    pub fn new(init: impl Fn() -> Result<T> + Send + Sync + 'static) -> Self {
        Self {
            init: Box::new(init),
            value: Mutex::new(Optional::None),
        }
    }

    /// Returns the cached value, computing it on first access.
    pub fn get(&self) -> Result<T> {
        self.force_compute()
    }

    /// Computes the value if the cell is unset, then returns it.
    ///
    /// The lock is held while the closure runs, so concurrent first
    /// readers wait for one evaluation. A failed evaluation leaves the
    /// cell unset.
    pub fn force_compute(&self) -> Result<T> {
        let mut slot = self.value.lock();
        if !slot.is_some() {
            *slot = Optional::Some((self.init)()?);
        }
        slot.get().cloned()
    }

    pub fn is_set(&self) -> bool {
        self.value.lock().is_some()
    }
}

impl<T: fmt::Debug> fmt::Debug for ImmutableDelegate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImmutableDelegate")
            .field("value", &*self.value.lock())
            .finish()
    }
}

/// Evaluate-once cell that can be overwritten.
pub struct MutableDelegate<T> {
    inner: ImmutableDelegate<T>,
}

impl<T: Clone> MutableDelegate<T> {
    pub fn new(init: impl Fn() -> Result<T> + Send + Sync + 'static) -> Self {
        Self {
            inner: ImmutableDelegate::new(init),
        }
    }

    pub fn get(&self) -> Result<T> {
        self.inner.force_compute()
    }

    pub fn force_compute(&self) -> Result<T> {
        self.inner.force_compute()
    }

    pub fn is_set(&self) -> bool {
        self.inner.is_set()
    }

    /// Replaces the cached value without running the closure.
    pub fn overwrite(&self, value: T) {
        *self.inner.value.lock() = Optional::Some(value);
    }
}

impl<T: fmt::Debug> fmt::Debug for MutableDelegate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableDelegate")
            .field("value", &*self.inner.value.lock())
            .finish()
    }
}
