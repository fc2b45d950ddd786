//! Explicitly invalidated values
//!
//! Entities often carry values that are expensive to look up (a database
//! id, a locked flag read from the remote application). [`Cached`] computes
//! such a value on first use and keeps it until [`Cached::invalidate`] is
//! called. Nothing is ever invalidated implicitly.

use std::fmt;
use std::sync::{PoisonError, RwLock};

/// A value holder with `get_or_compute` and `invalidate`.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use wayfinder::Cached;
///
/// let lookups = Cell::new(0);
/// let is_locked = || {
///     lookups.set(lookups.get() + 1);
///     true
/// };
///
/// let locked: Cached<bool> = Cached::new();
/// assert!(locked.get_or_compute(is_locked));
/// assert!(locked.get_or_compute(is_locked));
/// assert_eq!(lookups.get(), 1);
///
/// // The UI just locked the domain; read it back from the source
/// locked.invalidate();
/// assert!(locked.get_or_compute(is_locked));
/// assert_eq!(lookups.get(), 2);
/// ```
pub struct Cached<T> {
    slot: RwLock<Option<T>>,
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Cached<T> {
    /// Create an empty holder
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Create a holder already containing `value`
    #[must_use]
    pub const fn with_value(value: T) -> Self {
        Self {
            slot: RwLock::new(Some(value)),
        }
    }

    /// Whether a value is currently held
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Drop the held value; the next read recomputes it
    pub fn invalidate(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Replace the held value
    pub fn set(&self, value: T) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    /// Remove and return the held value
    pub fn take(&self) -> Option<T> {
        self.slot
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl<T: Clone> Cached<T> {
    /// Held value, if any
    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Held value, computing and storing it first if needed
    pub fn get_or_compute<F>(&self, compute: F) -> T
    where
        F: FnOnce() -> T,
    {
        if let Some(value) = self.get() {
            return value;
        }
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        // Another writer may have filled the slot between the two locks
        slot.get_or_insert_with(compute).clone()
    }

    /// Like [`Cached::get_or_compute`], but a failed computation stores nothing
    pub fn try_get_or_compute<F, E>(&self, compute: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.get() {
            return Ok(value);
        }
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = slot.as_ref() {
            return Ok(value.clone());
        }
        let value = compute()?;
        *slot = Some(value.clone());
        Ok(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Cached<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Cached").field("value", &*slot).finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_computes_once() {
        let calls = Cell::new(0);
        let cached = Cached::new();
        let compute = || {
            calls.set(calls.get() + 1);
            42
        };
        assert_eq!(cached.get_or_compute(compute), 42);
        assert_eq!(cached.get_or_compute(compute), 42);
        assert_eq!(calls.get(), 1);
        assert!(cached.is_cached());
    }

    #[test]
    fn test_invalidate_forces_recompute() {
        let cached = Cached::with_value(false);
        assert_eq!(cached.get(), Some(false));
        cached.invalidate();
        assert!(!cached.is_cached());
        assert!(cached.get_or_compute(|| true));
    }

    #[test]
    fn test_try_get_or_compute_error_stores_nothing() {
        let cached: Cached<u32> = Cached::new();
        let err: Result<u32, &str> = cached.try_get_or_compute(|| Err("db down"));
        assert_eq!(err, Err("db down"));
        assert!(!cached.is_cached());

        let ok: Result<u32, &str> = cached.try_get_or_compute(|| Ok(7));
        assert_eq!(ok, Ok(7));
        assert_eq!(cached.get(), Some(7));
    }

    #[test]
    fn test_set_and_take() {
        let cached = Cached::new();
        cached.set("a".to_string());
        assert_eq!(cached.take(), Some("a".to_string()));
        assert_eq!(cached.take(), None);
    }

    #[test]
    fn test_debug() {
        let cached = Cached::with_value(3);
        assert_eq!(format!("{cached:?}"), "Cached { value: Some(3) }");
    }
}
