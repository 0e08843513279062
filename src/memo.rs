//! Version-keyed caching for derived views.

use log::trace;
use parking_lot::Mutex;

/// A cached value tagged with the registry version it was computed at.
///
/// The cache is only a shortcut: a read at a newer version recomputes, and a
/// compute closure must not mutate the registry.
pub(crate) struct Memo<T> {
    label: &'static str,
    cached: Mutex<Option<(u64, T)>>,
}

impl<T: Clone> Memo<T> {
    pub(crate) fn new(label: &'static str) -> Self {
        Self {
            label,
            cached: Mutex::new(None),
        }
    }

    /// Returns the cached value for `version`, computing it if needed.
    pub(crate) fn get(&self, version: u64, compute: impl FnOnce() -> T) -> T {
        let mut cached = self.cached.lock();
        if let Some((at, value)) = cached.as_ref() {
            if *at == version {
                return value.clone();
            }
        }
        trace!("recomputing {} view at version {}", self.label, version);
        let value = compute();
        *cached = Some((version, value.clone()));
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_computes_once_per_version() {
        let memo = Memo::new("test");
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            calls.get()
        };

        assert_eq!(memo.get(1, compute), 1);
        assert_eq!(memo.get(1, compute), 1);
        assert_eq!(calls.get(), 1);

        assert_eq!(memo.get(2, compute), 2);
        assert_eq!(calls.get(), 2);
    }
}
