//! At-most-once, thread-safe deferred initialization.
//!
//! ```text
//!   get_with()
//!      │
//!      ├── done? ──yes──► read published value (no lock)
//!      │
//!      └── no ──► lock ──► done? ──yes──► unlock, read
//!                              │
//!                              └── no ──► take producer, run it,
//!                                         store value, publish done
//! ```
//!
//! The producer must never call back into the same cell: the lock is not
//! re-entrant and a recursive call deadlocks. Callers that might reach the
//! cell they are initializing must check for that case themselves.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

/// A cell holding a value of type `T`, produced once from a producer `F`.
pub struct LazyCell<T, F> {
    done: AtomicBool,
    producer: Mutex<Option<F>>,
    value: OnceLock<T>,
}

/// A cell whose producer is a plain closure.
pub type Lazy<T> = LazyCell<T, Box<dyn FnOnce() -> T + Send>>;

impl<T, F> LazyCell<T, F> {
    /// A cell that runs `producer` on first access.
    pub fn new(producer: F) -> Self {
        LazyCell {
            done: AtomicBool::new(false),
            producer: Mutex::new(Some(producer)),
            value: OnceLock::new(),
        }
    }

    /// A cell that is already initialized.
    pub fn ready(value: T) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(value);
        LazyCell {
            done: AtomicBool::new(true),
            producer: Mutex::new(None),
            value: cell,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// The value, if some caller already initialized it.
    pub fn try_get(&self) -> Option<&T> {
        if self.is_initialized() {
            self.value.get()
        } else {
            None
        }
    }

    /// Return the value, running `run(producer)` first if nobody has yet.
    ///
    /// Concurrent first callers block on the lock until the winner publishes.
    pub fn get_with(&self, run: impl FnOnce(F) -> T) -> &T {
        if !self.done.load(Ordering::Acquire) {
            self.init_slow(run);
        }
        match self.value.get() {
            Some(value) => value,
            None => unreachable!("lazy cell marked done without a value"),
        }
    }

    #[cold]
    fn init_slow(&self, run: impl FnOnce(F) -> T) {
        let mut producer = self.producer.lock();
        if self.done.load(Ordering::Acquire) {
            return;
        }
        let Some(f) = producer.take() else {
            panic!("lazy initialization previously panicked");
        };
        let value = run(f);
        if self.value.set(value).is_err() {
            unreachable!("lazy cell value set twice");
        }
        self.done.store(true, Ordering::Release);
    }
}

impl<T> LazyCell<T, Box<dyn FnOnce() -> T + Send>> {
    pub fn from_fn(f: impl FnOnce() -> T + Send + 'static) -> Self {
        let producer: Box<dyn FnOnce() -> T + Send> = Box::new(f);
        LazyCell::new(producer)
    }

    pub fn get(&self) -> &T {
        self.get_with(|f| f())
    }
}

impl<T: fmt::Debug, F> fmt::Debug for LazyCell<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_get() {
            Some(value) => f.debug_tuple("LazyCell").field(value).finish(),
            None => f.write_str("LazyCell(<uninit>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Barrier};

    #[test]
    fn producer_runs_once_under_contention() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let cell: Lazy<Vec<u32>> = Lazy::from_fn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            (0..1000).collect()
        });

        let barrier = Barrier::new(16);
        let seen: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..16)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        let v = cell.get();
                        assert_eq!(v.len(), 1000);
                        v.as_ptr() as usize
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(seen.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn ready_cell_never_runs_producer() {
        let cell: LazyCell<u8, ()> = LazyCell::ready(7);
        assert!(cell.is_initialized());
        assert_eq!(*cell.get_with(|_| panic!("must not run")), 7);
    }

    #[test]
    fn try_get_before_and_after() {
        let cell: Lazy<&'static str> = Lazy::from_fn(|| "x");
        assert!(cell.try_get().is_none());
        assert_eq!(*cell.get(), "x");
        assert_eq!(cell.try_get(), Some(&"x"));
    }

    #[test]
    fn panicking_producer_poisons_cell() {
        let cell: Lazy<u8> = Lazy::from_fn(|| panic!("boom"));
        assert!(catch_unwind(AssertUnwindSafe(|| *cell.get())).is_err());
        let err = catch_unwind(AssertUnwindSafe(|| *cell.get())).unwrap_err();
        let msg = err.downcast_ref::<&str>().copied().unwrap_or_default();
        assert_eq!(msg, "lazy initialization previously panicked");
        assert!(!cell.is_initialized());
    }
}
