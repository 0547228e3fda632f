//! Shared busy indicator
//!
//! A reference count of in-flight actions. Every action holds a
//! [`BusyGuard`] for its whole duration; the indicator reads busy while at
//! least one guard is alive, so one action finishing never hides another
//! that is still running. Observers can subscribe to busy/idle transitions.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::watch;

struct Inner {
    count: AtomicUsize,
    tx: watch::Sender<bool>,
}

/// Reference-counted busy indicator. Clones share the same count.
#[derive(Clone)]
pub struct BusyCounter {
    inner: Arc<Inner>,
}

impl BusyCounter {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                count: AtomicUsize::new(0),
                tx,
            }),
        }
    }

    /// Mark one unit of work as started; it ends when the guard drops
    pub fn begin(&self) -> BusyGuard {
        self.inner.adjust(increment);
        BusyGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.count() > 0
    }

    /// Number of actions currently in flight
    pub fn count(&self) -> usize {
        self.inner.count.load(Ordering::SeqCst)
    }

    /// Receive busy/idle transitions
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.tx.subscribe()
    }
}

impl Default for BusyCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    /// Change the count and publish the matching flag in one step.
    ///
    /// The closure runs under the channel's write lock, so concurrent
    /// changes publish in the same order they hit the count.
    fn adjust(&self, change: impl FnOnce(&AtomicUsize) -> usize) {
        self.tx.send_if_modified(|busy| {
            let now = change(&self.count) > 0;
            let modified = *busy != now;
            *busy = now;
            modified
        });
    }
}

fn increment(count: &AtomicUsize) -> usize {
    count.fetch_add(1, Ordering::SeqCst) + 1
}

fn decrement(count: &AtomicUsize) -> usize {
    count.fetch_sub(1, Ordering::SeqCst) - 1
}

impl std::fmt::Debug for BusyCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusyCounter")
            .field("count", &self.count())
            .finish()
    }
}

/// Held for the duration of one action
#[must_use = "the indicator goes idle as soon as the guard is dropped"]
pub struct BusyGuard {
    inner: Arc<Inner>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.inner.adjust(decrement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_by_default() {
        let busy = BusyCounter::new();
        assert!(!busy.is_busy());
        assert_eq!(busy.count(), 0);
    }

    #[test]
    fn test_nested_guards_keep_busy() {
        let busy = BusyCounter::new();
        let first = busy.begin();
        let second = busy.begin();
        assert_eq!(busy.count(), 2);

        drop(first);
        assert!(busy.is_busy());

        drop(second);
        assert!(!busy.is_busy());
    }

    #[test]
    fn test_clones_share_count() {
        let busy = BusyCounter::new();
        let view = busy.clone();
        let _guard = busy.begin();
        assert!(view.is_busy());
    }

    #[tokio::test]
    async fn test_subscribers_see_transitions() {
        let busy = BusyCounter::new();
        let mut rx = busy.subscribe();
        assert!(!*rx.borrow());

        let guard = busy.begin();
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());

        drop(guard);
        rx.changed().await.unwrap();
        assert!(!*rx.borrow_and_update());
    }

    #[test]
    fn test_flag_stays_busy_while_guard_alive_across_threads() {
        let busy = BusyCounter::new();

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let busy = busy.clone();
                let rx = busy.subscribe();
                std::thread::spawn(move || {
                    for _ in 0..5_000 {
                        let guard = busy.begin();
                        assert!(*rx.borrow(), "flag read idle while a guard was alive");
                        drop(guard);
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(busy.count(), 0);
        assert!(!*busy.subscribe().borrow());
    }
}
