use std::sync::Arc;

use tokio::sync::watch;

type View<T> = Box<dyn Fn(&[T]) -> Vec<T> + Send + Sync>;

/// Live feed of full snapshots for one user's collection.
///
/// The first call to [`Subscription::next`] yields the current snapshot
/// immediately; every later call waits for a write and yields the latest
/// snapshot. Writes landing between two calls are coalesced into one snapshot.
/// Dropping the subscription (or calling [`Subscription::unsubscribe`]) detaches
/// it from the store.
pub struct Subscription<T> {
    rx: watch::Receiver<Arc<Vec<T>>>,
    view: View<T>,
    primed: bool,
}

impl<T> Subscription<T> {
    pub(crate) fn new<F>(rx: watch::Receiver<Arc<Vec<T>>>, view: F) -> Self
    where
        F: Fn(&[T]) -> Vec<T> + Send + Sync + 'static,
    {
        Self {
            rx,
            view: Box::new(view),
            primed: false,
        }
    }

    /// Latest snapshot known to the store, without waiting.
    pub fn current(&self) -> Vec<T> {
        let docs = Arc::clone(&self.rx.borrow());
        (self.view)(&docs)
    }

    /// Waits for the latest snapshot. Returns `None` once the store has gone away.
    pub async fn next(&mut self) -> Option<Vec<T>> {
        if self.primed {
            self.rx.changed().await.ok()?;
        }
        self.primed = true;
        let docs = Arc::clone(&self.rx.borrow_and_update());
        Some((self.view)(&docs))
    }

    /// True when a write landed since the last snapshot returned by `next`.
    pub fn has_pending(&self) -> bool {
        !self.primed || self.rx.has_changed().unwrap_or(false)
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}
