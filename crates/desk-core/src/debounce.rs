//! Trailing-edge debouncing for a single input field.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Delivers a value only after `delay` has passed without a newer one.
///
/// Every [`push`](Debouncer::push) aborts the pending timer and starts a new one, so only
/// the task scheduled by the latest edit can deliver. Delivered values arrive on the
/// receiver returned by [`Debouncer::new`].
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                delay,
                tx,
                pending: None,
            },
            rx,
        )
    }

    /// Restarts the quiet period with `value` as the candidate.
    ///
    /// Must be called from within a tokio runtime.
    pub fn push(&mut self, value: T) {
        self.cancel();
        let tx = self.tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // receiver gone means nobody is listening any more
            let _ = tx.send(value);
        }));
    }

    /// Drops the pending value, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
