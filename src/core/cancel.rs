use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Cooperative cancellation handle for one in-flight upstream call.
///
/// The forwarder races the call against [`CancelHandle::cancelled`]; the
/// deadline timer and any outside party (e.g. a client disconnect) signal it
/// through [`CancelHandle::cancel`].
#[derive(Clone)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
    receiver: watch::Receiver<bool>,
    /// Set once the call settled on its own, after which cancel is a no-op
    settled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender,
            receiver,
            settled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Mark the call as settled (response or transport error received).
    pub fn mark_settled(&self) {
        self.settled.store(true, Ordering::SeqCst);
    }

    pub fn is_settled(&self) -> bool {
        self.settled.load(Ordering::SeqCst)
    }

    /// Signal cancellation (only if the call has not settled)
    pub fn cancel(&self) {
        if !self.is_settled() {
            let _ = self.sender.send(true);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Get a receiver for use in select!
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.receiver.clone()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.subscribe();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}
