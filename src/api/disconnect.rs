use crate::core::CancelHandle;

/// Signals a [`CancelHandle`] when dropped before being disarmed.
///
/// hyper drops the handler future when the client disconnects; holding this
/// guard in the handler turns that drop into a cancellation the pipeline can
/// observe.
pub struct DisconnectGuard {
    cancel_handle: Option<CancelHandle>,
}

impl DisconnectGuard {
    pub fn new(cancel_handle: CancelHandle) -> Self {
        Self {
            cancel_handle: Some(cancel_handle),
        }
    }

    /// Call once the response is ready; a disarmed guard does nothing on drop.
    pub fn disarm(mut self) {
        self.cancel_handle = None;
    }
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.cancel_handle.take() {
            if !handle.is_settled() {
                tracing::debug!("Client disconnect detected - upstream call cancelled");
            }
            handle.cancel();
        }
    }
}
