use std::sync::mpsc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::error::CaptureError;

type Resolver<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// A completion handler that can be resolved at most once.
///
/// Several parties may race to settle the same continuation (a hardware
/// completion and a concurrent `stop`, for instance). The first `resolve`
/// runs the handler; every later attempt returns
/// [`CaptureError::AlreadyResolved`] without running anything.
pub struct Continuation<T> {
    resolver: Mutex<Option<Resolver<T>>>,
}

impl<T> Continuation<T> {
    pub fn new<F>(handler: F) -> Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        Self {
            resolver: Mutex::new(Some(Box::new(handler))),
        }
    }

    /// Run the handler with `value`.
    ///
    /// The handler runs on the calling thread after the internal lock is
    /// released.
    pub fn resolve(&self, value: T) -> Result<(), CaptureError> {
        let resolver = self.resolver.lock().take().ok_or(CaptureError::AlreadyResolved)?;
        resolver(value);
        Ok(())
    }
}

/// Waitable result of an operation running on the session queue.
///
/// Dropping a `Completion` does not cancel the operation.
pub struct Completion<T> {
    receiver: mpsc::Receiver<T>,
}

impl<T: Send + 'static> Completion<T> {
    /// A continuation and the completion it resolves.
    pub fn pair() -> (Continuation<T>, Completion<T>) {
        let (sender, receiver) = mpsc::channel();
        let continuation = Continuation::new(move |value| {
            let _ = sender.send(value);
        });
        (continuation, Completion { receiver })
    }

    /// Block until the operation settles.
    ///
    /// Returns [`CaptureError::SessionStopped`] if the operation was dropped
    /// without running, e.g. because the session shut down first.
    pub fn wait(self) -> Result<T, CaptureError> {
        self.receiver.recv().map_err(|_| CaptureError::SessionStopped)
    }

    /// Block for at most `timeout`. `None` on timeout or if the operation was dropped.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<T> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Non-blocking poll.
    pub fn try_get(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }
}
