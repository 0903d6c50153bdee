use std::sync::mpsc::{self, SendError, Sender};
use std::thread;

use parking_lot::Mutex;

use crate::models::error::CaptureError;

type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Thread that runs caller callbacks raised on the session queue.
///
/// Continuations, error callbacks and delegate notifications must never run
/// on the `camera-session` thread: a callback that waits on a session
/// operation would block the very queue that has to run it. Callbacks are
/// run in submission order on a single `camera-callbacks` thread.
pub(crate) struct CallbackQueue {
    sender: Mutex<Option<Sender<Callback>>>,
}

impl CallbackQueue {
    pub(crate) fn spawn() -> Result<(Self, thread::JoinHandle<()>), CaptureError> {
        let (sender, receiver) = mpsc::channel::<Callback>();

        let handle = thread::Builder::new()
            .name("camera-callbacks".into())
            .spawn(move || {
                while let Ok(callback) = receiver.recv() {
                    callback();
                }
                log::debug!("Camera callback queue exited");
            })
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn callback queue: {}", e)))?;

        Ok((
            Self {
                sender: Mutex::new(Some(sender)),
            },
            handle,
        ))
    }

    /// Run `callback` on the callback thread, or inline once the queue is closed.
    pub(crate) fn dispatch<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let callback: Callback = Box::new(callback);
        let rejected = {
            let guard = self.sender.lock();
            match guard.as_ref() {
                Some(sender) => match sender.send(callback) {
                    Ok(()) => None,
                    Err(SendError(callback)) => Some(callback),
                },
                None => Some(callback),
            }
        };
        if let Some(callback) = rejected {
            log::debug!("Callback queue closed, running callback inline");
            callback();
        }
    }

    /// Stop accepting callbacks. Already queued callbacks still run.
    pub(crate) fn close(&self) {
        self.sender.lock().take();
    }
}
