use std::sync::mpsc::{self, Sender};
use std::thread;

use parking_lot::Mutex;

use crate::models::error::CaptureError;
use crate::session::hardware::HardwareContext;
use crate::traits::session_backend::SessionBackend;

type Job = Box<dyn FnOnce(&mut HardwareContext) + Send + 'static>;

/// Serial execution context that owns the hardware session.
///
/// Configuration transactions, capture issuance and save issuance all run
/// here in submission order on a single `camera-session` thread, so a
/// begin/commit pair is never interleaved with another request and a
/// capture never reaches the hardware ahead of a start queued before it.
pub(crate) struct SessionQueue {
    sender: Mutex<Option<Sender<Job>>>,
}

impl SessionQueue {
    /// Spawn the queue thread, moving `backend` onto it.
    pub(crate) fn spawn(backend: Box<dyn SessionBackend>) -> Result<(Self, thread::JoinHandle<()>), CaptureError> {
        let (sender, receiver) = mpsc::channel::<Job>();

        let handle = thread::Builder::new()
            .name("camera-session".into())
            .spawn(move || {
                let mut hardware = HardwareContext::new(backend);
                // Drains queued jobs after close, then exits.
                while let Ok(job) = receiver.recv() {
                    job(&mut hardware);
                }
                hardware.teardown();
                log::debug!("Camera session queue exited");
            })
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn session queue: {}", e)))?;

        Ok((
            Self {
                sender: Mutex::new(Some(sender)),
            },
            handle,
        ))
    }

    /// Enqueue `job`. Fails with `SessionStopped` once the queue is closed.
    pub(crate) fn submit<F>(&self, job: F) -> Result<(), CaptureError>
    where
        F: FnOnce(&mut HardwareContext) + Send + 'static,
    {
        let guard = self.sender.lock();
        let sender = guard.as_ref().ok_or(CaptureError::SessionStopped)?;
        sender.send(Box::new(job)).map_err(|_| CaptureError::SessionStopped)
    }

    /// Stop accepting jobs. Already queued jobs still run.
    pub(crate) fn close(&self) {
        self.sender.lock().take();
    }
}
