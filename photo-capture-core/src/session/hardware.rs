use std::sync::Arc;

use crate::models::camera_models::SessionPreset;
use crate::models::config::OutputSettings;
use crate::models::error::CaptureError;
use crate::traits::capture_device::CaptureDevice;
use crate::traits::session_backend::SessionBackend;

/// Hardware session plus the bookkeeping of what is bound to it.
///
/// Lives on the session queue thread; only queued jobs can touch it.
/// Holds at most one input and at most one output.
pub(crate) struct HardwareContext {
    pub(crate) backend: Box<dyn SessionBackend>,
    pub(crate) input: Option<Arc<dyn CaptureDevice>>,
    pub(crate) output: Option<OutputSettings>,
    pub(crate) preset: Option<SessionPreset>,
    pub(crate) running: bool,
}

impl HardwareContext {
    pub(crate) fn new(backend: Box<dyn SessionBackend>) -> Self {
        Self {
            backend,
            input: None,
            output: None,
            preset: None,
            running: false,
        }
    }

    pub(crate) fn input_count(&self) -> usize {
        usize::from(self.input.is_some())
    }

    pub(crate) fn output_count(&self) -> usize {
        usize::from(self.output.is_some())
    }

    pub(crate) fn is_configured(&self) -> bool {
        self.input.is_some() && self.output.is_some()
    }

    /// Swap the session input for `device`. Must run inside a transaction.
    ///
    /// The old input is removed before the new one is added; hardware
    /// rejects a second concurrent input. If the new device cannot be
    /// bound, the old input is restored.
    pub(crate) fn replace_input(&mut self, device: Arc<dyn CaptureDevice>) -> Result<(), CaptureError> {
        if let Some(current) = &self.input {
            if current.id() == device.id() {
                return Ok(());
            }
        }

        let previous = self.input.take();
        if let Some(old) = &previous {
            self.backend.remove_input(old.id());
        }

        match self.bind_input(Arc::clone(&device)) {
            Ok(()) => {
                log::debug!("Bound camera input '{}'", device.id());
                Ok(())
            }
            Err(e) => {
                if let Some(old) = previous {
                    if self.bind_input(Arc::clone(&old)).is_err() {
                        log::warn!("Failed to restore camera input '{}'", old.id());
                    }
                }
                Err(e)
            }
        }
    }

    fn bind_input(&mut self, device: Arc<dyn CaptureDevice>) -> Result<(), CaptureError> {
        if !self.backend.can_add_input(device.as_ref()) {
            return Err(CaptureError::ConfigurationRejected(format!(
                "session cannot add input '{}'",
                device.id()
            )));
        }
        self.backend.add_input(Arc::clone(&device))?;
        self.input = Some(device);
        Ok(())
    }

    /// Bind the still-image output if none is bound and the hardware accepts it.
    pub(crate) fn ensure_output(&mut self, settings: OutputSettings) {
        if self.output.is_some() {
            return;
        }
        if self.backend.can_add_output(&settings) {
            self.backend.add_output(settings);
            self.output = Some(settings);
        } else {
            log::debug!("Session cannot add still image output {:?}, skipping", settings);
        }
    }

    /// Apply `preset` when supported; unsupported presets are skipped.
    pub(crate) fn apply_preset(&mut self, preset: SessionPreset) {
        if self.preset == Some(preset) {
            return;
        }
        if self.backend.can_set_preset(preset) {
            self.backend.set_preset(preset);
            self.preset = Some(preset);
        } else {
            log::debug!("Session preset {:?} not supported, skipping", preset);
        }
    }

    pub(crate) fn start_running(&mut self) {
        if !self.running {
            self.backend.start_running();
            self.running = true;
        }
    }

    /// Stop streaming, then remove outputs and inputs in one transaction.
    pub(crate) fn teardown(&mut self) {
        if self.running {
            self.backend.stop_running();
            self.running = false;
        }
        if self.output.is_none() && self.input.is_none() {
            return;
        }

        self.backend.begin_configuration();
        if self.output.take().is_some() {
            self.backend.remove_output();
        }
        if let Some(device) = self.input.take() {
            self.backend.remove_input(device.id());
        }
        self.backend.commit_configuration();
    }
}
