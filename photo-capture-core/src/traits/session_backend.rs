use std::sync::Arc;

use crate::models::camera_models::SessionPreset;
use crate::models::config::OutputSettings;
use crate::models::error::CaptureError;
use crate::processing::orientation::CaptureOrientation;
use crate::traits::capture_device::CaptureDevice;

/// Completion handler for a still capture.
///
/// May be invoked on any thread. `Ok` carries the encoded image bytes.
pub type StillImageCallback = Box<dyn FnOnce(Result<Vec<u8>, CaptureError>) + Send + 'static>;

/// Interface to the platform's hardware capture session.
///
/// Owned by the session queue: every method is called from the single
/// `camera-session` thread, so implementations never see interleaved
/// configuration calls. Capability predicates are advisory; the core
/// checks them before every mutation and skips what is unsupported.
pub trait SessionBackend: Send {
    fn begin_configuration(&mut self);

    fn commit_configuration(&mut self);

    fn can_set_preset(&self, preset: SessionPreset) -> bool;

    fn set_preset(&mut self, preset: SessionPreset);

    fn can_add_input(&self, device: &dyn CaptureDevice) -> bool;

    /// Bind `device` as an input. Fails if the device cannot be opened.
    fn add_input(&mut self, device: Arc<dyn CaptureDevice>) -> Result<(), CaptureError>;

    fn remove_input(&mut self, device_id: &str);

    fn can_add_output(&self, settings: &OutputSettings) -> bool;

    fn add_output(&mut self, settings: OutputSettings);

    fn remove_output(&mut self);

    fn start_running(&mut self);

    fn stop_running(&mut self);

    /// Whether the still-image output's connection accepts an orientation tag.
    fn supports_orientation(&self) -> bool;

    /// Issue a still capture against the current output.
    ///
    /// Returns immediately; `completion` fires once the hardware finishes.
    fn capture_still(&mut self, orientation: Option<CaptureOrientation>, completion: StillImageCallback);
}
