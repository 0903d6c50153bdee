use std::sync::Arc;

use crate::models::camera_models::DevicePosition;
use crate::models::error::CaptureError;
use crate::models::state::SessionState;

/// Sink for asynchronous failures that have no caller continuation.
pub type ErrorCallback = Arc<dyn Fn(&CaptureError) + Send + Sync + 'static>;

/// Event delegate for capture session notifications.
///
/// All methods are called from the session queue or a hardware completion
/// thread, not the UI thread. Implementations should marshal to the UI
/// thread if needed.
pub trait CaptureDelegate: Send + Sync {
    /// Called when the session state changes.
    fn on_state_changed(&self, state: &SessionState);

    /// Called when a different camera becomes the session input.
    fn on_device_changed(&self, _position: DevicePosition) {}
}
