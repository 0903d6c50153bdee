use std::sync::Arc;

use crate::processing::orientation::DeviceOrientation;
use crate::traits::capture_device::CaptureDevice;

/// Camera access authorization as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    NotDetermined,
    Authorized,
    Denied,
    Restricted,
}

impl AuthorizationStatus {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized)
    }
}

/// Interface to the platform's camera services.
///
/// Implemented by:
/// - `VirtualPlatform` (photo-capture-virtual)
pub trait CameraPlatform: Send + Sync {
    /// All video capture devices currently exposed by the platform.
    fn devices(&self) -> Vec<Arc<dyn CaptureDevice>>;

    /// The system-default video capture device, if any.
    fn default_device(&self) -> Option<Arc<dyn CaptureDevice>>;

    fn authorization_status(&self) -> AuthorizationStatus;

    /// Ask the user for camera access.
    ///
    /// Called on the session queue and may block it until the user answers;
    /// captures queued behind a start wait for the answer.
    fn request_access(&self) -> bool;

    /// Current physical orientation of the device.
    fn device_orientation(&self) -> DeviceOrientation;
}
