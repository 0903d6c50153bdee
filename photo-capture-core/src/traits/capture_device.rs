use crate::models::camera_models::{CameraInfo, DevicePosition, FlashMode};
use crate::models::error::CaptureError;

/// Interface for a physical camera exposed by the platform.
///
/// Flash changes must happen between `lock_for_configuration` and
/// `unlock_for_configuration`; the device may be in use by the streaming
/// pipeline at the same time.
pub trait CaptureDevice: Send + Sync {
    /// Stable platform identifier.
    fn id(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> &str;

    fn position(&self) -> DevicePosition;

    fn has_flash(&self) -> bool;

    fn flash_mode(&self) -> FlashMode;

    fn is_flash_mode_supported(&self, mode: FlashMode) -> bool;

    /// Acquire the exclusive configuration lock. Fails when the device is busy.
    fn lock_for_configuration(&self) -> Result<(), CaptureError>;

    fn unlock_for_configuration(&self);

    /// Only valid while the configuration lock is held.
    fn set_flash_mode(&self, mode: FlashMode);

    fn info(&self) -> CameraInfo {
        CameraInfo {
            id: self.id().to_string(),
            name: self.name().to_string(),
            position: self.position(),
            has_flash: self.has_flash(),
            is_default: false,
        }
    }
}
