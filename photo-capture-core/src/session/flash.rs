//! Device-level flash configuration.
//!
//! Flash changes take the device's own configuration lock rather than going
//! through the session queue; they are legal while the session streams.

use crate::models::camera_models::FlashMode;
use crate::models::error::CaptureError;
use crate::traits::capture_device::CaptureDevice;

/// Exclusive device configuration lock, released on drop.
pub struct ConfigurationLock<'a> {
    device: &'a dyn CaptureDevice,
}

impl<'a> ConfigurationLock<'a> {
    pub fn acquire(device: &'a dyn CaptureDevice) -> Result<Self, CaptureError> {
        device.lock_for_configuration().map_err(|e| match e {
            CaptureError::LockContention(_) => e,
            other => CaptureError::LockContention(other.to_string()),
        })?;
        Ok(Self { device })
    }
}

impl Drop for ConfigurationLock<'_> {
    fn drop(&mut self) {
        self.device.unlock_for_configuration();
    }
}

/// Set the flash mode of `device`.
///
/// Returns `Ok(false)` without touching the device when it has no flash or
/// does not support `mode`. Lock failures leave the mode unchanged.
pub fn set_flash_mode(device: &dyn CaptureDevice, mode: FlashMode) -> Result<bool, CaptureError> {
    if !device.has_flash() {
        log::debug!("Camera '{}' has no flash, ignoring {:?}", device.id(), mode);
        return Ok(false);
    }
    if !device.is_flash_mode_supported(mode) {
        log::debug!("Camera '{}' does not support flash mode {:?}", device.id(), mode);
        return Ok(false);
    }
    if device.flash_mode() == mode {
        return Ok(true);
    }

    let _lock = ConfigurationLock::acquire(device)?;
    device.set_flash_mode(mode);
    log::debug!("Camera '{}' flash set to {:?}", device.id(), mode);
    Ok(true)
}

/// Flip the flash between off and on. `Auto` counts as on.
///
/// Returns the new mode, or `None` when the change did not apply.
pub fn toggle_flash_mode(device: &dyn CaptureDevice) -> Result<Option<FlashMode>, CaptureError> {
    let next = device.flash_mode().toggled();
    Ok(set_flash_mode(device, next)?.then_some(next))
}
