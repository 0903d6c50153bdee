//! Software camera device.
//!
//! Behaves like a physical camera for configuration purposes: exclusive
//! configuration lock, per-device flash capabilities and a current flash
//! mode that only changes while the lock is held.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use photo_capture_core::models::camera_models::{DevicePosition, FlashMode};
use photo_capture_core::models::error::CaptureError;
use photo_capture_core::traits::capture_device::CaptureDevice;

/// A virtual camera.
pub struct VirtualCamera {
    id: String,
    name: String,
    position: DevicePosition,
    flash_modes: Vec<FlashMode>,
    flash_mode: Mutex<FlashMode>,
    locked: AtomicBool,
}

impl VirtualCamera {
    /// Camera with a flash supporting every mode.
    pub fn with_flash(id: &str, name: &str, position: DevicePosition) -> Arc<Self> {
        Arc::new(Self::build(id, name, position, vec![FlashMode::Off, FlashMode::On, FlashMode::Auto]))
    }

    /// Camera without a flash unit.
    pub fn without_flash(id: &str, name: &str, position: DevicePosition) -> Arc<Self> {
        Arc::new(Self::build(id, name, position, Vec::new()))
    }

    /// Camera whose flash supports only `modes`.
    pub fn with_flash_modes(id: &str, name: &str, position: DevicePosition, modes: &[FlashMode]) -> Arc<Self> {
        Arc::new(Self::build(id, name, position, modes.to_vec()))
    }

    fn build(id: &str, name: &str, position: DevicePosition, flash_modes: Vec<FlashMode>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            position,
            flash_modes,
            flash_mode: Mutex::new(FlashMode::Off),
            locked: AtomicBool::new(false),
        }
    }

    /// Whether someone currently holds the configuration lock.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }
}

impl CaptureDevice for VirtualCamera {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> DevicePosition {
        self.position
    }

    fn has_flash(&self) -> bool {
        !self.flash_modes.is_empty()
    }

    fn flash_mode(&self) -> FlashMode {
        *self.flash_mode.lock()
    }

    fn is_flash_mode_supported(&self, mode: FlashMode) -> bool {
        self.flash_modes.contains(&mode)
    }

    fn lock_for_configuration(&self) -> Result<(), CaptureError> {
        self.locked
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|_| CaptureError::LockContention(format!("'{}' is locked by another client", self.id)))
    }

    fn unlock_for_configuration(&self) {
        self.locked.store(false, Ordering::SeqCst);
    }

    fn set_flash_mode(&self, mode: FlashMode) {
        if !self.is_locked() {
            log::warn!("Flash mode of '{}' changed without configuration lock", self.id);
        }
        *self.flash_mode.lock() = mode;
    }
}
