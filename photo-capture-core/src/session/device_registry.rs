use std::sync::Arc;

use crate::models::camera_models::{CameraInfo, DeviceSelector};
use crate::models::error::CaptureError;
use crate::traits::camera_platform::CameraPlatform;
use crate::traits::capture_device::CaptureDevice;

/// Enumerates cameras and resolves logical selectors to devices.
///
/// The device list is enumerated lazily and cached until `refresh`.
pub struct DeviceRegistry {
    platform: Arc<dyn CameraPlatform>,
    cache: Option<Vec<Arc<dyn CaptureDevice>>>,
}

impl DeviceRegistry {
    pub fn new(platform: Arc<dyn CameraPlatform>) -> Self {
        Self { platform, cache: None }
    }

    /// All known devices, enumerating on first use.
    pub fn devices(&mut self) -> &[Arc<dyn CaptureDevice>] {
        let platform = &self.platform;
        self.cache.get_or_insert_with(|| platform.devices())
    }

    /// Drop the cached list and enumerate again. Returns the device count.
    pub fn refresh(&mut self) -> usize {
        self.cache = None;
        let count = self.devices().len();
        log::debug!("Re-enumerated {} camera device(s)", count);
        count
    }

    /// Resolve `selector` to a concrete device.
    ///
    /// `Default` asks the platform for its system-default camera; `Front`
    /// and `Rear` return the first enumerated device at that position.
    pub fn resolve(&mut self, selector: DeviceSelector) -> Result<Arc<dyn CaptureDevice>, CaptureError> {
        let found = match selector {
            DeviceSelector::Default => self.platform.default_device(),
            DeviceSelector::Front | DeviceSelector::Rear => self
                .devices()
                .iter()
                .find(|device| selector.matches(device.position()))
                .cloned(),
        };
        found.ok_or_else(|| CaptureError::DeviceUnavailable(selector.to_string()))
    }

    /// Descriptions of all known devices, flagging the system default.
    pub fn available(&mut self) -> Vec<CameraInfo> {
        let default_id = self.platform.default_device().map(|d| d.id().to_string());
        self.devices()
            .iter()
            .map(|device| {
                let mut info = device.info();
                info.is_default = default_id.as_deref() == Some(device.id());
                info
            })
            .collect()
    }
}
