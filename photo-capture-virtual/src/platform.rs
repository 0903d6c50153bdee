//! Virtual camera platform: device catalogue, consent and device motion.

use std::sync::Arc;

use parking_lot::Mutex;

use photo_capture_core::models::camera_models::DevicePosition;
use photo_capture_core::processing::orientation::DeviceOrientation;
use photo_capture_core::traits::camera_platform::{AuthorizationStatus, CameraPlatform};
use photo_capture_core::traits::capture_device::CaptureDevice;

use crate::camera::VirtualCamera;
use crate::permissions::AccessPrompt;

/// Identifier of the rear camera in `VirtualPlatform::phone()`.
pub const REAR_CAMERA_ID: &str = "virtual-rear-wide";
/// Identifier of the front camera in `VirtualPlatform::phone()`.
pub const FRONT_CAMERA_ID: &str = "virtual-front";

/// Camera platform backed by virtual devices.
///
/// Device hot-plugging is modelled by `attach_camera`/`detach_camera`; the
/// session only notices after `refresh_devices`.
pub struct VirtualPlatform {
    cameras: Mutex<Vec<Arc<VirtualCamera>>>,
    default_id: Mutex<Option<String>>,
    access: AccessPrompt,
    orientation: Mutex<DeviceOrientation>,
}

impl VirtualPlatform {
    /// Platform with the given cameras; the first one is the system default.
    pub fn new(cameras: Vec<Arc<VirtualCamera>>, access: AccessPrompt) -> Self {
        let default_id = cameras.first().map(|c| c.id().to_string());
        Self {
            cameras: Mutex::new(cameras),
            default_id: Mutex::new(default_id),
            access,
            orientation: Mutex::new(DeviceOrientation::Portrait),
        }
    }

    /// Typical phone: rear wide camera with flash (default) and a flashless front camera.
    pub fn phone() -> Self {
        Self::phone_with_access(AccessPrompt::granted())
    }

    pub fn phone_with_access(access: AccessPrompt) -> Self {
        Self::new(
            vec![
                VirtualCamera::with_flash(REAR_CAMERA_ID, "Back Camera", DevicePosition::Rear),
                VirtualCamera::without_flash(FRONT_CAMERA_ID, "Front Camera", DevicePosition::Front),
            ],
            access,
        )
    }

    pub fn camera(&self, id: &str) -> Option<Arc<VirtualCamera>> {
        self.cameras.lock().iter().find(|c| c.id() == id).cloned()
    }

    pub fn attach_camera(&self, camera: Arc<VirtualCamera>) {
        let mut cameras = self.cameras.lock();
        if cameras.is_empty() {
            *self.default_id.lock() = Some(camera.id().to_string());
        }
        cameras.push(camera);
    }

    /// Unplug a camera. Returns false if it was not attached.
    pub fn detach_camera(&self, id: &str) -> bool {
        let mut cameras = self.cameras.lock();
        let before = cameras.len();
        cameras.retain(|c| c.id() != id);
        let mut default_id = self.default_id.lock();
        if default_id.as_deref() == Some(id) {
            *default_id = cameras.first().map(|c| c.id().to_string());
        }
        cameras.len() != before
    }

    pub fn set_orientation(&self, orientation: DeviceOrientation) {
        *self.orientation.lock() = orientation;
    }

    pub fn access(&self) -> &AccessPrompt {
        &self.access
    }
}

impl CameraPlatform for VirtualPlatform {
    fn devices(&self) -> Vec<Arc<dyn CaptureDevice>> {
        self.cameras
            .lock()
            .iter()
            .map(|c| Arc::clone(c) as Arc<dyn CaptureDevice>)
            .collect()
    }

    fn default_device(&self) -> Option<Arc<dyn CaptureDevice>> {
        let default_id = self.default_id.lock().clone()?;
        self.camera(&default_id).map(|c| c as Arc<dyn CaptureDevice>)
    }

    fn authorization_status(&self) -> AuthorizationStatus {
        self.access.status()
    }

    fn request_access(&self) -> bool {
        self.access.request()
    }

    fn device_orientation(&self) -> DeviceOrientation {
        *self.orientation.lock()
    }
}
