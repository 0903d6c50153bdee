//! In-crate fakes for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use image::{Rgb, RgbImage};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::asset::{AssetRef, CaptureContext};
use crate::models::camera_models::{DevicePosition, FlashMode, SessionPreset};
use crate::models::config::OutputSettings;
use crate::models::error::CaptureError;
use crate::models::preview::{LayerPlacement, PreviewLayer, Rect};
use crate::models::state::SessionState;
use crate::processing::orientation::{CaptureOrientation, DeviceOrientation};
use crate::processing::still_image;
use crate::traits::camera_platform::{AuthorizationStatus, CameraPlatform};
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::capture_device::CaptureDevice;
use crate::traits::photo_store::{PhotoStore, SaveCallback};
use crate::traits::preview_surface::PreviewSurface;
use crate::traits::session_backend::{SessionBackend, StillImageCallback};

/// Ordered record of hardware calls.
#[derive(Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub(crate) fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub(crate) fn clear(&self) {
        self.0.lock().clear();
    }
}

pub(crate) struct FakeDevice {
    id: String,
    position: DevicePosition,
    has_flash: AtomicBool,
    modes: Mutex<Vec<FlashMode>>,
    flash: Mutex<FlashMode>,
    busy: AtomicBool,
    locked: AtomicBool,
    locks: AtomicUsize,
}

impl FakeDevice {
    pub(crate) fn new(id: &str, position: DevicePosition) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            position,
            has_flash: AtomicBool::new(true),
            modes: Mutex::new(vec![FlashMode::Off, FlashMode::On, FlashMode::Auto]),
            flash: Mutex::new(FlashMode::Off),
            busy: AtomicBool::new(false),
            locked: AtomicBool::new(false),
            locks: AtomicUsize::new(0),
        })
    }

    pub(crate) fn without_flash(self: Arc<Self>) -> Arc<Self> {
        self.has_flash.store(false, Ordering::SeqCst);
        self
    }

    pub(crate) fn with_flash_modes(self: Arc<Self>, modes: &[FlashMode]) -> Arc<Self> {
        *self.modes.lock() = modes.to_vec();
        self
    }

    pub(crate) fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::SeqCst);
    }

    pub(crate) fn lock_count(&self) -> usize {
        self.locks.load(Ordering::SeqCst)
    }

    pub(crate) fn is_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }
}

impl CaptureDevice for FakeDevice {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.id
    }

    fn position(&self) -> DevicePosition {
        self.position
    }

    fn has_flash(&self) -> bool {
        self.has_flash.load(Ordering::SeqCst)
    }

    fn flash_mode(&self) -> FlashMode {
        *self.flash.lock()
    }

    fn is_flash_mode_supported(&self, mode: FlashMode) -> bool {
        self.modes.lock().contains(&mode)
    }

    fn lock_for_configuration(&self) -> Result<(), CaptureError> {
        if self.busy.load(Ordering::SeqCst) {
            return Err(CaptureError::LockContention(format!("{} is busy", self.id)));
        }
        self.locked.store(true, Ordering::SeqCst);
        self.locks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn unlock_for_configuration(&self) {
        self.locked.store(false, Ordering::SeqCst);
    }

    fn set_flash_mode(&self, mode: FlashMode) {
        assert!(self.is_locked(), "flash mode changed without configuration lock");
        *self.flash.lock() = mode;
    }
}

pub(crate) struct FakePlatform {
    devices: Vec<Arc<FakeDevice>>,
    authorization: Mutex<AuthorizationStatus>,
    orientation: Mutex<DeviceOrientation>,
    enumerations: AtomicUsize,
    access_requests: AtomicUsize,
}

impl FakePlatform {
    /// The first device is the system default.
    pub(crate) fn new(devices: Vec<Arc<FakeDevice>>) -> Self {
        Self {
            devices,
            authorization: Mutex::new(AuthorizationStatus::Authorized),
            orientation: Mutex::new(DeviceOrientation::Portrait),
            enumerations: AtomicUsize::new(0),
            access_requests: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_authorization(self, status: AuthorizationStatus) -> Self {
        *self.authorization.lock() = status;
        self
    }

    pub(crate) fn set_orientation(&self, orientation: DeviceOrientation) {
        *self.orientation.lock() = orientation;
    }

    pub(crate) fn enumerations(&self) -> usize {
        self.enumerations.load(Ordering::SeqCst)
    }

    pub(crate) fn access_requests(&self) -> usize {
        self.access_requests.load(Ordering::SeqCst)
    }
}

impl CameraPlatform for FakePlatform {
    fn devices(&self) -> Vec<Arc<dyn CaptureDevice>> {
        self.enumerations.fetch_add(1, Ordering::SeqCst);
        self.devices
            .iter()
            .map(|d| Arc::clone(d) as Arc<dyn CaptureDevice>)
            .collect()
    }

    fn default_device(&self) -> Option<Arc<dyn CaptureDevice>> {
        self.devices.first().map(|d| Arc::clone(d) as Arc<dyn CaptureDevice>)
    }

    fn authorization_status(&self) -> AuthorizationStatus {
        *self.authorization.lock()
    }

    fn request_access(&self) -> bool {
        self.access_requests.fetch_add(1, Ordering::SeqCst);
        *self.authorization.lock() = AuthorizationStatus::Authorized;
        true
    }

    fn device_orientation(&self) -> DeviceOrientation {
        *self.orientation.lock()
    }
}

/// How the fake hardware answers still captures.
pub(crate) enum CaptureMode {
    /// Complete inline with a small JPEG.
    Immediate,
    /// Complete inline with these bytes.
    Return(Vec<u8>),
    /// Complete inline with a capture failure.
    Fail(String),
    /// Park the completion until `BackendHandle::complete_next`.
    Deferred,
}

/// Test-side access to parked capture completions.
#[derive(Clone, Default)]
pub(crate) struct BackendHandle {
    pending: Arc<Mutex<VecDeque<StillImageCallback>>>,
}

impl BackendHandle {
    pub(crate) fn complete_next(&self, result: Result<Vec<u8>, CaptureError>) -> bool {
        let next = self.pending.lock().pop_front();
        match next {
            Some(completion) => {
                completion(result);
                true
            }
            None => false,
        }
    }
}

pub(crate) struct FakeBackend {
    log: CallLog,
    presets: Option<Vec<SessionPreset>>,
    unopenable: Vec<String>,
    orientation_support: bool,
    mode: CaptureMode,
    inputs: Vec<String>,
    has_output: bool,
    handle: BackendHandle,
}

impl FakeBackend {
    pub(crate) fn new(log: CallLog) -> Self {
        Self {
            log,
            presets: None,
            unopenable: Vec::new(),
            orientation_support: true,
            mode: CaptureMode::Immediate,
            inputs: Vec::new(),
            has_output: false,
            handle: BackendHandle::default(),
        }
    }

    /// Only these presets are supported (default: all).
    pub(crate) fn with_presets(mut self, presets: &[SessionPreset]) -> Self {
        self.presets = Some(presets.to_vec());
        self
    }

    pub(crate) fn with_unopenable_device(mut self, id: &str) -> Self {
        self.unopenable.push(id.to_string());
        self
    }

    pub(crate) fn without_orientation_support(mut self) -> Self {
        self.orientation_support = false;
        self
    }

    pub(crate) fn with_capture_mode(mut self, mode: CaptureMode) -> Self {
        self.mode = mode;
        self
    }

    pub(crate) fn handle(&self) -> BackendHandle {
        self.handle.clone()
    }
}

impl SessionBackend for FakeBackend {
    fn begin_configuration(&mut self) {
        self.log.push("begin_configuration");
    }

    fn commit_configuration(&mut self) {
        self.log.push("commit_configuration");
    }

    fn can_set_preset(&self, preset: SessionPreset) -> bool {
        self.presets.as_ref().map(|p| p.contains(&preset)).unwrap_or(true)
    }

    fn set_preset(&mut self, preset: SessionPreset) {
        self.log.push(format!("set_preset:{:?}", preset));
    }

    fn can_add_input(&self, _device: &dyn CaptureDevice) -> bool {
        self.inputs.is_empty()
    }

    fn add_input(&mut self, device: Arc<dyn CaptureDevice>) -> Result<(), CaptureError> {
        if self.unopenable.iter().any(|id| id == device.id()) {
            return Err(CaptureError::CaptureFailed(format!("cannot open {}", device.id())));
        }
        self.log.push(format!("add_input:{}", device.id()));
        self.inputs.push(device.id().to_string());
        Ok(())
    }

    fn remove_input(&mut self, device_id: &str) {
        self.log.push(format!("remove_input:{}", device_id));
        self.inputs.retain(|id| id != device_id);
    }

    fn can_add_output(&self, _settings: &OutputSettings) -> bool {
        !self.has_output
    }

    fn add_output(&mut self, _settings: OutputSettings) {
        self.log.push("add_output");
        self.has_output = true;
    }

    fn remove_output(&mut self) {
        self.log.push("remove_output");
        self.has_output = false;
    }

    fn start_running(&mut self) {
        self.log.push("start_running");
    }

    fn stop_running(&mut self) {
        self.log.push("stop_running");
    }

    fn supports_orientation(&self) -> bool {
        self.orientation_support
    }

    fn capture_still(&mut self, orientation: Option<CaptureOrientation>, completion: StillImageCallback) {
        match orientation {
            Some(o) => self.log.push(format!("capture_still:{:?}", o)),
            None => self.log.push("capture_still:none"),
        }
        match &self.mode {
            CaptureMode::Immediate => {
                let frame = RgbImage::from_pixel(8, 8, Rgb([200, 120, 40]));
                completion(still_image::encode_jpeg(&frame, 80));
            }
            CaptureMode::Return(data) => completion(Ok(data.clone())),
            CaptureMode::Fail(message) => completion(Err(CaptureError::CaptureFailed(message.clone()))),
            CaptureMode::Deferred => self.handle.pending.lock().push_back(completion),
        }
    }
}

pub(crate) struct FakeStore {
    outcome: Result<Option<AssetRef>, CaptureError>,
    saved: Mutex<Vec<Vec<u8>>>,
    contexts: Mutex<Vec<CaptureContext>>,
}

impl FakeStore {
    pub(crate) fn succeeding(asset: Option<AssetRef>) -> Self {
        Self {
            outcome: Ok(asset),
            saved: Mutex::new(Vec::new()),
            contexts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            outcome: Err(CaptureError::PersistenceFailed(message.to_string())),
            saved: Mutex::new(Vec::new()),
            contexts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn saved(&self) -> Vec<Vec<u8>> {
        self.saved.lock().clone()
    }

    pub(crate) fn contexts(&self) -> Vec<CaptureContext> {
        self.contexts.lock().clone()
    }
}

impl PhotoStore for FakeStore {
    fn save(&self, data: &[u8], context: CaptureContext, completion: SaveCallback) {
        self.saved.lock().push(data.to_vec());
        self.contexts.lock().push(context);
        completion(self.outcome.clone());
    }
}

pub(crate) struct FakeSurface {
    bounds: Rect,
    layers: Mutex<Vec<PreviewLayer>>,
}

impl FakeSurface {
    pub(crate) fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            layers: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn layer_ids(&self) -> Vec<Uuid> {
        self.layers.lock().iter().map(|l| l.id).collect()
    }
}

impl PreviewSurface for FakeSurface {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn insert_layer(&self, layer: PreviewLayer) {
        let mut layers = self.layers.lock();
        match layer.placement {
            LayerPlacement::Behind => layers.insert(0, layer),
            LayerPlacement::Front => layers.push(layer),
            LayerPlacement::Index(i) => {
                let index = i.min(layers.len());
                layers.insert(index, layer);
            }
        }
    }

    fn remove_layer(&self, layer_id: Uuid) {
        self.layers.lock().retain(|l| l.id != layer_id);
    }
}

#[derive(Default)]
pub(crate) struct RecordingDelegate {
    states: Mutex<Vec<SessionState>>,
    devices: Mutex<Vec<DevicePosition>>,
}

impl RecordingDelegate {
    pub(crate) fn states(&self) -> Vec<SessionState> {
        self.states.lock().clone()
    }

    pub(crate) fn devices(&self) -> Vec<DevicePosition> {
        self.devices.lock().clone()
    }
}

impl CaptureDelegate for RecordingDelegate {
    fn on_state_changed(&self, state: &SessionState) {
        self.states.lock().push(*state);
    }

    fn on_device_changed(&self, position: DevicePosition) {
        self.devices.lock().push(position);
    }
}
