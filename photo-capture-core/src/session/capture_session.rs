use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::camera_models::{
    CameraInfo, DevicePosition, DeviceSelector, FlashMode, SessionPreset, SessionSnapshot,
};
use crate::models::config::CameraConfiguration;
use crate::models::error::CaptureError;
use crate::models::state::{RequestState, SessionState};
use crate::session::continuation::Completion;
use crate::session::delivery::CallbackQueue;
use crate::session::device_registry::DeviceRegistry;
use crate::session::flash;
use crate::session::hardware::HardwareContext;
use crate::session::pipeline::CaptureRequest;
use crate::session::preview::AttachedPreview;
use crate::session::queue::SessionQueue;
use crate::traits::camera_platform::{AuthorizationStatus, CameraPlatform};
use crate::traits::capture_delegate::{CaptureDelegate, ErrorCallback};
use crate::traits::capture_device::CaptureDevice;
use crate::traits::photo_store::PhotoStore;
use crate::traits::session_backend::SessionBackend;

/// Session state shared between callers, the queue and hardware completions.
pub(crate) struct SharedState {
    pub(crate) state: SessionState,
    /// Camera bound by the last start or switch; kept across stops.
    pub(crate) device: Option<Arc<dyn CaptureDevice>>,
    /// Selector and preset reused by implicit starts.
    pub(crate) selector: DeviceSelector,
    pub(crate) preset: SessionPreset,
    pub(crate) snapshot: SessionSnapshot,
    pub(crate) preview: Option<AttachedPreview>,
    pub(crate) in_flight: Option<Arc<CaptureRequest>>,
}

pub(crate) struct SessionInner {
    pub(crate) id: Uuid,
    pub(crate) config: CameraConfiguration,
    pub(crate) platform: Arc<dyn CameraPlatform>,
    pub(crate) store: Arc<dyn PhotoStore>,
    pub(crate) registry: Mutex<DeviceRegistry>,
    pub(crate) queue: SessionQueue,
    queue_thread: ThreadId,
    callbacks: CallbackQueue,
    pub(crate) shared: Mutex<SharedState>,
    error_callback: Mutex<Option<ErrorCallback>>,
    delegate: Mutex<Option<Arc<dyn CaptureDelegate>>>,
}

/// Camera capture session.
///
/// Owns one hardware session through a serial queue and exposes the
/// start/stop/switch state machine, flash control, preview attachment and
/// the asynchronous capture pipeline (see `pipeline.rs`).
///
/// Caller callbacks (capture continuations, the error callback, delegate
/// notifications) never run on the session queue thread, so they may call
/// back into the session and wait on the result.
///
/// ```text
/// [Host UI] → start/stop/switch ─┐
///                                ├→ [camera-session queue] → [SessionBackend]
/// [Host UI] → capture* ──────────┘            ↓ completion
///                                  [continuation] → [PhotoStore] → caller
/// ```
pub struct CaptureSession {
    pub(crate) inner: Arc<SessionInner>,
    worker: Option<thread::JoinHandle<()>>,
    callback_worker: Option<thread::JoinHandle<()>>,
}

impl CaptureSession {
    /// Create a session over the given platform, hardware backend and store.
    ///
    /// No hardware is configured until the first `start` or `capture`.
    pub fn new<B>(
        platform: Arc<dyn CameraPlatform>,
        backend: B,
        store: Arc<dyn PhotoStore>,
        config: CameraConfiguration,
    ) -> Result<Self, CaptureError>
    where
        B: SessionBackend + 'static,
    {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;

        let (callbacks, callback_worker) = CallbackQueue::spawn()?;
        let (queue, worker) = match SessionQueue::spawn(Box::new(backend)) {
            Ok(spawned) => spawned,
            Err(e) => {
                callbacks.close();
                return Err(e);
            }
        };

        let shared = SharedState {
            state: SessionState::Idle,
            device: None,
            selector: config.device,
            preset: config.preset,
            snapshot: SessionSnapshot::default(),
            preview: None,
            in_flight: None,
        };

        let inner = Arc::new(SessionInner {
            id: Uuid::new_v4(),
            registry: Mutex::new(DeviceRegistry::new(Arc::clone(&platform))),
            config,
            platform,
            store,
            queue_thread: worker.thread().id(),
            queue,
            callbacks,
            shared: Mutex::new(shared),
            error_callback: Mutex::new(None),
            delegate: Mutex::new(None),
        });

        Ok(Self {
            inner,
            worker: Some(worker),
            callback_worker: Some(callback_worker),
        })
    }

    /// Identifier of this session; preview layers carry it.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn config(&self) -> &CameraConfiguration {
        &self.inner.config
    }

    pub fn set_delegate(&self, delegate: Arc<dyn CaptureDelegate>) {
        *self.inner.delegate.lock() = Some(delegate);
    }

    /// Register the sink for asynchronous failures. Replaces any previous one.
    pub fn register_error_callback<F>(&self, callback: F)
    where
        F: Fn(&CaptureError) + Send + Sync + 'static,
    {
        let previous = self.inner.error_callback.lock().replace(Arc::new(callback));
        if previous.is_some() {
            log::warn!("Replacing previously registered error callback");
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.shared.lock().state
    }

    /// Last committed view of the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.shared.lock().snapshot.clone()
    }

    /// The camera the session is (or will be) bound to.
    pub fn selected_device(&self) -> Option<CameraInfo> {
        self.inner.shared.lock().device.as_ref().map(|d| d.info())
    }

    pub fn available_devices(&self) -> Vec<CameraInfo> {
        self.inner.registry.lock().available()
    }

    /// Re-enumerate cameras. Returns the number of devices found.
    pub fn refresh_devices(&self) -> usize {
        self.inner.registry.lock().refresh()
    }

    /// Configure and start streaming from the camera matching `selector`.
    ///
    /// No-op when already running. Resolves with the resulting state:
    /// `Running`, or `Idle` if access was denied or no camera could be bound.
    pub fn start(&self, selector: DeviceSelector, preset: SessionPreset) -> Completion<SessionState> {
        let (done, completion) = Completion::pair();
        let inner = Arc::clone(&self.inner);
        self.inner.submit_logged("start", move |hw| {
            let state = inner.run_start(hw, selector, preset);
            let _ = done.resolve(state);
        });
        completion
    }

    /// Start with the configured selector and preset.
    pub fn start_default(&self) -> Completion<SessionState> {
        self.start(self.inner.config.device, self.inner.config.preset)
    }

    /// Stop streaming and release inputs, outputs and the preview.
    pub fn stop(&self) -> Completion<()> {
        let (done, completion) = Completion::pair();
        let inner = Arc::clone(&self.inner);
        self.inner.submit_logged("stop", move |hw| {
            inner.run_stop(hw);
            let _ = done.resolve(());
        });
        completion
    }

    /// Toggle between the front and rear camera.
    ///
    /// Resolves with the position of the selected camera afterwards, or
    /// `None` when no camera has been selected yet.
    pub fn switch_camera(&self) -> Completion<Option<DevicePosition>> {
        let (done, completion) = Completion::pair();
        let inner = Arc::clone(&self.inner);
        self.inner.submit_logged("switch camera", move |hw| {
            let position = inner.run_switch(hw);
            let _ = done.resolve(position);
        });
        completion
    }

    /// Set the flash mode of the selected camera.
    ///
    /// Returns the applied mode, or `None` when nothing changed (no camera,
    /// no flash, unsupported mode, or the device lock was unavailable).
    pub fn set_flash(&self, mode: FlashMode) -> Option<FlashMode> {
        let device = self.inner.selected()?;
        match flash::set_flash_mode(device.as_ref(), mode) {
            Ok(true) => Some(mode),
            Ok(false) => None,
            Err(e) => {
                self.inner.report_error(&e);
                None
            }
        }
    }

    /// Flip the selected camera's flash between off and on.
    pub fn toggle_flash(&self) -> Option<FlashMode> {
        let device = self.inner.selected()?;
        match flash::toggle_flash_mode(device.as_ref()) {
            Ok(mode) => mode,
            Err(e) => {
                self.inner.report_error(&e);
                None
            }
        }
    }

    /// Current flash mode of the selected camera.
    pub fn flash_mode(&self) -> Option<FlashMode> {
        self.inner.selected().map(|d| d.flash_mode())
    }
}

#[cfg(test)]
impl CaptureSession {
    /// Block until every job queued so far has run and every callback it
    /// raised has been delivered.
    pub(crate) fn flush(&self) {
        let (done, completion) = Completion::pair();
        let inner = Arc::clone(&self.inner);
        self.inner.submit_logged("flush", move |_hw| {
            inner.deliver(move || {
                let _ = done.resolve(());
            });
        });
        let _ = completion.wait();
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        let inner = Arc::clone(&self.inner);
        let _ = self.inner.queue.submit(move |hw| inner.run_stop(hw));
        self.inner.queue.close();
        join_unless_current(self.worker.take());

        self.inner.callbacks.close();
        join_unless_current(self.callback_worker.take());
    }
}

fn join_unless_current(handle: Option<thread::JoinHandle<()>>) {
    if let Some(handle) = handle {
        if handle.thread().id() != thread::current().id() {
            let _ = handle.join();
        }
    }
}

impl SessionInner {
    pub(crate) fn weak(self: &Arc<Self>) -> Weak<Self> {
        Arc::downgrade(self)
    }

    fn selected(&self) -> Option<Arc<dyn CaptureDevice>> {
        let device = self.shared.lock().device.clone();
        if device.is_none() {
            log::debug!("No camera selected");
        }
        device
    }

    fn submit_logged<F>(&self, what: &str, job: F)
    where
        F: FnOnce(&mut HardwareContext) + Send + 'static,
    {
        if let Err(e) = self.queue.submit(job) {
            log::warn!("Cannot {}: {}", what, e);
        }
    }

    /// Run a caller callback, moving it off the session queue thread.
    pub(crate) fn deliver<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if thread::current().id() == self.queue_thread {
            self.callbacks.dispatch(callback);
        } else {
            callback();
        }
    }

    /// Deliver an asynchronous failure to the registered callback.
    pub(crate) fn report_error(&self, error: &CaptureError) {
        let callback = self.error_callback.lock().clone();
        match callback {
            Some(callback) => {
                let error = error.clone();
                self.deliver(move || callback(&error));
            }
            None if error.is_recoverable() => {
                log::warn!("Camera session error with no callback registered: {}", error)
            }
            None => log::error!("Camera session error with no callback registered: {}", error),
        }
    }

    /// Set the state and publish a snapshot of the committed hardware configuration.
    fn transition(&self, hw: &HardwareContext, state: SessionState) {
        {
            let mut shared = self.shared.lock();
            shared.state = state;
            shared.snapshot = SessionSnapshot {
                state,
                device_id: hw.input.as_ref().map(|d| d.id().to_string()),
                device_position: hw.input.as_ref().map(|d| d.position()),
                preset: hw.preset,
                input_count: hw.input_count(),
                output_count: hw.output_count(),
                preview_attached: shared.preview.is_some(),
            };
        }
        log::debug!("Camera session state → {:?}", state);

        let delegate = self.delegate.lock().clone();
        if let Some(delegate) = delegate {
            self.deliver(move || delegate.on_state_changed(&state));
        }
    }

    fn notify_device_changed(&self, position: DevicePosition) {
        let delegate = self.delegate.lock().clone();
        if let Some(delegate) = delegate {
            self.deliver(move || delegate.on_device_changed(position));
        }
    }

    fn authorize(&self) -> bool {
        match self.platform.authorization_status() {
            AuthorizationStatus::Authorized => true,
            AuthorizationStatus::NotDetermined if self.config.request_authorization => {
                log::info!("Requesting camera access");
                self.platform.request_access()
            }
            status => {
                log::warn!("Camera access not granted: {:?}", status);
                false
            }
        }
    }

    /// Idle → Configuring → Running. Runs on the session queue.
    pub(crate) fn run_start(&self, hw: &mut HardwareContext, selector: DeviceSelector, preset: SessionPreset) -> SessionState {
        {
            let mut shared = self.shared.lock();
            if shared.state.is_running() {
                log::debug!("Camera session already running");
                return SessionState::Running;
            }
            shared.selector = selector;
            shared.preset = preset;
        }

        if !self.authorize() {
            self.transition(hw, SessionState::Idle);
            self.report_error(&CaptureError::AuthorizationDenied);
            return SessionState::Idle;
        }

        self.transition(hw, SessionState::Configuring);
        hw.backend.begin_configuration();

        let previous = self.shared.lock().device.clone();
        let device = match self.registry.lock().resolve(selector) {
            Ok(device) => Some(device),
            Err(e) => {
                log::warn!("{}; keeping previously selected camera", e);
                previous.clone()
            }
        };
        if let Some(device) = device {
            if let Err(e) = hw.replace_input(device) {
                log::warn!("Could not bind camera input: {}", e);
            }
        }
        hw.ensure_output(self.config.output);
        hw.apply_preset(preset);
        hw.backend.commit_configuration();

        if !hw.is_configured() {
            log::warn!("Camera session could not be configured, aborting start");
            hw.teardown();
            self.transition(hw, SessionState::Idle);
            return SessionState::Idle;
        }

        hw.start_running();
        let bound = hw.input.clone();
        self.shared.lock().device = bound.clone();
        self.transition(hw, SessionState::Running);

        if let Some(bound) = bound {
            let changed = previous.map(|p| p.id() != bound.id()).unwrap_or(true);
            log::info!("Camera session running on '{}' ({:?})", bound.id(), bound.position());
            if changed {
                self.notify_device_changed(bound.position());
            }
        }
        SessionState::Running
    }

    /// Running/Configuring → Stopping → Idle. Runs on the session queue.
    pub(crate) fn run_stop(&self, hw: &mut HardwareContext) {
        let stoppable = self.shared.lock().state.is_stoppable();
        if stoppable {
            self.transition(hw, SessionState::Stopping);
        }

        hw.teardown();
        self.detach_preview_layer();

        // Requests already handed to the hardware cannot complete any more.
        // Requests still queued behind this stop restart the session.
        let orphan = {
            let mut shared = self.shared.lock();
            let issued = shared
                .in_flight
                .as_ref()
                .map(|r| r.state() == RequestState::AwaitingHardware)
                .unwrap_or(false);
            if issued {
                shared.in_flight.take()
            } else {
                None
            }
        };
        if let Some(request) = orphan {
            self.fail_request(&request, CaptureError::SessionStopped);
        }

        self.transition(hw, SessionState::Idle);
        if stoppable {
            log::info!("Camera session stopped");
        }
    }

    /// Swap front ↔ rear. Runs on the session queue.
    pub(crate) fn run_switch(&self, hw: &mut HardwareContext) -> Option<DevicePosition> {
        let (current, state) = {
            let shared = self.shared.lock();
            (shared.device.clone(), shared.state)
        };
        let current = current?;
        let target = DeviceSelector::opposite_of(current.position());

        let next = match self.registry.lock().resolve(target) {
            Ok(device) => device,
            Err(e) => {
                log::warn!("Cannot switch camera: {}", e);
                return Some(current.position());
            }
        };

        if state.is_running() {
            hw.backend.begin_configuration();
            let result = hw.replace_input(Arc::clone(&next));
            hw.backend.commit_configuration();
            if let Err(e) = result {
                log::warn!("Cannot switch camera: {}", e);
                return Some(current.position());
            }
        }

        {
            let mut shared = self.shared.lock();
            shared.device = Some(Arc::clone(&next));
            shared.selector = target;
        }
        self.transition(hw, state);
        log::info!("Switched camera to '{}' ({:?})", next.id(), next.position());
        self.notify_device_changed(next.position());
        Some(next.position())
    }
}
