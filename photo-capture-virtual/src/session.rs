//! Virtual hardware session.
//!
//! Tracks inputs, output, preset and running state exactly like a real
//! capture session would, and answers still captures from a dedicated
//! `virtual-shutter` thread after a configurable shutter delay.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use photo_capture_core::models::camera_models::SessionPreset;
use photo_capture_core::models::config::OutputSettings;
use photo_capture_core::models::error::CaptureError;
use photo_capture_core::processing::orientation::CaptureOrientation;
use photo_capture_core::processing::still_image;
use photo_capture_core::traits::capture_device::CaptureDevice;
use photo_capture_core::traits::session_backend::{SessionBackend, StillImageCallback};

use crate::frames;

const DEFAULT_SHUTTER_DELAY: Duration = Duration::from_millis(5);

struct SensorState {
    input: Option<Arc<dyn CaptureDevice>>,
    output: Option<OutputSettings>,
    preset: SessionPreset,
    running: bool,
    in_transaction: bool,
    commits: usize,
    captures: u64,
    fail_next: Option<String>,
}

/// One capture handed to the shutter thread.
struct Shot {
    device: Arc<dyn CaptureDevice>,
    output: OutputSettings,
    preset: SessionPreset,
    orientation: Option<CaptureOrientation>,
    frame_index: u64,
    failure: Option<String>,
}

/// Software `SessionBackend`.
pub struct VirtualSession {
    state: Arc<Mutex<SensorState>>,
    supported_presets: Option<Vec<SessionPreset>>,
    orientation_supported: bool,
    shutter_delay: Duration,
}

impl VirtualSession {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SensorState {
                input: None,
                output: None,
                preset: SessionPreset::High,
                running: false,
                in_transaction: false,
                commits: 0,
                captures: 0,
                fail_next: None,
            })),
            supported_presets: None,
            orientation_supported: true,
            shutter_delay: DEFAULT_SHUTTER_DELAY,
        }
    }

    /// Restrict the presets this session accepts (default: all).
    pub fn with_supported_presets(mut self, presets: &[SessionPreset]) -> Self {
        self.supported_presets = Some(presets.to_vec());
        self
    }

    /// Output connection without orientation support.
    pub fn without_orientation_support(mut self) -> Self {
        self.orientation_supported = false;
        self
    }

    pub fn with_shutter_delay(mut self, delay: Duration) -> Self {
        self.shutter_delay = delay;
        self
    }

    /// Handle for inspecting and steering the session after it is moved
    /// into a `CaptureSession`.
    pub fn control(&self) -> VirtualSessionControl {
        VirtualSessionControl {
            state: Arc::clone(&self.state),
        }
    }

    fn next_shot(&self, orientation: Option<CaptureOrientation>) -> Result<Shot, CaptureError> {
        let mut state = self.state.lock();
        if !state.running {
            return Err(CaptureError::CaptureFailed("virtual session is not running".into()));
        }
        let device = state
            .input
            .clone()
            .ok_or_else(|| CaptureError::CaptureFailed("no camera input".into()))?;
        let output = state
            .output
            .ok_or_else(|| CaptureError::CaptureFailed("no still image output".into()))?;

        state.captures += 1;
        Ok(Shot {
            device,
            output,
            preset: state.preset,
            orientation,
            frame_index: state.captures,
            failure: state.fail_next.take(),
        })
    }
}

impl Default for VirtualSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBackend for VirtualSession {
    fn begin_configuration(&mut self) {
        let mut state = self.state.lock();
        if state.in_transaction {
            log::warn!("Nested begin_configuration on virtual session");
        }
        state.in_transaction = true;
    }

    fn commit_configuration(&mut self) {
        let mut state = self.state.lock();
        if !state.in_transaction {
            log::warn!("commit_configuration without begin on virtual session");
        }
        state.in_transaction = false;
        state.commits += 1;
    }

    fn can_set_preset(&self, preset: SessionPreset) -> bool {
        self.supported_presets
            .as_ref()
            .map(|presets| presets.contains(&preset))
            .unwrap_or(true)
    }

    fn set_preset(&mut self, preset: SessionPreset) {
        self.state.lock().preset = preset;
    }

    fn can_add_input(&self, _device: &dyn CaptureDevice) -> bool {
        self.state.lock().input.is_none()
    }

    fn add_input(&mut self, device: Arc<dyn CaptureDevice>) -> Result<(), CaptureError> {
        let mut state = self.state.lock();
        if let Some(existing) = &state.input {
            return Err(CaptureError::ConfigurationRejected(format!(
                "input '{}' already bound",
                existing.id()
            )));
        }
        log::debug!("Virtual session input → '{}'", device.id());
        state.input = Some(device);
        Ok(())
    }

    fn remove_input(&mut self, device_id: &str) {
        let mut state = self.state.lock();
        if state.input.as_ref().is_some_and(|d| d.id() == device_id) {
            state.input = None;
        }
    }

    fn can_add_output(&self, _settings: &OutputSettings) -> bool {
        self.state.lock().output.is_none()
    }

    fn add_output(&mut self, settings: OutputSettings) {
        self.state.lock().output = Some(settings);
    }

    fn remove_output(&mut self) {
        self.state.lock().output = None;
    }

    fn start_running(&mut self) {
        self.state.lock().running = true;
    }

    fn stop_running(&mut self) {
        self.state.lock().running = false;
    }

    fn supports_orientation(&self) -> bool {
        self.orientation_supported
    }

    fn capture_still(&mut self, orientation: Option<CaptureOrientation>, completion: StillImageCallback) {
        let shot = match self.next_shot(orientation) {
            Ok(shot) => shot,
            Err(e) => {
                completion(Err(e));
                return;
            }
        };

        // Shared with the spawn error path; whoever takes it answers.
        let slot = Arc::new(Mutex::new(Some(completion)));
        let pending = Arc::clone(&slot);
        let delay = self.shutter_delay;

        let spawned = thread::Builder::new()
            .name("virtual-shutter".into())
            .spawn(move || {
                thread::sleep(delay);
                let result = expose(&shot);
                let completion = pending.lock().take();
                if let Some(completion) = completion {
                    completion(result);
                }
            });

        if let Err(e) = spawned {
            let completion = slot.lock().take();
            if let Some(completion) = completion {
                completion(Err(CaptureError::CaptureFailed(format!("failed to spawn shutter thread: {}", e))));
            }
        }
    }
}

fn expose(shot: &Shot) -> Result<Vec<u8>, CaptureError> {
    if let Some(message) = &shot.failure {
        return Err(CaptureError::CaptureFailed(message.clone()));
    }
    let (width, height) = frames::frame_dimensions(shot.preset, shot.orientation);
    let lit = shot.device.has_flash() && shot.device.flash_mode().is_lit();
    let frame = frames::render_gradient(width, height, shot.frame_index, lit);
    still_image::encode_jpeg(&frame, shot.output.quality)
}

/// Inspection and failure injection for a `VirtualSession`.
#[derive(Clone)]
pub struct VirtualSessionControl {
    state: Arc<Mutex<SensorState>>,
}

impl VirtualSessionControl {
    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    pub fn input_id(&self) -> Option<String> {
        self.state.lock().input.as_ref().map(|d| d.id().to_string())
    }

    pub fn has_output(&self) -> bool {
        self.state.lock().output.is_some()
    }

    pub fn preset(&self) -> SessionPreset {
        self.state.lock().preset
    }

    /// Committed configuration transactions so far.
    pub fn commits(&self) -> usize {
        self.state.lock().commits
    }

    /// Still captures accepted by the sensor so far.
    pub fn captures(&self) -> u64 {
        self.state.lock().captures
    }

    pub fn is_configuring(&self) -> bool {
        self.state.lock().in_transaction
    }

    /// Make the next accepted capture fail with `message`.
    pub fn fail_next_capture(&self, message: &str) {
        self.state.lock().fail_next = Some(message.to_string());
    }
}
