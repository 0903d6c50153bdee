use std::sync::{Arc, Weak};

use image::DynamicImage;
use parking_lot::Mutex;

use crate::models::asset::{AssetRef, CaptureContext};
use crate::models::camera_models::DevicePosition;
use crate::models::error::CaptureError;
use crate::models::state::RequestState;
use crate::processing::orientation::CaptureOrientation;
use crate::processing::still_image;
use crate::session::capture_session::{CaptureSession, SessionInner};
use crate::session::continuation::Continuation;
use crate::session::hardware::HardwareContext;

/// Encoded still delivered by the hardware, with the context it was shot in.
pub(crate) struct CapturedStill {
    pub(crate) data: Vec<u8>,
    pub(crate) context: CaptureContext,
}

/// One in-flight still capture.
///
/// The orientation is sampled when the caller asks, not when the hardware
/// answers. Settles exactly once; a late hardware completion after a stop
/// has already failed the request is dropped.
pub(crate) struct CaptureRequest {
    orientation: CaptureOrientation,
    state: Mutex<RequestState>,
    position: Mutex<Option<DevicePosition>>,
    continuation: Continuation<CapturedStill>,
}

impl CaptureRequest {
    fn new(orientation: CaptureOrientation, continuation: Continuation<CapturedStill>) -> Self {
        Self {
            orientation,
            state: Mutex::new(RequestState::Requested),
            position: Mutex::new(None),
            continuation,
        }
    }

    pub(crate) fn state(&self) -> RequestState {
        self.state.lock().clone()
    }

    fn mark_awaiting(&self, position: Option<DevicePosition>) {
        *self.position.lock() = position;
        *self.state.lock() = RequestState::AwaitingHardware;
    }

    /// Move to the terminal state for `outcome`. False if already settled.
    fn settle(&self, outcome: &Result<Vec<u8>, CaptureError>) -> bool {
        let mut state = self.state.lock();
        if state.is_settled() {
            return false;
        }
        *state = match outcome {
            Ok(_) => RequestState::Decoded,
            Err(e) => RequestState::Failed(e.clone()),
        };
        true
    }

    fn context(&self) -> CaptureContext {
        CaptureContext {
            orientation: self.orientation,
            device_position: *self.position.lock(),
        }
    }
}

impl CaptureSession {
    /// Capture a still and hand its encoded bytes to `on_captured`.
    ///
    /// Starts the session first if it is not running; the hardware request
    /// is only issued once streaming. Hardware failures go to the error
    /// callback and `on_captured` is not called. Fails immediately with
    /// `CaptureInProgress` while another capture is pending.
    pub fn capture<F>(&self, on_captured: F) -> Result<(), CaptureError>
    where
        F: FnOnce(Vec<u8>) + Send + 'static,
    {
        self.submit_capture(Continuation::new(move |still: CapturedStill| on_captured(still.data)))
    }

    /// Capture a still and decode it before calling `on_captured`.
    ///
    /// Decode failures go to the error callback.
    pub fn capture_image<F>(&self, on_captured: F) -> Result<(), CaptureError>
    where
        F: FnOnce(DynamicImage) + Send + 'static,
    {
        let session = self.inner.weak();
        self.submit_capture(Continuation::new(move |still: CapturedStill| {
            match still_image::decode_still(&still.data) {
                Ok(image) => on_captured(image),
                Err(e) => report(&session, &e),
            }
        }))
    }

    /// Capture a still, save it to the photo store, then call `on_saved`
    /// with the bytes and the store's reference.
    ///
    /// `on_saved` runs only after the save completes; save failures go to
    /// the error callback instead.
    pub fn capture_and_save<F>(&self, on_saved: F) -> Result<(), CaptureError>
    where
        F: FnOnce(Vec<u8>, Option<AssetRef>) + Send + 'static,
    {
        let session = self.inner.weak();
        self.submit_capture(Continuation::new(move |still: CapturedStill| {
            let Some(inner) = session.upgrade() else {
                log::debug!("Session dropped before saving capture");
                return;
            };
            let done = Continuation::new(move |(data, asset): (Vec<u8>, Option<AssetRef>)| on_saved(data, asset));
            inner.save(still, done);
        }))
    }

    /// Capture, decode and save; `on_saved` receives the decoded image and
    /// the store's reference once the save completes.
    pub fn capture_image_and_save<F>(&self, on_saved: F) -> Result<(), CaptureError>
    where
        F: FnOnce(DynamicImage, Option<AssetRef>) + Send + 'static,
    {
        let session = self.inner.weak();
        self.submit_capture(Continuation::new(move |still: CapturedStill| {
            let Some(inner) = session.upgrade() else {
                log::debug!("Session dropped before saving capture");
                return;
            };
            let image = match still_image::decode_still(&still.data) {
                Ok(image) => image,
                Err(e) => {
                    inner.report_error(&e);
                    return;
                }
            };
            let done = Continuation::new(move |(_, asset): (Vec<u8>, Option<AssetRef>)| on_saved(image, asset));
            inner.save(still, done);
        }))
    }

    /// Whether a capture is queued or awaiting the hardware.
    pub fn is_capturing(&self) -> bool {
        self.inner.shared.lock().in_flight.is_some()
    }

    fn submit_capture(&self, continuation: Continuation<CapturedStill>) -> Result<(), CaptureError> {
        let orientation = CaptureOrientation::from_device(self.inner.platform.device_orientation());
        let request = Arc::new(CaptureRequest::new(orientation, continuation));

        {
            let mut shared = self.inner.shared.lock();
            if shared.in_flight.is_some() {
                return Err(CaptureError::CaptureInProgress);
            }
            shared.in_flight = Some(Arc::clone(&request));
        }

        let inner = Arc::clone(&self.inner);
        let queued = Arc::clone(&request);
        if let Err(e) = self.inner.queue.submit(move |hw| inner.run_capture(hw, queued)) {
            self.inner.release_request(&request);
            return Err(e);
        }
        Ok(())
    }
}

fn report(session: &Weak<SessionInner>, error: &CaptureError) {
    match session.upgrade() {
        Some(inner) => inner.report_error(error),
        None => log::warn!("Capture error after session was dropped: {}", error),
    }
}

impl SessionInner {
    /// Issue a queued capture. Runs on the session queue.
    pub(crate) fn run_capture(self: &Arc<Self>, hw: &mut HardwareContext, request: Arc<CaptureRequest>) {
        if request.state().is_settled() {
            return;
        }

        if !self.shared.lock().state.is_running() {
            let (selector, preset) = {
                let shared = self.shared.lock();
                (shared.selector, shared.preset)
            };
            log::info!("Starting camera session before capture");
            if !self.run_start(hw, selector, preset).is_running() {
                self.fail_request(&request, CaptureError::SessionNotRunning);
                return;
            }
        }

        request.mark_awaiting(hw.input.as_ref().map(|d| d.position()));
        let orientation = if hw.backend.supports_orientation() {
            Some(request.orientation)
        } else {
            None
        };

        let session = self.weak();
        let pending = Arc::clone(&request);
        hw.backend.capture_still(
            orientation,
            Box::new(move |result| match session.upgrade() {
                Some(inner) => inner.finish_request(&pending, result),
                None => log::debug!("Capture completed after session was dropped"),
            }),
        );
    }

    /// Hardware completion for `request`. May run on any thread.
    pub(crate) fn finish_request(&self, request: &Arc<CaptureRequest>, result: Result<Vec<u8>, CaptureError>) {
        let outcome = match result {
            Ok(data) if data.is_empty() => Err(CaptureError::CaptureFailed("hardware returned an empty image".into())),
            Ok(data) => Ok(data),
            Err(e @ CaptureError::CaptureFailed(_)) => Err(e),
            Err(e) => Err(CaptureError::CaptureFailed(e.to_string())),
        };

        if !request.settle(&outcome) {
            log::debug!("Dropping completion for an already settled capture");
            return;
        }
        self.release_request(request);

        match outcome {
            Ok(data) => {
                let still = CapturedStill {
                    data,
                    context: request.context(),
                };
                let request = Arc::clone(request);
                self.deliver(move || {
                    if let Err(e) = request.continuation.resolve(still) {
                        log::warn!("Capture continuation not delivered: {}", e);
                    }
                });
            }
            Err(e) => self.report_error(&e),
        }
    }

    /// Settle `request` as failed and report `error`.
    pub(crate) fn fail_request(&self, request: &Arc<CaptureRequest>, error: CaptureError) {
        if !request.settle(&Err(error.clone())) {
            return;
        }
        self.release_request(request);
        self.report_error(&error);
    }

    pub(crate) fn release_request(&self, request: &Arc<CaptureRequest>) {
        let mut shared = self.shared.lock();
        if shared.in_flight.as_ref().is_some_and(|r| Arc::ptr_eq(r, request)) {
            shared.in_flight = None;
        }
    }

    /// Persist `still` on the session queue, then resolve `done`.
    fn save(self: &Arc<Self>, still: CapturedStill, done: Continuation<(Vec<u8>, Option<AssetRef>)>) {
        let session = self.weak();
        let submitted = self.queue.submit(move |_hw| {
            let Some(inner) = session.upgrade() else {
                return;
            };
            let store = Arc::clone(&inner.store);
            let CapturedStill { data, context } = still;
            let bytes = data.clone();
            store.save(
                &bytes,
                context,
                Box::new(move |result| match result {
                    Ok(asset) => inner.deliver(move || {
                        if let Err(e) = done.resolve((data, asset)) {
                            log::warn!("Save continuation not delivered: {}", e);
                        }
                    }),
                    Err(e) => {
                        let error = match e {
                            CaptureError::PersistenceFailed(_) => e,
                            other => CaptureError::PersistenceFailed(other.to_string()),
                        };
                        inner.report_error(&error);
                    }
                }),
            );
        });
        if let Err(e) = submitted {
            self.report_error(&e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    use crate::models::camera_models::{DeviceSelector, SessionPreset};
    use crate::models::config::CameraConfiguration;
    use crate::models::state::SessionState;
    use crate::processing::orientation::DeviceOrientation;
    use crate::testing::{CallLog, CaptureMode, FakeBackend, FakeDevice, FakePlatform, FakeStore};
    use crate::traits::camera_platform::AuthorizationStatus;

    const WAIT: Duration = Duration::from_secs(5);

    struct Fixture {
        session: CaptureSession,
        log: CallLog,
        backend_handle: crate::testing::BackendHandle,
        platform: Arc<FakePlatform>,
        store: Arc<FakeStore>,
        errors: Arc<parking_lot::Mutex<Vec<CaptureError>>>,
    }

    fn fixture(mode: CaptureMode, store: FakeStore) -> Fixture {
        let log = CallLog::default();
        let backend = FakeBackend::new(log.clone()).with_capture_mode(mode);
        let backend_handle = backend.handle();
        let platform = Arc::new(FakePlatform::new(vec![
            FakeDevice::new("rear", DevicePosition::Rear),
            FakeDevice::new("front", DevicePosition::Front),
        ]));
        let store = Arc::new(store);
        let session = CaptureSession::new(platform.clone(), backend, store.clone(), CameraConfiguration::default())
            .unwrap();
        let errors = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&errors);
        session.register_error_callback(move |e| sink.lock().push(e.clone()));
        Fixture {
            session,
            log,
            backend_handle,
            platform,
            store,
            errors,
        }
    }

    /// Wait until all queued work, including chained saves, has run.
    fn drain(session: &CaptureSession) {
        for _ in 0..3 {
            session.flush();
        }
    }

    #[test]
    fn capture_while_idle_starts_session_first() {
        let f = fixture(CaptureMode::Immediate, FakeStore::succeeding(None));
        let (tx, rx) = mpsc::channel();

        f.session.capture(move |data| tx.send(data).unwrap()).unwrap();

        let data = rx.recv_timeout(WAIT).unwrap();
        assert!(!data.is_empty());
        let entries = f.log.entries();
        let started = entries.iter().position(|e| e == "start_running").unwrap();
        let captured = entries.iter().position(|e| e.starts_with("capture_still")).unwrap();
        assert!(started < captured);
        assert_eq!(f.session.state(), SessionState::Running);
    }

    #[test]
    fn orientation_is_sampled_at_request_time() {
        let f = fixture(CaptureMode::Immediate, FakeStore::succeeding(None));
        f.platform.set_orientation(DeviceOrientation::LandscapeLeft);
        let (tx, rx) = mpsc::channel();

        f.session.capture(move |data| tx.send(data).unwrap()).unwrap();
        f.platform.set_orientation(DeviceOrientation::Portrait);
        rx.recv_timeout(WAIT).unwrap();

        assert!(f.log.entries().contains(&"capture_still:LandscapeRight".to_string()));
    }

    #[test]
    fn orientation_tag_omitted_when_unsupported() {
        let log = CallLog::default();
        let backend = FakeBackend::new(log.clone()).without_orientation_support();
        let platform = Arc::new(FakePlatform::new(vec![FakeDevice::new("rear", DevicePosition::Rear)]));
        let session = CaptureSession::new(
            platform,
            backend,
            Arc::new(FakeStore::succeeding(None)),
            CameraConfiguration::default(),
        )
        .unwrap();
        let (tx, rx) = mpsc::channel();

        session.capture(move |data| tx.send(data).unwrap()).unwrap();
        rx.recv_timeout(WAIT).unwrap();

        assert!(log.entries().contains(&"capture_still:none".to_string()));
    }

    #[test]
    fn hardware_failure_goes_to_error_callback_only() {
        let f = fixture(CaptureMode::Fail("sensor overheated".into()), FakeStore::succeeding(None));
        let (tx, rx) = mpsc::channel::<Vec<u8>>();

        f.session.capture(move |data| tx.send(data).unwrap()).unwrap();
        drain(&f.session);

        assert!(rx.try_recv().is_err());
        assert_eq!(
            *f.errors.lock(),
            vec![CaptureError::CaptureFailed("sensor overheated".into())]
        );
        assert!(!f.session.is_capturing());
    }

    #[test]
    fn empty_payload_is_a_capture_failure() {
        let f = fixture(CaptureMode::Return(Vec::new()), FakeStore::succeeding(None));
        f.session.capture(|_| panic!("empty capture must not be delivered")).unwrap();
        drain(&f.session);

        let errors = f.errors.lock();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], CaptureError::CaptureFailed(_)));
    }

    #[test]
    fn second_capture_while_pending_is_rejected() {
        let f = fixture(CaptureMode::Deferred, FakeStore::succeeding(None));
        let (tx, rx) = mpsc::channel();

        f.session.capture(move |data| tx.send(data).unwrap()).unwrap();
        assert_eq!(f.session.capture(|_| {}), Err(CaptureError::CaptureInProgress));

        drain(&f.session);
        assert!(f.backend_handle.complete_next(Ok(vec![1, 2, 3])));
        assert_eq!(rx.recv_timeout(WAIT).unwrap(), vec![1, 2, 3]);

        // The slot frees up once the first capture settles.
        assert!(f.session.capture(|_| {}).is_ok());
    }

    #[test]
    fn stop_fails_in_flight_capture() {
        let f = fixture(CaptureMode::Deferred, FakeStore::succeeding(None));
        let (tx, rx) = mpsc::channel::<Vec<u8>>();

        f.session.capture(move |data| tx.send(data).unwrap()).unwrap();
        drain(&f.session);
        f.session.stop().wait().unwrap();
        f.session.flush();

        assert_eq!(*f.errors.lock(), vec![CaptureError::SessionStopped]);
        assert!(!f.session.is_capturing());

        // The late hardware answer is dropped.
        assert!(f.backend_handle.complete_next(Ok(vec![9])));
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        assert_eq!(f.errors.lock().len(), 1);
    }

    #[test]
    fn capture_after_stop_restarts_session() {
        let f = fixture(CaptureMode::Immediate, FakeStore::succeeding(None));
        f.session.start(DeviceSelector::Front, SessionPreset::Medium).wait().unwrap();
        f.session.stop().wait().unwrap();
        f.log.clear();
        let (tx, rx) = mpsc::channel();

        f.session.capture(move |data| tx.send(data).unwrap()).unwrap();

        assert!(!rx.recv_timeout(WAIT).unwrap().is_empty());
        let entries = f.log.entries();
        assert_eq!(entries.first().map(String::as_str), Some("begin_configuration"));
        assert!(entries.contains(&"add_input:front".to_string()));
        assert!(f.errors.lock().is_empty());
    }

    #[test]
    fn capture_without_access_reports_and_skips_hardware() {
        let log = CallLog::default();
        let platform = Arc::new(
            FakePlatform::new(vec![FakeDevice::new("rear", DevicePosition::Rear)])
                .with_authorization(AuthorizationStatus::Denied),
        );
        let session = CaptureSession::new(
            platform,
            FakeBackend::new(log.clone()),
            Arc::new(FakeStore::succeeding(None)),
            CameraConfiguration::default(),
        )
        .unwrap();
        let errors = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&errors);
        session.register_error_callback(move |e| sink.lock().push(e.clone()));

        session.capture(|_| panic!("no capture without access")).unwrap();
        drain(&session);

        assert!(!log.entries().iter().any(|e| e.starts_with("capture_still")));
        assert_eq!(
            *errors.lock(),
            vec![CaptureError::AuthorizationDenied, CaptureError::SessionNotRunning]
        );
    }

    #[test]
    fn capture_and_save_delivers_bytes_and_missing_reference() {
        let f = fixture(CaptureMode::Immediate, FakeStore::succeeding(None));
        let (tx, rx) = mpsc::channel();

        f.session.capture_and_save(move |data, asset| tx.send((data, asset)).unwrap()).unwrap();

        let (data, asset) = rx.recv_timeout(WAIT).unwrap();
        assert!(!data.is_empty());
        assert_eq!(asset, None);
        assert_eq!(f.store.saved(), vec![data]);
    }

    #[test]
    fn failed_save_reports_once_and_skips_continuation() {
        let f = fixture(CaptureMode::Immediate, FakeStore::failing("library full"));
        let (tx, rx) = mpsc::channel::<(Vec<u8>, Option<AssetRef>)>();

        f.session.capture_and_save(move |data, asset| tx.send((data, asset)).unwrap()).unwrap();
        drain(&f.session);

        assert!(rx.try_recv().is_err());
        assert_eq!(
            *f.errors.lock(),
            vec![CaptureError::PersistenceFailed("library full".into())]
        );
    }

    #[test]
    fn save_continuation_can_stop_and_wait() {
        let f = fixture(CaptureMode::Immediate, FakeStore::succeeding(None));
        let session = Arc::new(f.session);
        let handle = Arc::clone(&session);
        let (tx, rx) = mpsc::channel();

        session
            .capture_and_save(move |_, _| tx.send(handle.stop().wait()).unwrap())
            .unwrap();

        assert_eq!(rx.recv_timeout(WAIT).unwrap(), Ok(()));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn capture_continuation_can_restart_and_wait() {
        let f = fixture(CaptureMode::Immediate, FakeStore::succeeding(None));
        let session = Arc::new(f.session);
        let handle = Arc::clone(&session);
        let (tx, rx) = mpsc::channel();

        session
            .capture(move |_| {
                let stopped = handle.stop().wait();
                let started = handle.start(DeviceSelector::Front, SessionPreset::Low).wait();
                tx.send((stopped, started)).unwrap();
            })
            .unwrap();

        let (stopped, started) = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(stopped, Ok(()));
        assert_eq!(started, Ok(SessionState::Running));
        assert_eq!(session.snapshot().device_position, Some(DevicePosition::Front));
    }

    #[test]
    fn capture_image_decodes() {
        let f = fixture(CaptureMode::Immediate, FakeStore::succeeding(None));
        let (tx, rx) = mpsc::channel();

        f.session.capture_image(move |image| tx.send((image.width(), image.height())).unwrap()).unwrap();

        let (width, height) = rx.recv_timeout(WAIT).unwrap();
        assert!(width > 0 && height > 0);
    }

    #[test]
    fn undecodable_image_reports_decode_failure() {
        let f = fixture(CaptureMode::Return(vec![0x00, 0x01, 0x02]), FakeStore::succeeding(None));
        f.session.capture_image(|_| panic!("garbage must not decode")).unwrap();
        drain(&f.session);

        let errors = f.errors.lock();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], CaptureError::DecodeFailed(_)));
    }

    #[test]
    fn capture_image_and_save_passes_reference_through() {
        let asset = AssetRef {
            id: "A1".into(),
            uri: "photos://A1".into(),
        };
        let f = fixture(CaptureMode::Immediate, FakeStore::succeeding(Some(asset.clone())));
        let (tx, rx) = mpsc::channel();

        f.session
            .capture_image_and_save(move |image, reference| tx.send((image.width(), reference)).unwrap())
            .unwrap();

        let (width, reference) = rx.recv_timeout(WAIT).unwrap();
        assert!(width > 0);
        assert_eq!(reference, Some(asset));
        assert_eq!(f.store.contexts()[0].device_position, Some(DevicePosition::Rear));
    }
}
