//! # photo-capture-core
//!
//! Platform-agnostic camera capture core library.
//!
//! Provides the capture session state machine, the asynchronous still-capture
//! pipeline, flash control, preview attachment, and photo persistence.
//! Platform-specific camera stacks implement `CameraPlatform`,
//! `CaptureDevice` and `SessionBackend` and plug into the generic
//! `CaptureSession`.
//!
//! ## Architecture
//!
//! ```text
//! photo-capture-core (this crate)
//! ├── traits/       ← CameraPlatform, CaptureDevice, SessionBackend, PhotoStore, PreviewSurface, CaptureDelegate
//! ├── models/       ← CaptureError, SessionState, CameraConfiguration, SessionPreset, FlashMode, etc.
//! ├── processing/   ← orientation mapping, still image decode/encode
//! ├── session/      ← CaptureSession, serial session queue, device registry, capture pipeline
//! └── storage/      ← DirectoryPhotoLibrary, metadata sidecars
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types at crate root for convenience.
pub use models::asset::{AssetMetadata, AssetRef, CaptureContext};
pub use models::camera_models::{CameraInfo, DevicePosition, DeviceSelector, FlashMode, SessionPreset, SessionSnapshot};
pub use models::config::{CameraConfiguration, ImageCodec, OutputSettings};
pub use models::error::CaptureError;
pub use models::preview::{LayerPlacement, PreviewLayer, PreviewOptions, Rect, VideoGravity};
pub use models::state::{RequestState, SessionState};
pub use processing::orientation::{CaptureOrientation, DeviceOrientation};
pub use session::capture_session::CaptureSession;
pub use session::continuation::{Completion, Continuation};
pub use session::device_registry::DeviceRegistry;
pub use storage::photo_library::DirectoryPhotoLibrary;
pub use traits::camera_platform::{AuthorizationStatus, CameraPlatform};
pub use traits::capture_delegate::{CaptureDelegate, ErrorCallback};
pub use traits::capture_device::CaptureDevice;
pub use traits::photo_store::{PhotoStore, SaveCallback};
pub use traits::preview_surface::PreviewSurface;
pub use traits::session_backend::{SessionBackend, StillImageCallback};
