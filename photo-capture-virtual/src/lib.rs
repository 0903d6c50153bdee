//! # photo-capture-virtual
//!
//! Software camera backend for photo-capture-kit.
//!
//! Provides:
//! - `VirtualCamera`: camera device with flash capabilities and a configuration lock
//! - `VirtualPlatform`: device catalogue, default camera, device orientation
//! - `AccessPrompt`: simulated camera privacy consent
//! - `VirtualSession`: hardware session that renders gradient JPEG stills
//!   on a `virtual-shutter` thread
//!
//! Useful for running the capture pipeline headless (CI, demos, host apps
//! without a camera).
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use photo_capture_core::{CameraConfiguration, CaptureSession, DirectoryPhotoLibrary};
//! use photo_capture_virtual::{VirtualPlatform, VirtualSession};
//!
//! let library = Arc::new(DirectoryPhotoLibrary::new("/tmp/photos")?);
//! let session = CaptureSession::new(
//!     Arc::new(VirtualPlatform::phone()),
//!     VirtualSession::new(),
//!     library,
//!     CameraConfiguration::default(),
//! )?;
//! session.capture_and_save(|bytes, asset| println!("{} bytes → {:?}", bytes.len(), asset))?;
//! ```

pub mod camera;
pub mod frames;
pub mod permissions;
pub mod platform;
pub mod session;

pub use camera::VirtualCamera;
pub use permissions::{AccessPrompt, PromptAnswer};
pub use platform::{VirtualPlatform, FRONT_CAMERA_ID, REAR_CAMERA_ID};
pub use session::{VirtualSession, VirtualSessionControl};
