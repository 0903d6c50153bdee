pub mod camera_platform;
pub mod capture_delegate;
pub mod capture_device;
pub mod photo_store;
pub mod preview_surface;
pub mod session_backend;
