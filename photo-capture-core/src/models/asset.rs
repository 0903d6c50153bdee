use serde::{Deserialize, Serialize};

use super::camera_models::DevicePosition;
use crate::processing::orientation::CaptureOrientation;

/// Opaque reference to an image persisted in a photo store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    pub id: String,
    pub uri: String,
}

/// Context passed to the photo store alongside the encoded bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureContext {
    pub orientation: CaptureOrientation,
    pub device_position: Option<DevicePosition>,
}

/// Metadata stored alongside a persisted photo.
///
/// Serializable for JSON sidecar files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub id: String,
    pub file_name: String,
    pub byte_len: u64,
    pub checksum: String,
    pub created_at: String,
    pub orientation: CaptureOrientation,
    pub device_position: Option<DevicePosition>,
}

impl AssetMetadata {
    pub fn new(id: &str, file_name: &str, byte_len: u64, checksum: &str, context: &CaptureContext) -> Self {
        Self {
            id: id.to_string(),
            file_name: file_name.to_string(),
            byte_len,
            checksum: checksum.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            orientation: context.orientation,
            device_position: context.device_position,
        }
    }
}
