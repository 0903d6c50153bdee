use std::fs;
use std::path::{Path, PathBuf};

use crate::models::asset::AssetMetadata;
use crate::models::error::CaptureError;

/// Sidecar path for a stored image: `IMG_<id>.jpg` → `IMG_<id>.metadata.json`.
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("metadata.json")
}

/// Write asset metadata as a JSON sidecar file next to the image.
pub fn write_metadata(metadata: &AssetMetadata, image_path: &Path) -> Result<(), CaptureError> {
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| CaptureError::PersistenceFailed(format!("failed to serialize metadata: {}", e)))?;
    fs::write(sidecar_path(image_path), json)
        .map_err(|e| CaptureError::PersistenceFailed(format!("failed to write metadata: {}", e)))?;
    Ok(())
}

/// Read asset metadata from the JSON sidecar of an image.
pub fn read_metadata(image_path: &Path) -> Result<AssetMetadata, CaptureError> {
    let json = fs::read_to_string(sidecar_path(image_path))
        .map_err(|e| CaptureError::PersistenceFailed(format!("failed to read metadata: {}", e)))?;
    let metadata: AssetMetadata = serde_json::from_str(&json)
        .map_err(|e| CaptureError::PersistenceFailed(format!("failed to parse metadata: {}", e)))?;
    Ok(metadata)
}
