use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::metadata;
use crate::models::asset::{AssetMetadata, AssetRef, CaptureContext};
use crate::models::error::CaptureError;
use crate::traits::photo_store::{PhotoStore, SaveCallback};

const FILE_PREFIX: &str = "IMG_";
const FILE_EXTENSION: &str = "jpg";

/// Photo store backed by a plain directory.
///
/// ## Layout
///
/// ```text
/// <root>/
/// ├── IMG_<uuid>.jpg             ← encoded still, written atomically
/// └── IMG_<uuid>.metadata.json   ← AssetMetadata sidecar (checksum, orientation, ...)
/// ```
///
/// Images are written to a `.tmp` file first and renamed into place, so a
/// listed asset is always complete.
pub struct DirectoryPhotoLibrary {
    root: PathBuf,
}

impl DirectoryPhotoLibrary {
    /// Open (and create if needed) a library rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, CaptureError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| CaptureError::PersistenceFailed(format!("failed to create library directory: {}", e)))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the image file for an asset id.
    pub fn image_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}{}.{}", FILE_PREFIX, id, FILE_EXTENSION))
    }

    /// Store encoded image bytes and their sidecar, returning the new asset.
    pub fn store(&self, data: &[u8], context: &CaptureContext) -> Result<AssetRef, CaptureError> {
        if data.is_empty() {
            return Err(CaptureError::PersistenceFailed("refusing to store empty image".into()));
        }

        let id = Uuid::new_v4().to_string();
        let image_path = self.image_path(&id);
        let temp_path = image_path.with_extension("tmp");

        if let Err(e) = write_file(&temp_path, data) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        fs::rename(&temp_path, &image_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            CaptureError::PersistenceFailed(format!("failed to move image into place: {}", e))
        })?;

        let file_name = file_name_of(&image_path);
        let checksum = hex_encode(&Sha256::digest(data));
        let meta = AssetMetadata::new(&id, &file_name, data.len() as u64, &checksum, context);
        if let Err(e) = metadata::write_metadata(&meta, &image_path) {
            warn!("Removing {} after sidecar failure: {}", file_name, e);
            let _ = fs::remove_file(&image_path);
            return Err(e);
        }

        debug!("Stored {} ({} bytes)", file_name, data.len());
        Ok(AssetRef {
            uri: format!("file://{}", image_path.display()),
            id,
        })
    }

    /// All stored assets, ordered by file name.
    pub fn list_assets(&self) -> Result<Vec<AssetRef>, CaptureError> {
        let entries = fs::read_dir(&self.root)
            .map_err(|e| CaptureError::PersistenceFailed(format!("failed to list library: {}", e)))?;

        let mut assets = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CaptureError::PersistenceFailed(e.to_string()))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            let id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.strip_prefix(FILE_PREFIX));
            if let Some(id) = id {
                assets.push(AssetRef {
                    id: id.to_string(),
                    uri: format!("file://{}", path.display()),
                });
            }
        }
        assets.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(assets)
    }

    /// Read the sidecar metadata of a stored asset.
    pub fn read_metadata(&self, id: &str) -> Result<AssetMetadata, CaptureError> {
        metadata::read_metadata(&self.image_path(id))
    }

    /// Read the encoded bytes of a stored asset.
    pub fn read_image(&self, id: &str) -> Result<Vec<u8>, CaptureError> {
        fs::read(self.image_path(id))
            .map_err(|e| CaptureError::PersistenceFailed(format!("failed to read image {}: {}", id, e)))
    }
}

impl PhotoStore for DirectoryPhotoLibrary {
    fn save(&self, data: &[u8], context: CaptureContext, completion: SaveCallback) {
        completion(self.store(data, &context).map(Some));
    }
}

fn write_file(path: &Path, data: &[u8]) -> Result<(), CaptureError> {
    let mut file = File::create(path)
        .map_err(|e| CaptureError::PersistenceFailed(format!("failed to create file: {}", e)))?;
    file.write_all(data)
        .map_err(|e| CaptureError::PersistenceFailed(format!("write failed: {}", e)))?;
    file.sync_all()
        .map_err(|e| CaptureError::PersistenceFailed(format!("sync failed: {}", e)))?;
    Ok(())
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
