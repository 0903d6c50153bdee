use crate::models::asset::{AssetRef, CaptureContext};
use crate::models::error::CaptureError;

/// Completion handler for a photo store write.
///
/// `Ok(None)` is a successful write for stores that do not hand out references.
pub type SaveCallback = Box<dyn FnOnce(Result<Option<AssetRef>, CaptureError>) + Send + 'static>;

/// Interface to the platform photo library.
///
/// Implemented by:
/// - `DirectoryPhotoLibrary` (this crate)
pub trait PhotoStore: Send + Sync {
    /// Persist `data` as a single transactional change.
    fn save(&self, data: &[u8], context: CaptureContext, completion: SaveCallback);
}
