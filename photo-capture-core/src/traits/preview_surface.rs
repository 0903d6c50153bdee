use uuid::Uuid;

use crate::models::preview::{PreviewLayer, Rect};

/// Display surface that can host a preview layer.
///
/// Opaque handle into the host's view hierarchy.
pub trait PreviewSurface: Send + Sync {
    /// Current bounds of the surface's backing layer.
    fn bounds(&self) -> Rect;

    /// Insert `layer` according to its placement.
    fn insert_layer(&self, layer: PreviewLayer);

    /// Unlink the layer with `layer_id`. Unknown ids are ignored.
    fn remove_layer(&self, layer_id: Uuid);
}
