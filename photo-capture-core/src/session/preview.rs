use std::sync::Arc;

use uuid::Uuid;

use crate::models::preview::{PreviewLayer, PreviewOptions, Rect};
use crate::session::capture_session::{CaptureSession, SessionInner};
use crate::traits::preview_surface::PreviewSurface;

/// A preview layer and the surface hosting it.
pub(crate) struct AttachedPreview {
    pub(crate) surface: Arc<dyn PreviewSurface>,
    pub(crate) layer: PreviewLayer,
}

/// Build a preview layer for `session_id` covering `frame`, centered on it.
pub fn preview_layer(session_id: Uuid, frame: Rect, options: &PreviewOptions) -> PreviewLayer {
    PreviewLayer {
        id: Uuid::new_v4(),
        session_id,
        bounds: Rect::new(0.0, 0.0, frame.width, frame.height),
        position: (frame.mid_x(), frame.mid_y()),
        gravity: options.gravity,
        placement: options.placement,
    }
}

impl CaptureSession {
    /// Show the live feed on `surface`, replacing any previous preview.
    ///
    /// Returns the inserted layer. The preview follows the session: it shows
    /// frames while the session runs and is unlinked by `stop`.
    pub fn attach(&self, surface: Arc<dyn PreviewSurface>, options: PreviewOptions) -> PreviewLayer {
        let frame = options.frame.unwrap_or_else(|| surface.bounds());
        let layer = preview_layer(self.inner.id, frame, &options);

        // Insert before publishing so a concurrent stop either sees no
        // preview or removes a layer that is already on the surface.
        surface.insert_layer(layer.clone());
        let previous = {
            let mut shared = self.inner.shared.lock();
            let previous = shared.preview.replace(AttachedPreview {
                surface: Arc::clone(&surface),
                layer: layer.clone(),
            });
            shared.snapshot.preview_attached = true;
            previous
        };
        if let Some(previous) = previous {
            previous.surface.remove_layer(previous.layer.id);
        }
        log::debug!("Attached preview layer {} ({:?})", layer.id, layer.gravity);
        layer
    }

    /// Attach with the configured default options.
    pub fn attach_default(&self, surface: Arc<dyn PreviewSurface>) -> PreviewLayer {
        let options = self.inner.config.preview;
        self.attach(surface, options)
    }

    /// Unlink the current preview. Returns whether one was attached.
    pub fn detach_preview(&self) -> bool {
        self.inner.detach_preview_layer()
    }

    /// The currently attached preview layer.
    pub fn preview_layer(&self) -> Option<PreviewLayer> {
        self.inner.shared.lock().preview.as_ref().map(|p| p.layer.clone())
    }
}

impl SessionInner {
    pub(crate) fn detach_preview_layer(&self) -> bool {
        let attached = {
            let mut shared = self.shared.lock();
            shared.snapshot.preview_attached = false;
            shared.preview.take()
        };
        match attached {
            Some(preview) => {
                preview.surface.remove_layer(preview.layer.id);
                log::debug!("Detached preview layer {}", preview.layer.id);
                true
            }
            None => false,
        }
    }
}
