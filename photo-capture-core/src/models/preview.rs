use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Axis-aligned rectangle in surface coordinates (points).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn mid_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// How the video feed is scaled into the layer bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoGravity {
    /// Preserve aspect ratio, fill the bounds, crop overflow.
    #[default]
    ResizeAspectFill,
    /// Preserve aspect ratio, fit inside the bounds.
    ResizeAspect,
    /// Stretch to the bounds.
    Resize,
}

/// Stacking position of the preview layer within its host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerPlacement {
    /// Below all existing content, so foreground controls stay visible.
    #[default]
    Behind,
    /// Above all existing content.
    Front,
    /// Explicit sublayer index.
    Index(usize),
}

/// Caller-overridable preview attachment options.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewOptions {
    pub gravity: VideoGravity,
    pub placement: LayerPlacement,
    /// Overrides the surface bounds when set.
    pub frame: Option<Rect>,
}

/// Visual feed object bound to a live capture session.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewLayer {
    pub id: Uuid,
    pub session_id: Uuid,
    pub bounds: Rect,
    /// Center of the layer in surface coordinates.
    pub position: (f64, f64),
    pub gravity: VideoGravity,
    pub placement: LayerPlacement,
}
