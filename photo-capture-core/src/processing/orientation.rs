//! Device orientation → capture orientation lookup.

use serde::{Deserialize, Serialize};

/// Physical orientation reported by the device motion sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceOrientation {
    #[default]
    Unknown,
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    FaceUp,
    FaceDown,
}

/// Orientation tag attached to a still capture request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureOrientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeRight,
    LandscapeLeft,
}

impl CaptureOrientation {
    /// Map a device orientation to the capture orientation.
    ///
    /// Landscape is mirrored: the device's "left" is the sensor's "right".
    /// Flat and unknown orientations fall back to portrait.
    pub fn from_device(orientation: DeviceOrientation) -> Self {
        match orientation {
            DeviceOrientation::Portrait => Self::Portrait,
            DeviceOrientation::PortraitUpsideDown => Self::PortraitUpsideDown,
            DeviceOrientation::LandscapeLeft => Self::LandscapeRight,
            DeviceOrientation::LandscapeRight => Self::LandscapeLeft,
            DeviceOrientation::Unknown | DeviceOrientation::FaceUp | DeviceOrientation::FaceDown => {
                Self::Portrait
            }
        }
    }

    /// Whether the captured image is wider than tall.
    pub fn is_landscape(&self) -> bool {
        matches!(self, Self::LandscapeLeft | Self::LandscapeRight)
    }
}

impl From<DeviceOrientation> for CaptureOrientation {
    fn from(orientation: DeviceOrientation) -> Self {
        Self::from_device(orientation)
    }
}
