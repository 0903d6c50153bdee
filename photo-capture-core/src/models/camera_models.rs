use std::fmt;

use serde::{Deserialize, Serialize};

/// Physical mounting position of a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePosition {
    Front,
    Rear,
    Unspecified,
}

/// Logical camera selector resolved by the device registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceSelector {
    /// The platform's system-default camera.
    #[default]
    Default,
    Front,
    Rear,
}

impl DeviceSelector {
    /// Selector for the camera on the other side of `position`.
    ///
    /// Anything that is not the rear camera toggles to the rear camera.
    pub fn opposite_of(position: DevicePosition) -> Self {
        match position {
            DevicePosition::Rear => Self::Front,
            DevicePosition::Front | DevicePosition::Unspecified => Self::Rear,
        }
    }

    /// Whether a device at `position` satisfies this selector.
    pub fn matches(&self, position: DevicePosition) -> bool {
        match self {
            Self::Default => true,
            Self::Front => position == DevicePosition::Front,
            Self::Rear => position == DevicePosition::Rear,
        }
    }
}

impl fmt::Display for DeviceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Default => "default",
            Self::Front => "front",
            Self::Rear => "rear",
        };
        f.write_str(name)
    }
}

/// Flash mode of a camera device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    #[default]
    Off,
    On,
    Auto,
}

impl FlashMode {
    /// `On` and `Auto` both count as lit for toggling purposes.
    pub fn is_lit(&self) -> bool {
        !matches!(self, Self::Off)
    }

    /// Off ↔ On.
    pub fn toggled(&self) -> Self {
        if self.is_lit() {
            Self::Off
        } else {
            Self::On
        }
    }
}

/// Named hardware configuration profile (resolution/quality trade-off).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPreset {
    Photo,
    High,
    #[default]
    Medium,
    Low,
    Vga640x480,
    Hd1280x720,
    Hd1920x1080,
    Uhd3840x2160,
}

impl SessionPreset {
    /// Nominal output dimensions (width, height) in landscape orientation.
    pub fn nominal_dimensions(&self) -> (u32, u32) {
        match self {
            Self::Photo => (4032, 3024),
            Self::High => (1920, 1080),
            Self::Medium => (480, 360),
            Self::Low => (192, 144),
            Self::Vga640x480 => (640, 480),
            Self::Hd1280x720 => (1280, 720),
            Self::Hd1920x1080 => (1920, 1080),
            Self::Uhd3840x2160 => (3840, 2160),
        }
    }
}

/// A camera device available for capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraInfo {
    pub id: String,
    pub name: String,
    pub position: DevicePosition,
    pub has_flash: bool,
    pub is_default: bool,
}

/// Externally observable view of a capture session.
///
/// Published only after a configuration transaction commits, so a
/// half-configured session is never visible.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub state: super::state::SessionState,
    pub device_id: Option<String>,
    pub device_position: Option<DevicePosition>,
    pub preset: Option<SessionPreset>,
    pub input_count: usize,
    pub output_count: usize,
    pub preview_attached: bool,
}
