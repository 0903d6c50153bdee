use serde::{Deserialize, Serialize};

use super::camera_models::{DeviceSelector, SessionPreset};
use super::error::CaptureError;
use super::preview::PreviewOptions;

/// Encoding produced by the still-image output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageCodec {
    #[default]
    Jpeg,
}

/// Settings for the still-image output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub codec: ImageCodec,

    /// Encoder quality, 1–100.
    pub quality: u8,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            codec: ImageCodec::Jpeg,
            quality: 90,
        }
    }
}

/// Configuration for a camera capture session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfiguration {
    /// Camera bound by implicit starts (default: system default camera).
    pub device: DeviceSelector,

    /// Session preset applied when the hardware supports it (default: medium).
    pub preset: SessionPreset,

    /// Still-image output settings.
    pub output: OutputSettings,

    /// Defaults for `attach` when the caller passes none.
    pub preview: PreviewOptions,

    /// Ask the platform for camera access when it has not been decided yet.
    pub request_authorization: bool,
}

impl CameraConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=100).contains(&self.output.quality) {
            return Err(format!("unsupported output quality: {}", self.output.quality));
        }
        if let Some(frame) = self.preview.frame {
            if frame.width < 0.0 || frame.height < 0.0 {
                return Err("preview frame must have a non-negative size".into());
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration document.
    ///
    /// Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, CaptureError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CaptureError::ConfigurationFailed(format!("failed to parse configuration: {}", e)))?;
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        Ok(config)
    }
}

impl Default for CameraConfiguration {
    fn default() -> Self {
        Self {
            device: DeviceSelector::Default,
            preset: SessionPreset::Medium,
            output: OutputSettings::default(),
            preview: PreviewOptions::default(),
            request_authorization: true,
        }
    }
}
