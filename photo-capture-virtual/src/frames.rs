//! Synthetic frame rendering for the virtual sensor.

use image::{Rgb, RgbImage};

use photo_capture_core::models::camera_models::SessionPreset;
use photo_capture_core::processing::orientation::CaptureOrientation;

/// Frames are rendered at the preset's nominal size divided by this factor.
pub const SENSOR_DOWNSCALE: u32 = 8;

const MIN_EDGE: u32 = 16;

/// Output dimensions for `preset`, rotated for portrait captures.
///
/// Without an orientation tag the sensor's native landscape layout is used.
pub fn frame_dimensions(preset: SessionPreset, orientation: Option<CaptureOrientation>) -> (u32, u32) {
    let (w, h) = preset.nominal_dimensions();
    let (w, h) = ((w / SENSOR_DOWNSCALE).max(MIN_EDGE), (h / SENSOR_DOWNSCALE).max(MIN_EDGE));
    match orientation {
        Some(o) if !o.is_landscape() => (h, w),
        _ => (w, h),
    }
}

/// Render a diagonal gradient. A lit flash brightens the whole frame.
pub fn render_gradient(width: u32, height: u32, frame_index: u64, flash_lit: bool) -> RgbImage {
    let boost: u16 = if flash_lit { 60 } else { 0 };
    let shift = (frame_index % 256) as u32;
    RgbImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1) + shift) % 256;
        let g = y * 255 / height.max(1);
        let b = ((x + y) * 127 / (width + height).max(1)) + 64;
        Rgb([
            brighten(r as u16, boost),
            brighten(g as u16, boost),
            brighten(b as u16, boost),
        ])
    })
}

fn brighten(channel: u16, boost: u16) -> u8 {
    (channel + boost).min(255) as u8
}
