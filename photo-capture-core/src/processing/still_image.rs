use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage};

use crate::models::error::CaptureError;

/// JPEG start-of-image marker.
const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

/// Whether `data` starts with a JPEG start-of-image marker.
pub fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(&JPEG_SOI)
}

/// Decode an encoded still image into an in-memory image.
pub fn decode_still(data: &[u8]) -> Result<DynamicImage, CaptureError> {
    if data.is_empty() {
        return Err(CaptureError::DecodeFailed("empty image data".into()));
    }
    let format = if is_jpeg(data) {
        ImageFormat::Jpeg
    } else {
        image::guess_format(data).map_err(|e| CaptureError::DecodeFailed(e.to_string()))?
    };
    image::load_from_memory_with_format(data, format).map_err(|e| CaptureError::DecodeFailed(e.to_string()))
}

/// Encode an RGB frame as JPEG at `quality` (1–100).
pub fn encode_jpeg(frame: &RgbImage, quality: u8) -> Result<Vec<u8>, CaptureError> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
        .encode_image(frame)
        .map_err(|e| CaptureError::CaptureFailed(format!("jpeg encoding failed: {}", e)))?;
    Ok(out)
}
