//! Image preprocessing for the vision mode.
//!
//! Decodes any supported format, normalizes to 3-channel RGB, downsamples so
//! the longest edge is at most 2048 px (aspect ratio preserved, Lanczos
//! resampling), and re-encodes as JPEG at fixed quality. Deterministic for
//! identical input bytes.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

pub const MAX_EDGE: u32 = 2048;
pub const JPEG_QUALITY: u8 = 85;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image decode failed: {0}")]
    Decode(String),
    #[error("jpeg encode failed: {0}")]
    Encode(String),
}

/// Preprocessed image: the JPEG bytes for preview plus the base64 payload
/// sent inline to the completion service.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub base64: String,
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode, normalize, bound to [`MAX_EDGE`], and re-encode as JPEG.
///
/// # Errors
///
/// Returns [`ImageError::Decode`] for undecodable bytes and
/// [`ImageError::Encode`] if JPEG encoding fails.
pub fn preprocess(bytes: &[u8]) -> Result<EncodedImage, ImageError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;

    // RGBA / grayscale / paletted inputs all flatten to RGB8.
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();

    let rgb = match scaled_dimensions(width, height) {
        Some((w, h)) => image::imageops::resize(&rgb, w, h, FilterType::Lanczos3),
        None => rgb,
    };
    let (width, height) = rgb.dimensions();

    let mut jpeg = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(|e| ImageError::Encode(e.to_string()))?;

    Ok(EncodedImage { base64: BASE64.encode(&jpeg), jpeg, width, height })
}

/// Target dimensions when the longest edge exceeds [`MAX_EDGE`], or `None`
/// when the image already fits. Scaling truncates to whole pixels the same
/// way on both axes, preserving aspect ratio within integer rounding.
pub(crate) fn scaled_dimensions(width: u32, height: u32) -> Option<(u32, u32)> {
    let longest = width.max(height);
    if longest <= MAX_EDGE {
        return None;
    }
    let ratio = f64::from(MAX_EDGE) / f64::from(longest);
    let scale = |dim: u32| ((f64::from(dim) * ratio) as u32).max(1);
    Some((scale(width), scale(height)))
}

#[cfg(test)]
#[path = "image_test.rs"]
mod tests;
