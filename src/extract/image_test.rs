use super::*;
use image::{DynamicImage, RgbImage, RgbaImage};

fn png_bytes(img: DynamicImage) -> Vec<u8> {
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("png encode");
    out.into_inner()
}

// =============================================================================
// scaled_dimensions
// =============================================================================

#[test]
fn small_image_is_not_scaled() {
    assert_eq!(scaled_dimensions(100, 100), None);
}

#[test]
fn exact_limit_is_not_scaled() {
    assert_eq!(scaled_dimensions(2048, 1024), None);
}

#[test]
fn wide_image_scales_longest_edge_to_limit() {
    assert_eq!(scaled_dimensions(4000, 2000), Some((2048, 1024)));
}

#[test]
fn tall_image_scales_longest_edge_to_limit() {
    assert_eq!(scaled_dimensions(2000, 4000), Some((1024, 2048)));
}

#[test]
fn aspect_ratio_preserved_within_rounding() {
    let (w, h) = scaled_dimensions(3000, 1999).unwrap();
    assert_eq!(w, 2048);
    let expected = f64::from(1999) * (2048.0 / 3000.0);
    assert!((f64::from(h) - expected).abs() <= 1.0);
}

#[test]
fn degenerate_strip_never_hits_zero() {
    let (_, h) = scaled_dimensions(10_000, 1).unwrap();
    assert_eq!(h, 1);
}

// =============================================================================
// preprocess
// =============================================================================

#[test]
fn oversized_input_is_downsampled() {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4000, 2000, image::Rgb([120, 30, 200])));
    let encoded = preprocess(&png_bytes(img)).unwrap();
    assert_eq!((encoded.width, encoded.height), (2048, 1024));
}

#[test]
fn small_input_keeps_dimensions() {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 100, image::Rgb([10, 20, 30])));
    let encoded = preprocess(&png_bytes(img)).unwrap();
    assert_eq!((encoded.width, encoded.height), (100, 100));
}

#[test]
fn rgba_input_is_flattened_to_rgb_jpeg() {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 48, image::Rgba([200, 100, 50, 128])));
    let encoded = preprocess(&png_bytes(img)).unwrap();
    assert_eq!((encoded.width, encoded.height), (64, 48));
    // JPEG magic bytes.
    assert_eq!(&encoded.jpeg[..2], &[0xFF, 0xD8]);
}

#[test]
fn base64_matches_jpeg_bytes() {
    use base64::Engine as _;
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, image::Rgb([0, 0, 0])));
    let encoded = preprocess(&png_bytes(img)).unwrap();
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(&encoded.base64)
        .unwrap();
    assert_eq!(decoded, encoded.jpeg);
}

#[test]
fn identical_input_is_deterministic() {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 200, image::Rgb([7, 77, 177])));
    let bytes = png_bytes(img);
    let a = preprocess(&bytes).unwrap();
    let b = preprocess(&bytes).unwrap();
    assert_eq!(a.base64, b.base64);
}

#[test]
fn garbage_bytes_are_a_decode_error() {
    assert!(matches!(preprocess(b"not an image"), Err(ImageError::Decode(_))));
}
