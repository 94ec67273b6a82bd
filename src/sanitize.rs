use std::fs;

use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageError};
use uuid::Uuid;

use crate::config::OrbConfig;
use crate::errors::{OrbError, Result};

/// Normalizes untrusted image bytes and writes the result into the uploads
/// directory under a fresh random name.
///
/// Every output is a freshly re-encoded PNG, which drops whatever EXIF, ICC
/// profiles, or comment chunks the original carried. Color mode is kept only
/// for RGB and grayscale inputs; everything else (alpha, CMYK, palettes) is
/// flattened to RGB. The canvas path passes `force_rgb` because drawings are
/// stored full-color even when the browser happened to emit grayscale.
///
/// Returns the stored filename. On any failure nothing is left on disk.
pub fn sanitize(config: &OrbConfig, bytes: &[u8], force_rgb: bool) -> Result<String> {
    let mut img = image::load_from_memory(bytes)
        .map_err(|e| OrbError::CorruptImage(format!("could not decode image: {}", e)))?;

    let keep_mode = match img.color() {
        ColorType::Rgb8 => true,
        ColorType::L8 => !force_rgb,
        _ => false,
    };
    if !keep_mode {
        img = DynamicImage::ImageRgb8(img.to_rgb8());
    }

    // Fit within the configured bound, never upscale.
    let max = config.max_dimension;
    if img.width() > max || img.height() > max {
        img = img.resize(max, max, FilterType::Lanczos3);
    }

    fs::create_dir_all(&config.uploads_dir)?;
    let filename = format!("{}.png", Uuid::new_v4());
    let path = config.uploads_dir.join(&filename);

    let file = fs::File::create(&path)?;
    let encoder =
        PngEncoder::new_with_quality(file, CompressionType::Best, PngFilter::Adaptive);
    if let Err(e) = img.write_with_encoder(encoder) {
        let _ = fs::remove_file(&path);
        return Err(match e {
            ImageError::IoError(io) => io.into(),
            other => OrbError::CorruptImage(format!("could not encode image: {}", other)),
        });
    }

    Ok(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat, RgbImage, RgbaImage};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> OrbConfig {
        OrbConfig::from_base(dir.path().to_path_buf())
    }

    fn encode_png(img: DynamicImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn rgb_png(w: u32, h: u32) -> Vec<u8> {
        encode_png(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            w,
            h,
            image::Rgb([200, 50, 10]),
        )))
    }

    fn open_stored(config: &OrbConfig, filename: &str) -> DynamicImage {
        image::open(config.uploads_dir.join(filename)).unwrap()
    }

    #[test]
    fn test_writes_png_with_random_name() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let filename = sanitize(&config, &rgb_png(10, 10), false).unwrap();
        assert!(filename.ends_with(".png"));
        // uuid v4 plus extension
        assert_eq!(filename.len(), 36 + 4);
        assert!(config.uploads_dir.join(&filename).exists());
    }

    #[test]
    fn test_filenames_never_collide() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let bytes = rgb_png(5, 5);
        let a = sanitize(&config, &bytes, false).unwrap();
        let b = sanitize(&config, &bytes, false).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_small_rgb_image_unchanged() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let filename = sanitize(&config, &rgb_png(100, 80), false).unwrap();
        let stored = open_stored(&config, &filename);
        assert_eq!((stored.width(), stored.height()), (100, 80));
        assert_eq!(stored.color(), ColorType::Rgb8);
    }

    #[test]
    fn test_sanitize_is_idempotent_on_canonical_output() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let first = sanitize(&config, &rgb_png(120, 90), false).unwrap();
        let stored = std::fs::read(config.uploads_dir.join(&first)).unwrap();
        let second = sanitize(&config, &stored, false).unwrap();
        let a = open_stored(&config, &first);
        let b = open_stored(&config, &second);
        assert_eq!((a.width(), a.height()), (b.width(), b.height()));
        assert_eq!(a.color(), b.color());
    }

    #[test]
    fn test_one_by_one_preserved() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let filename = sanitize(&config, &rgb_png(1, 1), true).unwrap();
        let stored = open_stored(&config, &filename);
        assert_eq!((stored.width(), stored.height()), (1, 1));
    }

    #[test]
    fn test_grayscale_kept_on_upload_path() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let bytes = encode_png(DynamicImage::ImageLuma8(GrayImage::from_pixel(
            20,
            20,
            image::Luma([90]),
        )));
        let filename = sanitize(&config, &bytes, false).unwrap();
        assert_eq!(open_stored(&config, &filename).color(), ColorType::L8);
    }

    #[test]
    fn test_grayscale_forced_to_rgb_on_canvas_path() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let bytes = encode_png(DynamicImage::ImageLuma8(GrayImage::from_pixel(
            20,
            20,
            image::Luma([90]),
        )));
        let filename = sanitize(&config, &bytes, true).unwrap();
        assert_eq!(open_stored(&config, &filename).color(), ColorType::Rgb8);
    }

    #[test]
    fn test_alpha_flattened_to_rgb() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let bytes = encode_png(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            8,
            8,
            image::Rgba([10, 20, 30, 128]),
        )));
        let filename = sanitize(&config, &bytes, false).unwrap();
        assert_eq!(open_stored(&config, &filename).color(), ColorType::Rgb8);
    }

    #[test]
    fn test_wide_image_scaled_down() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let filename = sanitize(&config, &rgb_png(1600, 800), false).unwrap();
        let stored = open_stored(&config, &filename);
        assert_eq!((stored.width(), stored.height()), (800, 400));
    }

    #[test]
    fn test_tall_image_scaled_down_preserving_aspect() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let filename = sanitize(&config, &rgb_png(300, 900), false).unwrap();
        let stored = open_stored(&config, &filename);
        assert!(stored.width().max(stored.height()) <= 800);
        let original = 300.0 / 900.0;
        let scaled = stored.width() as f64 / stored.height() as f64;
        assert!((original - scaled).abs() < 0.01);
    }

    #[test]
    fn test_never_upscales() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let filename = sanitize(&config, &rgb_png(12, 7), false).unwrap();
        let stored = open_stored(&config, &filename);
        assert_eq!((stored.width(), stored.height()), (12, 7));
    }

    #[test]
    fn test_corrupt_bytes_write_nothing() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let result = sanitize(&config, b"definitely not an image", false);
        assert!(matches!(result, Err(OrbError::CorruptImage(_))));
        // Decode failed before the uploads dir was even created.
        assert!(
            !config.uploads_dir.exists()
                || std::fs::read_dir(&config.uploads_dir).unwrap().next().is_none()
        );
    }
}
