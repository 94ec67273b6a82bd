use image::ImageFormat;

use crate::config::OrbConfig;
use crate::errors::{OrbError, Result};

/// Formats a submission may actually decode to, regardless of what the
/// filename claims.
const ALLOWED_FORMATS: &[ImageFormat] = &[ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Gif];

/// Checks an uploaded file before any processing touches it. Read-only: the
/// caller keeps ownership of the bytes and can hand the same slice straight
/// to the sanitizer.
///
/// The true format comes from the byte stream itself, so an executable (or a
/// GIF) renamed `.png` is rejected even though its extension looks fine.
pub fn validate(config: &OrbConfig, bytes: &[u8], filename: &str) -> Result<()> {
    if bytes.is_empty() || filename.is_empty() {
        return Err(OrbError::InvalidInput("no file provided".to_string()));
    }

    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .ok_or_else(|| {
            OrbError::UnsupportedFormat(
                "invalid file type, only PNG, JPG, and GIF allowed".to_string(),
            )
        })?;
    if !config.allowed_extensions.contains(&ext.as_str()) {
        return Err(OrbError::UnsupportedFormat(
            "invalid file type, only PNG, JPG, and GIF allowed".to_string(),
        ));
    }

    let true_format = image::guess_format(bytes)
        .map_err(|_| OrbError::CorruptImage("file is not a valid image".to_string()))?;
    if !ALLOWED_FORMATS.contains(&true_format) {
        return Err(OrbError::UnsupportedFormat(
            "file format not supported".to_string(),
        ));
    }

    // `from_extension` maps both jpg and jpeg to Jpeg.
    let declared_format = ImageFormat::from_extension(&ext).ok_or_else(|| {
        OrbError::UnsupportedFormat("file format not supported".to_string())
    })?;
    if true_format != declared_format {
        return Err(OrbError::UnsupportedFormat(
            "file contents do not match its extension".to_string(),
        ));
    }

    image::load_from_memory(bytes)
        .map_err(|_| OrbError::CorruptImage("file is not a valid image".to_string()))?;

    if bytes.len() > config.max_upload_bytes {
        return Err(OrbError::PayloadTooLarge {
            size: bytes.len(),
            max: config.max_upload_bytes,
        });
    }

    Ok(())
}
