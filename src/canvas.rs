use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::errors::{OrbError, Result};

/// Browsers serialize an untouched canvas as the string "null".
const EMPTY_SENTINEL: &str = "null";

/// Turns a data-URL canvas payload (`data:image/png;base64,...`) into raw
/// image bytes, verified to decode as an image.
///
/// This only verifies structural validity; the returned bytes go through the
/// sanitizer, which does its own decode for pixel access. A verify-only
/// decode handle is never reused.
pub fn decode_canvas_payload(payload: &str) -> Result<Vec<u8>> {
    if payload.is_empty() || payload == EMPTY_SENTINEL || !payload.starts_with("data:image") {
        return Err(OrbError::InvalidInput("invalid canvas data".to_string()));
    }

    let body = payload
        .split_once(',')
        .map(|(_, body)| body)
        .ok_or_else(|| OrbError::InvalidInput("invalid canvas data".to_string()))?;

    let bytes = STANDARD
        .decode(body)
        .map_err(|e| OrbError::EncodingFailure(format!("invalid base64 data: {}", e)))?;

    image::load_from_memory(&bytes)
        .map_err(|_| OrbError::CorruptImage("canvas data is not a valid image".to_string()))?;

    Ok(bytes)
}
