//! `data:` URL wrapping for encoded rasters.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::jpeg::{encode_jpeg_image, EncodeError};
use crate::decode::DecodedImage;

/// Prefix of a base64 JPEG data URL.
pub const DATA_URL_JPEG_PREFIX: &str = "data:image/jpeg;base64,";

/// Encode an image as `data:image/jpeg;base64,...`.
pub fn encode_data_url(image: &DecodedImage, quality: u8) -> Result<String, EncodeError> {
    let jpeg = encode_jpeg_image(image, quality)?;
    let mut url = String::with_capacity(DATA_URL_JPEG_PREFIX.len() + jpeg.len() * 4 / 3 + 4);
    url.push_str(DATA_URL_JPEG_PREFIX);
    STANDARD.encode_string(&jpeg, &mut url);
    Ok(url)
}

/// Split a base64 data URL into its mime type and decoded payload.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>), EncodeError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| EncodeError::MalformedDataUrl("missing data: scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| EncodeError::MalformedDataUrl("missing payload separator".to_string()))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| EncodeError::MalformedDataUrl("payload is not base64".to_string()))?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| EncodeError::MalformedDataUrl(e.to_string()))?;
    Ok((mime.to_string(), bytes))
}
