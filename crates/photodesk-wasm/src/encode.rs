//! Image encoding bindings.
//!
//! # Example
//!
//! ```typescript
//! import { encode_data_url } from '@photodesk/wasm';
//!
//! const url = encode_data_url(rgbPixels, width, height, 90);
//! await api.put(`/images/${id}/edit`, { imageData: url });
//! ```

use photodesk_core::decode::DecodedImage;
use photodesk_core::encode;
use wasm_bindgen::prelude::*;

use crate::types::js_error;

/// Encode RGB pixel data to JPEG bytes.
///
/// # Errors
///
/// Returns an error if the pixel data length doesn't match
/// `width * height * 3` or either dimension is zero.
#[wasm_bindgen]
pub fn encode_jpeg(pixels: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(pixels, width, height, quality).map_err(js_error)
}

/// Encode RGB pixel data as a `data:image/jpeg;base64,...` URL.
#[wasm_bindgen]
pub fn encode_data_url(pixels: &[u8], width: u32, height: u32, quality: u8) -> Result<String, JsValue> {
    data_url(pixels, width, height, quality).map_err(js_error)
}

fn data_url(pixels: &[u8], width: u32, height: u32, quality: u8) -> Result<String, encode::EncodeError> {
    let expected = width as usize * height as usize * 3;
    if pixels.len() != expected {
        return Err(encode::EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    let image = DecodedImage::new(width, height, pixels.to_vec());
    encode::encode_data_url(&image, quality)
}
