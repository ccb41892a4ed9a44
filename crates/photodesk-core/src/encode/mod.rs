//! Image encoding for the editor.
//!
//! This module provides functionality for:
//! - Encoding RGB pixel data to JPEG with configurable quality
//! - Wrapping encoded bytes in a base64 `data:` URL, the form the backend
//!   edit endpoint accepts
//!
//! Crop commits and saves both go through [`encode_data_url`] /
//! [`encode_jpeg`] at [`EDITOR_JPEG_QUALITY`].

mod data_url;
mod jpeg;

pub use data_url::{decode_data_url, encode_data_url, DATA_URL_JPEG_PREFIX};
pub use jpeg::{encode_jpeg, encode_jpeg_image, EncodeError};

/// Fixed JPEG quality used for crop commits and saves.
pub const EDITOR_JPEG_QUALITY: u8 = 90;
