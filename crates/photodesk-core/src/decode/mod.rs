//! Image decoding for the editor.
//!
//! This module provides functionality for:
//! - Decoding JPEG and PNG images fetched from the backend
//! - Applying EXIF orientation the way the browser does when it displays them
//!
//! All operations are synchronous; the bytes are already in memory by the
//! time decoding starts.

mod raster;
mod types;

pub use raster::{decode_image, decode_image_no_orientation};
pub use types::{DecodeError, DecodedImage, Orientation};
