//! Crop selection and extraction.
//!
//! # Coordinate System
//!
//! - Selections are recorded in internal (native pixel) coordinates
//! - Origin is the top-left corner
//! - Rectangles are snapped to whole pixels and clamped to the surface
//!   before any pixel is read or drawn

mod crop;

pub use crop::{crop_pixels, CropMode, CropSelection, PixelRect};
