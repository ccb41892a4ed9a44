//! Photodesk Core - Image editor library
//!
//! This crate provides the editing core of the Photodesk photo manager:
//! viewport fitting, the colour filter pipeline, the software drawing
//! surface, crop selection, JPEG/PNG decode and encode, and the editing
//! session that ties them together with the backend image endpoints.

pub mod adjustments;
pub mod client;
pub mod decode;
pub mod editor;
pub mod encode;
pub mod geometry;
pub mod metadata;
pub mod session;
pub mod surface;
pub mod transform;

pub use adjustments::{apply_filter, ColorTransform};
pub use editor::{EditorError, EditorSession, EditorStatus, Notification, NotificationKind, SavePayload};
pub use geometry::{display_to_internal, fit_display, DisplayBounds, DisplaySize, Point};
pub use metadata::ExifSummary;
pub use session::{InMemoryObjectUrls, LoadTicket, ObjectUrl, ObjectUrlAllocator, SessionVersion};
pub use surface::Surface;
pub use transform::{crop_pixels, CropMode, CropSelection, PixelRect};

/// Lower bound for brightness, contrast and saturation.
pub const ADJUSTMENT_MIN: f32 = -100.0;
/// Upper bound for brightness, contrast and saturation.
pub const ADJUSTMENT_MAX: f32 = 100.0;
/// Hue rotation range in degrees.
pub const HUE_RANGE: f32 = 180.0;

/// Colour filter parameters for the editor.
///
/// Brightness, contrast and saturation are percentage offsets from the
/// neutral 100%, hue is an absolute rotation in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FilterState {
    /// Brightness offset (-100 to 100)
    pub brightness: f32,
    /// Contrast offset (-100 to 100)
    pub contrast: f32,
    /// Saturation offset (-100 to 100)
    pub saturation: f32,
    /// Hue rotation (-180 to 180 degrees)
    pub hue: f32,
}

impl FilterState {
    /// Create a new FilterState with neutral values
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter state, clamping every parameter into its range.
    pub fn clamped(brightness: f32, contrast: f32, saturation: f32, hue: f32) -> Self {
        Self {
            brightness: clamp_adjustment(brightness),
            contrast: clamp_adjustment(contrast),
            saturation: clamp_adjustment(saturation),
            hue: clamp_hue(hue),
        }
    }

    /// Check if all values are neutral
    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }

    /// Brightness multiplier, `(100 + brightness)%` as a fraction.
    pub fn brightness_factor(&self) -> f32 {
        (100.0 + self.brightness) / 100.0
    }

    /// Contrast multiplier, `(100 + contrast)%` as a fraction.
    pub fn contrast_factor(&self) -> f32 {
        (100.0 + self.contrast) / 100.0
    }

    /// Saturation multiplier, `(100 + saturation)%` as a fraction.
    pub fn saturation_factor(&self) -> f32 {
        (100.0 + self.saturation) / 100.0
    }
}

/// Clamp a brightness/contrast/saturation value. NaN becomes neutral.
pub fn clamp_adjustment(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(ADJUSTMENT_MIN, ADJUSTMENT_MAX)
}

/// Clamp a hue rotation. NaN becomes neutral.
pub fn clamp_hue(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(-HUE_RANGE, HUE_RANGE)
}
