//! Coordinate mapping between the image and its on-screen rendering.
//!
//! Two coordinate spaces are involved:
//!
//! - **Internal** - pixel coordinates at the native resolution of the
//!   current working image. The drawing surface always has these dimensions.
//! - **Display** - CSS pixels of the scaled rendering that fits the viewport.
//!
//! Every conversion between the two goes through the functions here.

use serde::{Deserialize, Serialize};

/// Horizontal padding of the editor container, subtracted from its width.
pub const CONTAINER_PADDING: f64 = 32.0;

/// Fraction of the viewport height available to the canvas.
pub const VIEWPORT_HEIGHT_FRACTION: f64 = 0.6;

/// A point in either coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Upper bounds for the displayed canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayBounds {
    pub max_width: f64,
    pub max_height: f64,
}

impl DisplayBounds {
    pub fn new(max_width: f64, max_height: f64) -> Self {
        Self {
            max_width: max_width.max(0.0),
            max_height: max_height.max(0.0),
        }
    }

    /// Derive bounds from the host container width and the viewport height.
    pub fn from_container(container_width: f64, viewport_height: f64) -> Self {
        Self::new(
            container_width - CONTAINER_PADDING,
            viewport_height * VIEWPORT_HEIGHT_FRACTION,
        )
    }
}

/// CSS size of the displayed canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Fit native image dimensions into display bounds, preserving aspect ratio.
///
/// Width is capped first, then height; the image is never upscaled.
pub fn fit_display(native_width: u32, native_height: u32, bounds: DisplayBounds) -> DisplaySize {
    if native_width == 0 || native_height == 0 {
        return DisplaySize::default();
    }

    let aspect = native_width as f64 / native_height as f64;
    let mut width = native_width as f64;
    let mut height = native_height as f64;

    if width > bounds.max_width {
        width = bounds.max_width;
        height = width / aspect;
    }

    if height > bounds.max_height {
        height = bounds.max_height;
        width = height * aspect;
    }

    DisplaySize { width, height }
}

/// Map a point relative to the displayed canvas into internal coordinates.
///
/// The result is clamped to `[0, internal_width] x [0, internal_height]`, so
/// pointer positions outside the canvas never escape the surface.
pub fn display_to_internal(
    point: Point,
    display: DisplaySize,
    internal_width: u32,
    internal_height: u32,
) -> Point {
    let max_x = internal_width as f64;
    let max_y = internal_height as f64;

    let x = scale_axis(point.x, display.width, max_x);
    let y = scale_axis(point.y, display.height, max_y);

    Point {
        x: x.clamp(0.0, max_x),
        y: y.clamp(0.0, max_y),
    }
}

#[inline]
fn scale_axis(value: f64, display: f64, internal: f64) -> f64 {
    if display <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    value * (internal / display)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: fitted dimensions never exceed the bounds or the native size.
        #[test]
        fn prop_fit_within_bounds(
            w in 1u32..=8000,
            h in 1u32..=8000,
            max_w in 1.0f64..=2000.0,
            max_h in 1.0f64..=2000.0,
        ) {
            let size = fit_display(w, h, DisplayBounds::new(max_w, max_h));
            prop_assert!(size.width <= max_w + 1e-9);
            prop_assert!(size.height <= max_h + 1e-9);
            prop_assert!(size.width <= w as f64 + 1e-9);
            prop_assert!(size.height <= h as f64 + 1e-9);
        }

        /// Property: fitting preserves the aspect ratio.
        #[test]
        fn prop_fit_preserves_aspect(
            w in 1u32..=8000,
            h in 1u32..=8000,
            max_w in 10.0f64..=2000.0,
            max_h in 10.0f64..=2000.0,
        ) {
            let size = fit_display(w, h, DisplayBounds::new(max_w, max_h));
            let expected = w as f64 / h as f64;
            let actual = size.width / size.height;
            prop_assert!((expected - actual).abs() / expected < 1e-9);
        }

        /// Property: any pointer position maps inside the internal surface.
        #[test]
        fn prop_internal_point_clamped(
            x in -5000.0f64..=5000.0,
            y in -5000.0f64..=5000.0,
            w in 1u32..=4000,
            h in 1u32..=4000,
        ) {
            let display = fit_display(w, h, DisplayBounds::new(800.0, 600.0));
            let p = display_to_internal(Point::new(x, y), display, w, h);
            prop_assert!(p.x >= 0.0 && p.x <= w as f64);
            prop_assert!(p.y >= 0.0 && p.y <= h as f64);
        }
    }
}
