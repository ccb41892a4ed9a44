//! Crop selection state and pixel-exact cropping.

use crate::decode::DecodedImage;
use crate::geometry::Point;

/// Where the pointer interaction of crop mode currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CropMode {
    /// Crop mode off; pointer events are ignored.
    #[default]
    Idle,
    /// Crop mode on, no selection started yet.
    Armed,
    /// Pointer is down; the end point tracks the pointer.
    Selecting,
    /// Pointer released; the rectangle is frozen.
    Selected,
}

impl CropMode {
    pub fn is_active(self) -> bool {
        self != CropMode::Idle
    }
}

/// A pixel-aligned rectangle on the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole surface of the given size.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Restrict the rectangle to a `width x height` surface.
    pub fn clamp_to(&self, width: u32, height: u32) -> PixelRect {
        let x = self.x.min(width);
        let y = self.y.min(height);
        PixelRect {
            x,
            y,
            width: self.width.min(width - x),
            height: self.height.min(height - y),
        }
    }
}

/// A crop selection between a start and end point, in internal coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CropSelection {
    pub start: Point,
    pub end: Point,
}

impl CropSelection {
    /// A zero-area selection anchored at `point`.
    pub fn at(point: Point) -> Self {
        Self {
            start: point,
            end: point,
        }
    }

    /// The selection as a pixel rectangle on a `width x height` surface.
    ///
    /// The corners are normalized, each edge is rounded to the nearest pixel
    /// boundary and then clamped to the surface, so a selection dragged
    /// outside the canvas can never address pixels beyond it.
    pub fn pixel_rect(&self, width: u32, height: u32) -> PixelRect {
        let max_x = width as f64;
        let max_y = height as f64;

        let left = snap(self.start.x.min(self.end.x), max_x);
        let right = snap(self.start.x.max(self.end.x), max_x);
        let top = snap(self.start.y.min(self.end.y), max_y);
        let bottom = snap(self.start.y.max(self.end.y), max_y);

        PixelRect {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }
}

#[inline]
fn snap(value: f64, max: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, max) as u32
}

/// Copy an exact pixel rectangle out of an image.
///
/// The rectangle is clamped to the image first; an empty intersection
/// produces an empty image.
pub fn crop_pixels(image: &DecodedImage, rect: PixelRect) -> DecodedImage {
    let rect = rect.clamp_to(image.width, image.height);
    if rect.is_empty() {
        return DecodedImage::new(0, 0, Vec::new());
    }

    let row_bytes = rect.width as usize * 3;
    let mut output = Vec::with_capacity(row_bytes * rect.height as usize);

    for y in rect.y..rect.bottom() {
        let start = image.offset(rect.x, y);
        output.extend_from_slice(&image.pixels[start..start + row_bytes]);
    }

    DecodedImage::new(rect.width, rect.height, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a test image where each pixel has a unique value based on position.
    fn test_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.extend_from_slice(&[v, v, v]);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    fn selection(x0: f64, y0: f64, x1: f64, y1: f64) -> CropSelection {
        CropSelection {
            start: Point::new(x0, y0),
            end: Point::new(x1, y1),
        }
    }

    #[test]
    fn test_pixel_rect_normalizes_corners() {
        let rect = selection(80.0, 60.0, 20.0, 10.0).pixel_rect(100, 100);
        assert_eq!(rect, PixelRect::new(20, 10, 60, 50));
    }

    #[test]
    fn test_pixel_rect_clamps_to_surface() {
        let rect = selection(-30.0, 50.0, 150.0, 500.0).pixel_rect(100, 80);
        assert_eq!(rect, PixelRect::new(0, 50, 100, 30));
    }

    #[test]
    fn test_pixel_rect_rounds_edges() {
        let rect = selection(10.4, 10.6, 20.5, 30.2).pixel_rect(100, 100);
        assert_eq!(rect, PixelRect::new(10, 11, 11, 19));
    }

    #[test]
    fn test_zero_area_selection() {
        let rect = CropSelection::at(Point::new(42.0, 17.0)).pixel_rect(100, 100);
        assert!(rect.is_empty());
    }

    #[test]
    fn test_selection_outside_surface_is_empty() {
        let rect = selection(120.0, 10.0, 200.0, 50.0).pixel_rect(100, 100);
        assert!(rect.is_empty());
    }

    #[test]
    fn test_crop_pixels_values() {
        let img = test_image(10, 10);
        let result = crop_pixels(&img, PixelRect::new(3, 3, 4, 4));

        assert_eq!((result.width, result.height), (4, 4));
        // Value at (3, 3) = 3 * 10 + 3 = 33
        assert_eq!(result.pixel(0, 0), [33, 33, 33]);
        // Value at (6, 6) = 66
        assert_eq!(result.pixel(3, 3), [66, 66, 66]);
    }

    #[test]
    fn test_crop_pixels_full() {
        let img = test_image(12, 7);
        let result = crop_pixels(&img, PixelRect::full(12, 7));
        assert_eq!(result, img);
    }

    #[test]
    fn test_crop_pixels_clamps_oversized() {
        let img = test_image(10, 10);
        let result = crop_pixels(&img, PixelRect::new(8, 8, 50, 50));
        assert_eq!((result.width, result.height), (2, 2));
    }

    #[test]
    fn test_crop_pixels_empty() {
        let img = test_image(10, 10);
        let result = crop_pixels(&img, PixelRect::new(10, 0, 5, 5));
        assert!(result.is_empty());
    }

    #[test]
    fn test_crop_mode_activity() {
        assert!(!CropMode::Idle.is_active());
        assert!(CropMode::Armed.is_active());
        assert!(CropMode::Selected.is_active());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
