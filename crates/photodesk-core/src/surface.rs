//! Software drawing surface.
//!
//! The surface mirrors a 2D canvas: an RGB pixel store at the internal
//! (native) resolution of the working image, plus the CSS display size it is
//! scaled to on screen. The editor renders every frame into it; the host
//! blits [`Surface::to_rgba`] into the real canvas.

use crate::adjustments::apply_filter;
use crate::decode::DecodedImage;
use crate::geometry::{fit_display, DisplayBounds, DisplaySize};
use crate::transform::{crop_pixels, PixelRect};
use crate::FilterState;

/// Opacity of the mask drawn outside a crop selection.
pub const MASK_ALPHA: f32 = 0.5;
/// Selection border colour (`#3b82f6`).
pub const SELECTION_COLOR: [u8; 3] = [0x3b, 0x82, 0xf6];
/// Selection border width in internal pixels.
pub const SELECTION_LINE_WIDTH: u32 = 2;
/// Edge length of the corner handles in internal pixels.
pub const HANDLE_SIZE: u32 = 10;

#[derive(Debug, Clone, Default)]
pub struct Surface {
    canvas: DecodedImage,
    display: DisplaySize,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resize to the native dimensions of `image` and refit the display size.
    ///
    /// Like assigning `canvas.width`/`canvas.height`, this clears the pixels.
    pub fn resize_to(&mut self, image: &DecodedImage, bounds: DisplayBounds) {
        self.canvas = DecodedImage::blank(image.width, image.height);
        self.display = fit_display(image.width, image.height, bounds);
    }

    /// Recompute only the display size, e.g. after the container changed.
    pub fn refit(&mut self, bounds: DisplayBounds) {
        self.display = fit_display(self.canvas.width, self.canvas.height, bounds);
    }

    pub fn width(&self) -> u32 {
        self.canvas.width
    }

    pub fn height(&self) -> u32 {
        self.canvas.height
    }

    pub fn display(&self) -> DisplaySize {
        self.display
    }

    pub fn pixels(&self) -> &[u8] {
        &self.canvas.pixels
    }

    pub fn image(&self) -> &DecodedImage {
        &self.canvas
    }

    pub fn clear(&mut self) {
        self.canvas.pixels.fill(0);
    }

    /// Draw `src` over the whole surface through `filter`.
    ///
    /// `src` must have the surface's internal dimensions.
    pub fn draw_image(&mut self, src: &DecodedImage, filter: &FilterState) {
        debug_assert_eq!((src.width, src.height), (self.width(), self.height()));
        self.canvas.pixels.copy_from_slice(&src.pixels);
        apply_filter(&mut self.canvas.pixels, filter);
    }

    /// Redraw one rectangle of `src` through `filter`, leaving the rest alone.
    pub fn draw_region(&mut self, src: &DecodedImage, rect: PixelRect, filter: &FilterState) {
        let rect = rect.clamp_to(self.width(), self.height());
        if rect.is_empty() {
            return;
        }

        let mut patch = crop_pixels(src, rect);
        apply_filter(&mut patch.pixels, filter);

        let row_bytes = rect.width as usize * 3;
        for (row, y) in (rect.y..rect.bottom()).enumerate() {
            let dst = self.canvas.offset(rect.x, y);
            let src_start = row * row_bytes;
            self.canvas.pixels[dst..dst + row_bytes]
                .copy_from_slice(&patch.pixels[src_start..src_start + row_bytes]);
        }
    }

    /// Blend black over the whole surface at `alpha`.
    pub fn dim(&mut self, alpha: f32) {
        let keep = 1.0 - alpha.clamp(0.0, 1.0);
        for v in self.canvas.pixels.iter_mut() {
            *v = (*v as f32 * keep).round() as u8;
        }
    }

    /// Fill a rectangle with a solid colour. Coordinates may fall partly or
    /// entirely outside the surface; only the overlap is painted.
    pub fn fill_rect(&mut self, x: i64, y: i64, width: i64, height: i64, color: [u8; 3]) {
        let x0 = x.clamp(0, self.width() as i64);
        let y0 = y.clamp(0, self.height() as i64);
        let x1 = (x + width).clamp(0, self.width() as i64);
        let y1 = (y + height).clamp(0, self.height() as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        for py in y0..y1 {
            let start = self.canvas.offset(x0 as u32, py as u32);
            let end = self.canvas.offset(x1 as u32, py as u32);
            for px in self.canvas.pixels[start..end].chunks_exact_mut(3) {
                px.copy_from_slice(&color);
            }
        }
    }

    /// Stroke the outline of `rect` with a line centred on its edges.
    pub fn stroke_rect(&mut self, rect: PixelRect, color: [u8; 3], line_width: u32) {
        let lw = line_width as i64;
        let half = lw / 2;
        let (x, y) = (rect.x as i64, rect.y as i64);
        let (w, h) = (rect.width as i64, rect.height as i64);

        self.fill_rect(x - half, y - half, w + lw, lw, color);
        self.fill_rect(x - half, y + h - half, w + lw, lw, color);
        self.fill_rect(x - half, y - half, lw, h + lw, color);
        self.fill_rect(x + w - half, y - half, lw, h + lw, color);
    }

    /// Draw the crop overlay: dimmed mask, the selection re-rendered clear,
    /// its border and four corner handles.
    pub fn draw_selection_overlay(&mut self, src: &DecodedImage, rect: PixelRect, filter: &FilterState) {
        let rect = rect.clamp_to(self.width(), self.height());

        self.dim(MASK_ALPHA);
        self.draw_region(src, rect, filter);
        self.stroke_rect(rect, SELECTION_COLOR, SELECTION_LINE_WIDTH);

        let size = HANDLE_SIZE as i64;
        let half = size / 2;
        let corners = [
            (rect.x, rect.y),
            (rect.right(), rect.y),
            (rect.x, rect.bottom()),
            (rect.right(), rect.bottom()),
        ];
        for (cx, cy) in corners {
            self.fill_rect(cx as i64 - half, cy as i64 - half, size, size, SELECTION_COLOR);
        }
    }

    /// The surface as RGBA bytes, suitable for `ImageData`.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.canvas.pixel_count() * 4);
        for px in self.canvas.pixels.chunks_exact(3) {
            out.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, value: u8) -> DecodedImage {
        DecodedImage::new(width, height, vec![value; (width * height * 3) as usize])
    }

    fn surface_for(image: &DecodedImage) -> Surface {
        let mut surface = Surface::new();
        surface.resize_to(image, DisplayBounds::new(800.0, 600.0));
        surface
    }

    #[test]
    fn test_resize_matches_image() {
        let img = solid(4000, 30, 1);
        let surface = surface_for(&img);
        assert_eq!((surface.width(), surface.height()), (4000, 30));
        assert_eq!(surface.display(), DisplaySize::new(800.0, 6.0));
        assert!(surface.pixels().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_draw_image_neutral_copies_source() {
        let img = DecodedImage::new(2, 1, vec![1, 2, 3, 4, 5, 6]);
        let mut surface = surface_for(&img);
        surface.draw_image(&img, &FilterState::default());
        assert_eq!(surface.pixels(), img.pixels.as_slice());
    }

    #[test]
    fn test_clear() {
        let img = solid(3, 3, 200);
        let mut surface = surface_for(&img);
        surface.draw_image(&img, &FilterState::default());
        surface.clear();
        assert!(surface.pixels().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_dim_halves() {
        let img = solid(2, 2, 200);
        let mut surface = surface_for(&img);
        surface.draw_image(&img, &FilterState::default());
        surface.dim(MASK_ALPHA);
        assert!(surface.pixels().iter().all(|&v| v == 100));
    }

    #[test]
    fn test_draw_region_only_touches_rect() {
        let img = solid(10, 10, 200);
        let mut surface = surface_for(&img);
        surface.draw_region(&img, PixelRect::new(2, 2, 3, 3), &FilterState::default());

        let out = surface.image();
        assert_eq!(out.pixel(2, 2), [200, 200, 200]);
        assert_eq!(out.pixel(4, 4), [200, 200, 200]);
        assert_eq!(out.pixel(5, 5), [0, 0, 0]);
        assert_eq!(out.pixel(1, 2), [0, 0, 0]);
    }

    #[test]
    fn test_fill_rect_clips_negative() {
        let img = solid(10, 10, 0);
        let mut surface = surface_for(&img);
        surface.fill_rect(-5, -5, 10, 10, [9, 9, 9]);

        let out = surface.image();
        assert_eq!(out.pixel(0, 0), [9, 9, 9]);
        assert_eq!(out.pixel(4, 4), [9, 9, 9]);
        assert_eq!(out.pixel(5, 5), [0, 0, 0]);
    }

    #[test]
    fn test_fill_rect_fully_outside() {
        let img = solid(4, 4, 7);
        let mut surface = surface_for(&img);
        surface.draw_image(&img, &FilterState::default());
        surface.fill_rect(10, 10, 5, 5, [1, 1, 1]);
        surface.fill_rect(-10, 0, 5, 5, [1, 1, 1]);
        assert!(surface.pixels().iter().all(|&v| v == 7));
    }

    #[test]
    fn test_stroke_rect_edges() {
        let img = solid(20, 20, 0);
        let mut surface = surface_for(&img);
        surface.stroke_rect(PixelRect::new(5, 5, 10, 10), SELECTION_COLOR, 2);

        let out = surface.image();
        assert_eq!(out.pixel(4, 4), SELECTION_COLOR);
        assert_eq!(out.pixel(15, 10), SELECTION_COLOR);
        assert_eq!(out.pixel(10, 10), [0, 0, 0]);
        assert_eq!(out.pixel(3, 10), [0, 0, 0]);
    }

    #[test]
    fn test_selection_overlay() {
        let img = solid(40, 40, 200);
        let mut surface = surface_for(&img);
        surface.draw_image(&img, &FilterState::default());
        surface.draw_selection_overlay(&img, PixelRect::new(10, 10, 20, 20), &FilterState::default());

        let out = surface.image();
        // Outside the selection: dimmed
        assert_eq!(out.pixel(2, 35), [100, 100, 100]);
        // Inside the selection, away from border and handles: clear
        assert_eq!(out.pixel(20, 20), [200, 200, 200]);
        // Corner handle
        assert_eq!(out.pixel(6, 6), SELECTION_COLOR);
    }

    #[test]
    fn test_to_rgba() {
        let img = DecodedImage::new(2, 1, vec![1, 2, 3, 4, 5, 6]);
        let mut surface = surface_for(&img);
        surface.draw_image(&img, &FilterState::default());
        assert_eq!(surface.to_rgba(), vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }
}
