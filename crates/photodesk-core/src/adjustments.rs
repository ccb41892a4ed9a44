//! Colour filter compositing.
//!
//! The editor exposes four filters with CSS filter semantics:
//!
//! 1. `brightness((100 + b)%)`
//! 2. `contrast((100 + c)%)`
//! 3. `saturate((100 + s)%)`
//! 4. `hue-rotate(h deg)`
//!
//! All four are affine in RGB, so they are folded into a single
//! [`ColorTransform`] and applied in one pass. Values are clamped to the
//! displayable range once, after the composed transform.

use crate::FilterState;

// Luminance weights used by the CSS filter matrices.
const LUMA_R: f32 = 0.213;
const LUMA_G: f32 = 0.715;
const LUMA_B: f32 = 0.072;

/// An affine RGB transform: `out = matrix * in + offset`, channels in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorTransform {
    pub matrix: [[f32; 3]; 3],
    pub offset: [f32; 3],
}

impl Default for ColorTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl ColorTransform {
    pub fn identity() -> Self {
        Self {
            matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            offset: [0.0; 3],
        }
    }

    /// `brightness(amount)`: scales every channel.
    pub fn brightness(amount: f32) -> Self {
        Self {
            matrix: [[amount, 0.0, 0.0], [0.0, amount, 0.0], [0.0, 0.0, amount]],
            offset: [0.0; 3],
        }
    }

    /// `contrast(amount)`: scales every channel around the 0.5 midpoint.
    pub fn contrast(amount: f32) -> Self {
        let intercept = 0.5 - 0.5 * amount;
        Self {
            matrix: [[amount, 0.0, 0.0], [0.0, amount, 0.0], [0.0, 0.0, amount]],
            offset: [intercept; 3],
        }
    }

    /// `saturate(amount)`: 0 is fully desaturated, 1 is unchanged.
    pub fn saturate(s: f32) -> Self {
        Self {
            matrix: [
                [LUMA_R + 0.787 * s, LUMA_G - LUMA_G * s, LUMA_B - LUMA_B * s],
                [LUMA_R - LUMA_R * s, LUMA_G + 0.285 * s, LUMA_B - LUMA_B * s],
                [LUMA_R - LUMA_R * s, LUMA_G - LUMA_G * s, LUMA_B + 0.928 * s],
            ],
            offset: [0.0; 3],
        }
    }

    /// `hue-rotate(degrees)`.
    pub fn hue_rotate(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            matrix: [
                [
                    LUMA_R + cos * 0.787 - sin * LUMA_R,
                    LUMA_G - cos * LUMA_G - sin * LUMA_G,
                    LUMA_B - cos * LUMA_B + sin * 0.928,
                ],
                [
                    LUMA_R - cos * LUMA_R + sin * 0.143,
                    LUMA_G + cos * 0.285 + sin * 0.140,
                    LUMA_B - cos * LUMA_B - sin * 0.283,
                ],
                [
                    LUMA_R - cos * LUMA_R - sin * 0.787,
                    LUMA_G - cos * LUMA_G + sin * LUMA_G,
                    LUMA_B + cos * 0.928 + sin * LUMA_B,
                ],
            ],
            offset: [0.0; 3],
        }
    }

    /// Compose the four editor filters, in order, into one transform.
    ///
    /// Neutral stages are skipped so they contribute no rounding error.
    pub fn from_filter(filter: &FilterState) -> Self {
        let mut transform = Self::identity();
        if filter.brightness != 0.0 {
            transform = transform.then(&Self::brightness(filter.brightness_factor()));
        }
        if filter.contrast != 0.0 {
            transform = transform.then(&Self::contrast(filter.contrast_factor()));
        }
        if filter.saturation != 0.0 {
            transform = transform.then(&Self::saturate(filter.saturation_factor()));
        }
        if filter.hue != 0.0 {
            transform = transform.then(&Self::hue_rotate(filter.hue));
        }
        transform
    }

    /// Returns the transform that applies `self` first and `next` second.
    pub fn then(&self, next: &ColorTransform) -> ColorTransform {
        let mut matrix = [[0.0f32; 3]; 3];
        let mut offset = [0.0f32; 3];
        for row in 0..3 {
            for col in 0..3 {
                matrix[row][col] = (0..3).map(|k| next.matrix[row][k] * self.matrix[k][col]).sum();
            }
            offset[row] = (0..3)
                .map(|k| next.matrix[row][k] * self.offset[k])
                .sum::<f32>()
                + next.offset[row];
        }
        ColorTransform { matrix, offset }
    }

    /// Apply to one normalized RGB triple, clamping the result.
    #[inline]
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let mut out = [0.0f32; 3];
        for (row, value) in out.iter_mut().enumerate() {
            let m = &self.matrix[row];
            *value = (m[0] * rgb[0] + m[1] * rgb[1] + m[2] * rgb[2] + self.offset[row]).clamp(0.0, 1.0);
        }
        out
    }
}

/// Apply the filter state to RGB pixel data in place.
///
/// A neutral filter leaves the buffer untouched, which keeps unfiltered
/// renders pixel-identical to the source.
pub fn apply_filter(pixels: &mut [u8], filter: &FilterState) {
    if filter.is_neutral() {
        return;
    }

    let transform = ColorTransform::from_filter(filter);
    for chunk in pixels.chunks_exact_mut(3) {
        let rgb = [
            chunk[0] as f32 / 255.0,
            chunk[1] as f32 / 255.0,
            chunk[2] as f32 / 255.0,
        ];
        let out = transform.apply(rgb);
        chunk[0] = (out[0] * 255.0).round() as u8;
        chunk[1] = (out[1] * 255.0).round() as u8;
        chunk[2] = (out[2] * 255.0).round() as u8;
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn filter_strategy() -> impl Strategy<Value = FilterState> {
        (
            -100.0f32..=100.0,
            -100.0f32..=100.0,
            -100.0f32..=100.0,
            -180.0f32..=180.0,
        )
            .prop_map(|(b, c, s, h)| FilterState::clamped(b, c, s, h))
    }

    proptest! {
        /// Property: filtering the same input twice gives identical output.
        #[test]
        fn prop_filter_idempotent_render(
            filter in filter_strategy(),
            pixels in prop::collection::vec(any::<u8>(), 3..=300),
        ) {
            let len = pixels.len() / 3 * 3;
            let mut a = pixels[..len].to_vec();
            let mut b = pixels[..len].to_vec();
            apply_filter(&mut a, &filter);
            apply_filter(&mut b, &filter);
            prop_assert_eq!(a, b);
        }

        /// Property: buffer length is preserved.
        #[test]
        fn prop_length_preserved(
            filter in filter_strategy(),
            pixels in prop::collection::vec(any::<u8>(), 0..=90),
        ) {
            let mut out = pixels.clone();
            apply_filter(&mut out, &filter);
            prop_assert_eq!(out.len(), pixels.len());
        }
    }
}
