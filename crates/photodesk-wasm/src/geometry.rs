//! Display sizing bindings.

use photodesk_core::geometry;
use photodesk_core::DisplayBounds;
use wasm_bindgen::prelude::*;

use crate::types::JsDisplaySize;

/// Fit an image into the editor viewport.
///
/// `container_width` is the width of the element hosting the canvas and
/// `viewport_height` is `window.innerHeight`; padding and the viewport
/// fraction are applied here.
#[wasm_bindgen]
pub fn fit_display(native_width: u32, native_height: u32, container_width: f64, viewport_height: f64) -> JsDisplaySize {
    let bounds = DisplayBounds::from_container(container_width, viewport_height);
    geometry::fit_display(native_width, native_height, bounds).into()
}
