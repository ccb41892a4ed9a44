//! JavaScript-facing value types shared by the bindings.

use photodesk_core::{DisplaySize, LoadTicket, SessionVersion};
use wasm_bindgen::prelude::*;

/// Handle for a load started with `JsImageEditor::begin_load`.
///
/// Pass it back with the fetched bytes so results of superseded loads can be
/// recognized and dropped.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy)]
pub struct JsLoadTicket {
    inner: LoadTicket,
}

#[wasm_bindgen]
impl JsLoadTicket {
    /// Version this load was started for.
    #[wasm_bindgen(getter)]
    pub fn version(&self) -> f64 {
        self.inner.version.value() as f64
    }
}

impl JsLoadTicket {
    pub(crate) fn from_ticket(inner: LoadTicket) -> Self {
        Self { inner }
    }

    pub(crate) fn ticket(&self) -> LoadTicket {
        self.inner
    }
}

/// CSS size of the displayed canvas.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsDisplaySize {
    width: f64,
    height: f64,
}

#[wasm_bindgen]
impl JsDisplaySize {
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> f64 {
        self.height
    }
}

impl From<DisplaySize> for JsDisplaySize {
    fn from(size: DisplaySize) -> Self {
        Self {
            width: size.width,
            height: size.height,
        }
    }
}

/// Convert a JavaScript number into a version token.
///
/// Negative, fractional and non-finite values are truncated into range.
pub(crate) fn to_version(value: f64) -> SessionVersion {
    if !value.is_finite() || value <= 0.0 {
        return SessionVersion::new(0);
    }
    SessionVersion::new(value.min(u64::MAX as f64) as u64)
}

pub(crate) fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}
