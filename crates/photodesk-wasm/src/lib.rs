//! Photodesk WASM - WebAssembly bindings for the Photodesk image editor
//!
//! This crate exposes the photodesk-core editor to the browser UI.
//!
//! # Module Structure
//!
//! - `editor` - [`JsImageEditor`], the editing session driven by the host
//! - `urls` - `blob:` object URLs via `URL.createObjectURL`
//! - `geometry` - display sizing
//! - `encode` - JPEG and data URL encoding
//! - `logging` - `tracing` output to the browser console
//! - `types` - small value types passed across the boundary
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsImageEditor } from '@photodesk/wasm';
//!
//! await init();
//!
//! const editor = new JsImageEditor(container.clientWidth, window.innerHeight);
//! const ticket = editor.begin_load(version);
//! const res = await fetch(`/api/v1/images/${id}/file?v=${version}`);
//! editor.complete_load(ticket, new Uint8Array(await res.arrayBuffer()), res.headers.get('content-type'));
//! ctx.putImageData(new ImageData(new Uint8ClampedArray(editor.render()), editor.width, editor.height), 0, 0);
//! ```

use wasm_bindgen::prelude::*;

mod editor;
mod encode;
mod geometry;
mod logging;
mod types;
mod urls;

pub use editor::JsImageEditor;
pub use encode::{encode_data_url, encode_jpeg};
pub use geometry::fit_display;
pub use types::{JsDisplaySize, JsLoadTicket};
pub use urls::BrowserObjectUrls;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logging::install();
    tracing::info!(version = %version(), "photodesk-wasm ready");
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
