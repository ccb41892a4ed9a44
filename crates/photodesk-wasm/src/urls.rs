//! Object URLs backed by the browser's `URL.createObjectURL`.

use js_sys::{Array, Uint8Array};
use photodesk_core::session::SessionError;
use photodesk_core::{ObjectUrl, ObjectUrlAllocator};
use wasm_bindgen::JsValue;
use web_sys::{console, Blob, BlobPropertyBag, Url};

/// Allocates `blob:` URLs for image bytes and revokes them on release.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserObjectUrls;

impl ObjectUrlAllocator for BrowserObjectUrls {
    fn acquire(&self, bytes: &[u8], mime: &str) -> Result<ObjectUrl, SessionError> {
        let parts = Array::of1(&Uint8Array::from(bytes));
        let options = BlobPropertyBag::new();
        options.set_type(mime);

        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(allocation_error)?;
        let url = Url::create_object_url_with_blob(&blob).map_err(allocation_error)?;
        Ok(ObjectUrl::new(url))
    }

    fn release(&self, url: &ObjectUrl) {
        if let Err(e) = Url::revoke_object_url(url.as_str()) {
            console::warn_2(&JsValue::from_str("failed to revoke object URL"), &e);
        }
    }
}

fn allocation_error(value: JsValue) -> SessionError {
    SessionError::Allocation(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}
