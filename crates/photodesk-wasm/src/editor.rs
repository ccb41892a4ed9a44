//! The editor session exposed to the browser.
//!
//! The host owns the network: it calls `begin_load`, fetches
//! `/images/{id}/file?v={version}` itself and hands the bytes back with the
//! ticket. Saving works the same way through `begin_save`/`finish_save`.

use photodesk_core::client::ApiError;
use photodesk_core::{DisplayBounds, EditorSession, FilterState, Point};
use wasm_bindgen::prelude::*;

use crate::types::{js_error, to_version, JsDisplaySize, JsLoadTicket};
use crate::urls::BrowserObjectUrls;

#[wasm_bindgen]
pub struct JsImageEditor {
    session: EditorSession<BrowserObjectUrls>,
}

#[wasm_bindgen]
impl JsImageEditor {
    /// Create an editor sized for a container of `container_width` pixels
    /// in a viewport `viewport_height` pixels high.
    #[wasm_bindgen(constructor)]
    pub fn new(container_width: f64, viewport_height: f64) -> JsImageEditor {
        let bounds = DisplayBounds::from_container(container_width, viewport_height);
        JsImageEditor {
            session: EditorSession::new(BrowserObjectUrls, bounds),
        }
    }

    /// Recompute the display size after the container or window resized.
    pub fn set_container(&mut self, container_width: f64, viewport_height: f64) {
        self.session
            .set_bounds(DisplayBounds::from_container(container_width, viewport_height));
    }

    // ===== Loading =====

    /// Fails while a save is in flight.
    pub fn begin_load(&mut self, version: f64) -> Result<JsLoadTicket, JsValue> {
        self.session
            .begin_load(to_version(version))
            .map(JsLoadTicket::from_ticket)
            .map_err(js_error)
    }

    /// Returns `false` if the ticket was superseded and the bytes ignored.
    pub fn complete_load(&mut self, ticket: &JsLoadTicket, bytes: &[u8], content_type: &str) -> Result<bool, JsValue> {
        self.session
            .complete_load(ticket.ticket(), bytes, content_type)
            .map_err(js_error)
    }

    pub fn fail_load(&mut self, ticket: &JsLoadTicket, message: &str) -> Result<bool, JsValue> {
        self.session.fail_load(ticket.ticket(), message).map_err(js_error)
    }

    // ===== Filters =====

    pub fn set_brightness(&mut self, value: f32) -> Result<(), JsValue> {
        self.session.set_brightness(value).map_err(js_error)
    }

    pub fn set_contrast(&mut self, value: f32) -> Result<(), JsValue> {
        self.session.set_contrast(value).map_err(js_error)
    }

    pub fn set_saturation(&mut self, value: f32) -> Result<(), JsValue> {
        self.session.set_saturation(value).map_err(js_error)
    }

    pub fn set_hue(&mut self, value: f32) -> Result<(), JsValue> {
        self.session.set_hue(value).map_err(js_error)
    }

    /// Current filter values as `{ brightness, contrast, saturation, hue }`.
    pub fn filter(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.session.filter()).map_err(js_error)
    }

    /// Set all filter values from an object shaped like [`Self::filter`].
    pub fn set_filter(&mut self, value: JsValue) -> Result<(), JsValue> {
        let filter: FilterState = serde_wasm_bindgen::from_value(value).map_err(js_error)?;
        self.session.set_filter(filter).map_err(js_error)
    }

    // ===== Crop =====

    pub fn set_crop_mode(&mut self, enabled: bool) -> Result<(), JsValue> {
        self.session.set_crop_mode(enabled).map_err(js_error)
    }

    pub fn toggle_crop_mode(&mut self) -> Result<(), JsValue> {
        self.session.toggle_crop_mode().map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn crop_active(&self) -> bool {
        self.session.crop_mode().is_active()
    }

    /// Coordinates are relative to the canvas element's bounding box.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.session.pointer_down(Point::new(x, y))
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.session.pointer_move(Point::new(x, y))
    }

    pub fn pointer_up(&mut self) -> bool {
        self.session.pointer_up()
    }

    pub fn pointer_leave(&mut self) -> bool {
        self.session.pointer_up()
    }

    pub fn commit_crop(&mut self) -> Result<(), JsValue> {
        self.session.commit_crop().map(|_| ()).map_err(js_error)
    }

    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.session.reset().map_err(js_error)
    }

    pub fn revert(&mut self) -> Result<(), JsValue> {
        self.session.revert().map_err(js_error)
    }

    // ===== Rendering =====

    /// RGBA pixels of the current frame for `ImageData`, or `undefined`
    /// while no image is loaded.
    pub fn render(&mut self) -> Option<Vec<u8>> {
        self.session.frame().map(|surface| surface.to_rgba())
    }

    /// Internal canvas width (the working image's native width).
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.session.internal_size().map_or(0, |(w, _)| w)
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.session.internal_size().map_or(0, |(_, h)| h)
    }

    /// CSS size to give the canvas element.
    pub fn display_size(&self) -> JsDisplaySize {
        self.session.display_size().into()
    }

    #[wasm_bindgen(getter)]
    pub fn object_url(&self) -> Option<String> {
        self.session.object_url().map(|url| url.to_string())
    }

    /// EXIF summary of the loaded file.
    pub fn exif(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.session.exif()).map_err(js_error)
    }

    /// Google Maps link for the GPS position, if the file has one.
    pub fn maps_link(&self) -> Option<String> {
        self.session.exif().maps_link()
    }

    // ===== Saving =====

    /// Encode the current image and return the data URL to upload.
    pub fn begin_save(&mut self) -> Result<String, JsValue> {
        self.session
            .begin_save()
            .map(|payload| payload.data_url)
            .map_err(js_error)
    }

    /// Report a successful upload. Returns the version to reload with.
    pub fn finish_save(&mut self) -> Result<f64, JsValue> {
        self.session
            .finish_save(Ok(()))
            .map(|version| version.value() as f64)
            .map_err(js_error)
    }

    /// Report a failed upload with the response status and body.
    pub fn fail_save(&mut self, status: u16, body: &str) -> Result<(), JsValue> {
        let error = ApiError::from_response(status, body);
        self.session.finish_save(Err(error)).map(|_| ()).map_err(js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn can_save(&self) -> bool {
        self.session.can_save()
    }

    #[wasm_bindgen(getter)]
    pub fn version(&self) -> f64 {
        self.session.version().value() as f64
    }

    /// One of `"notReady"`, `"ready"`, `"saving"`, `"saved"`.
    pub fn status(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.session.status()).map_err(js_error)
    }

    /// Notifications raised since the last call, as an array of
    /// `{ kind, message, blocking, retryable }`.
    pub fn take_notifications(&mut self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.session.drain_notifications()).map_err(js_error)
    }

    /// Release the object URL and drop the image.
    pub fn close(&mut self) {
        self.session.close();
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        photodesk_core::encode::encode_jpeg(&vec![160u8; (width * height * 3) as usize], width, height, 90).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_load_render_and_save() {
        let mut editor = JsImageEditor::new(432.0, 1000.0);
        let ticket = editor.begin_load(1.0).unwrap();
        assert!(editor.complete_load(&ticket, &jpeg(800, 600), "image/jpeg").unwrap());

        assert_eq!((editor.width(), editor.height()), (800, 600));
        let size = editor.display_size();
        assert_eq!((size.width(), size.height()), (400.0, 300.0));
        assert!(editor.object_url().unwrap().starts_with("blob:"));
        assert_eq!(editor.maps_link(), None);

        let rgba = editor.render().unwrap();
        assert_eq!(rgba.len(), 800 * 600 * 4);

        editor.set_brightness(20.0).unwrap();
        let url = editor.begin_save().unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
        assert_eq!(editor.finish_save().unwrap(), 2.0);
        assert!(editor.set_hue(10.0).is_err());
    }

    #[wasm_bindgen_test]
    fn test_stale_ticket_is_ignored() {
        let mut editor = JsImageEditor::new(432.0, 1000.0);
        let old = editor.begin_load(1.0).unwrap();
        let new = editor.begin_load(2.0).unwrap();
        assert!(editor.complete_load(&new, &jpeg(40, 30), "image/jpeg").unwrap());
        assert!(!editor.complete_load(&old, &jpeg(20, 20), "image/jpeg").unwrap());
        assert_eq!(editor.width(), 40);
    }

    #[wasm_bindgen_test]
    fn test_crop_through_pointer_events() {
        let mut editor = JsImageEditor::new(432.0, 1000.0);
        let ticket = editor.begin_load(1.0).unwrap();
        editor.complete_load(&ticket, &jpeg(800, 600), "image/jpeg").unwrap();

        editor.toggle_crop_mode().unwrap();
        assert!(editor.pointer_down(0.0, 0.0));
        assert!(editor.pointer_move(100.0, 50.0));
        assert!(editor.pointer_leave());
        editor.commit_crop().unwrap();

        assert_eq!((editor.width(), editor.height()), (200, 100));
        assert!(!editor.crop_active());
    }

    #[wasm_bindgen_test]
    fn test_failed_save_is_reported() {
        let mut editor = JsImageEditor::new(432.0, 1000.0);
        let ticket = editor.begin_load(1.0).unwrap();
        editor.complete_load(&ticket, &jpeg(40, 30), "image/jpeg").unwrap();

        editor.begin_save().unwrap();
        assert!(editor.fail_save(500, r#"{"error":"Failed to save image"}"#).is_err());
        assert!(editor.can_save());
        assert!(editor.take_notifications().unwrap().is_object());
    }
}
