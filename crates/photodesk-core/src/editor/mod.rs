//! The editing session.
//!
//! [`EditorSession`] holds one image for the lifetime of an edit: the working
//! raster, the non-destructive [`FilterState`], the crop interaction and the
//! drawing surface they are rendered into. Loading and saving are split into
//! begin/complete halves so the network calls can run without borrowing the
//! session; see [`crate::client`] for the async drivers.

mod notify;

pub use notify::{EditorError, Notification, NotificationKind};

use tracing::{debug, info, warn};

use crate::adjustments::apply_filter;
use crate::client::ApiError;
use crate::decode::{decode_image, decode_image_no_orientation, DecodedImage};
use crate::encode::{encode_data_url, encode_jpeg_image, EDITOR_JPEG_QUALITY};
use crate::geometry::{display_to_internal, DisplayBounds, DisplaySize, Point};
use crate::metadata::ExifSummary;
use crate::session::{HandleSlot, InMemoryObjectUrls, LoadTicket, ObjectUrl, ObjectUrlAllocator, SessionVersion};
use crate::surface::Surface;
use crate::transform::{crop_pixels, CropMode, CropSelection, PixelRect};
use crate::FilterState;

const CROPPED_MIME: &str = "image/jpeg";

/// Where the session stands with respect to loading and saving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EditorStatus {
    /// No image, or a load is pending or failed. Saving is disabled.
    #[default]
    NotReady,
    Ready,
    /// A save is in flight.
    Saving,
    /// The edit was persisted; the session is read-only until reloaded.
    Saved,
}

/// Encoded image ready to be sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePayload {
    pub data_url: String,
    pub width: u32,
    pub height: u32,
}

/// The image as it was loaded, kept so edits can be reverted without a refetch.
#[derive(Debug)]
struct LoadedSource {
    image: DecodedImage,
    bytes: Vec<u8>,
    content_type: String,
}

#[derive(Debug)]
pub struct EditorSession<A: ObjectUrlAllocator = InMemoryObjectUrls> {
    bounds: DisplayBounds,
    version: SessionVersion,
    pending: Option<LoadTicket>,
    status: EditorStatus,
    original: Option<LoadedSource>,
    working: Option<DecodedImage>,
    exif: ExifSummary,
    surface: Surface,
    filter: FilterState,
    crop_mode: CropMode,
    selection: CropSelection,
    handle: HandleSlot<A>,
    notifications: Vec<Notification>,
    dirty: bool,
}

impl<A: ObjectUrlAllocator> EditorSession<A> {
    pub fn new(allocator: A, bounds: DisplayBounds) -> Self {
        Self {
            bounds,
            version: SessionVersion::default(),
            pending: None,
            status: EditorStatus::NotReady,
            original: None,
            working: None,
            exif: ExifSummary::default(),
            surface: Surface::new(),
            filter: FilterState::new(),
            crop_mode: CropMode::Idle,
            selection: CropSelection::default(),
            handle: HandleSlot::new(allocator),
            notifications: Vec::new(),
            dirty: false,
        }
    }

    // ===== Loading =====

    /// Start loading the image at `version`.
    ///
    /// Any load started earlier becomes stale; its completion will be
    /// discarded. Saving is disabled until the load completes. Refused while
    /// a save is in flight, so its outcome is always recorded.
    pub fn begin_load(&mut self, version: SessionVersion) -> Result<LoadTicket, EditorError> {
        if self.status == EditorStatus::Saving {
            return Err(EditorError::SaveInFlight);
        }
        let ticket = LoadTicket { version };
        if let Some(previous) = self.pending.replace(ticket) {
            debug!(previous = %previous.version, version = %version, "superseding pending load");
        }
        self.version = version;
        self.status = EditorStatus::NotReady;
        Ok(ticket)
    }

    /// Install the fetched bytes for `ticket`.
    ///
    /// Returns `Ok(false)` if the ticket is stale and the bytes were ignored.
    pub fn complete_load(&mut self, ticket: LoadTicket, bytes: &[u8], content_type: &str) -> Result<bool, EditorError> {
        if !self.take_pending(ticket) {
            debug!(stale = %ticket.version, current = %self.version, "discarding stale load");
            return Ok(false);
        }

        let image = match decode_image(bytes) {
            Ok(image) => image,
            Err(e) => return Err(self.load_failed(e.to_string())),
        };
        if let Err(e) = self.handle.replace(bytes, content_type).map(|_| ()) {
            return Err(self.load_failed(e.to_string()));
        }

        info!(
            version = %ticket.version,
            width = image.width,
            height = image.height,
            "image loaded"
        );

        self.exif = ExifSummary::from_bytes(bytes);
        self.original = Some(LoadedSource {
            image: image.clone(),
            bytes: bytes.to_vec(),
            content_type: content_type.to_string(),
        });
        self.install(image);
        self.filter = FilterState::new();
        self.status = EditorStatus::Ready;
        Ok(true)
    }

    /// Record that fetching the image for `ticket` failed.
    ///
    /// Returns `Ok(false)` if the ticket is stale.
    pub fn fail_load(&mut self, ticket: LoadTicket, message: &str) -> Result<bool, EditorError> {
        if !self.take_pending(ticket) {
            debug!(stale = %ticket.version, current = %self.version, "discarding stale load failure");
            return Ok(false);
        }
        Err(self.load_failed(message.to_string()))
    }

    fn take_pending(&mut self, ticket: LoadTicket) -> bool {
        if self.pending == Some(ticket) && ticket.version == self.version {
            self.pending = None;
            true
        } else {
            false
        }
    }

    fn load_failed(&mut self, message: String) -> EditorError {
        warn!(version = %self.version, "image load failed: {message}");
        self.handle.clear();
        self.original = None;
        self.working = None;
        self.surface = Surface::new();
        self.crop_mode = CropMode::Idle;
        self.selection = CropSelection::default();
        self.status = EditorStatus::NotReady;
        let error = EditorError::Load(message);
        self.notify(Notification::load_failure(error.to_string()));
        error
    }

    /// Make `image` the working image and size the surface to it.
    fn install(&mut self, image: DecodedImage) {
        self.surface.resize_to(&image, self.bounds);
        self.working = Some(image);
        self.crop_mode = CropMode::Idle;
        self.selection = CropSelection::default();
        self.dirty = true;
    }

    /// Release the session's resources. The session can be reused by
    /// starting a new load.
    pub fn close(&mut self) {
        self.handle.clear();
        self.pending = None;
        self.original = None;
        self.working = None;
        self.surface = Surface::new();
        self.filter = FilterState::new();
        self.crop_mode = CropMode::Idle;
        self.selection = CropSelection::default();
        self.status = EditorStatus::NotReady;
        self.dirty = false;
    }

    // ===== Filters =====

    pub fn set_filter(&mut self, filter: FilterState) -> Result<(), EditorError> {
        self.ensure_editable()?;
        let filter = FilterState::clamped(filter.brightness, filter.contrast, filter.saturation, filter.hue);
        if filter != self.filter {
            self.filter = filter;
            self.dirty = true;
        }
        Ok(())
    }

    pub fn set_brightness(&mut self, value: f32) -> Result<(), EditorError> {
        self.set_filter(FilterState {
            brightness: value,
            ..self.filter
        })
    }

    pub fn set_contrast(&mut self, value: f32) -> Result<(), EditorError> {
        self.set_filter(FilterState {
            contrast: value,
            ..self.filter
        })
    }

    pub fn set_saturation(&mut self, value: f32) -> Result<(), EditorError> {
        self.set_filter(FilterState {
            saturation: value,
            ..self.filter
        })
    }

    pub fn set_hue(&mut self, value: f32) -> Result<(), EditorError> {
        self.set_filter(FilterState {
            hue: value,
            ..self.filter
        })
    }

    // ===== Crop =====

    /// Enter or leave crop mode. Either way the selection is cleared.
    pub fn set_crop_mode(&mut self, enabled: bool) -> Result<(), EditorError> {
        self.ensure_editable()?;
        if enabled && self.working.is_none() {
            return Err(EditorError::NotReady);
        }
        self.crop_mode = if enabled { CropMode::Armed } else { CropMode::Idle };
        self.selection = CropSelection::default();
        self.dirty = true;
        Ok(())
    }

    pub fn toggle_crop_mode(&mut self) -> Result<(), EditorError> {
        self.set_crop_mode(!self.crop_mode.is_active())
    }

    /// Start a selection at a point relative to the displayed canvas.
    ///
    /// Returns whether the event was consumed.
    pub fn pointer_down(&mut self, point: Point) -> bool {
        if !self.crop_mode.is_active() || !self.is_editable() {
            return false;
        }
        let Some(internal) = self.to_internal(point) else {
            return false;
        };
        self.selection = CropSelection::at(internal);
        self.crop_mode = CropMode::Selecting;
        self.dirty = true;
        true
    }

    pub fn pointer_move(&mut self, point: Point) -> bool {
        if self.crop_mode != CropMode::Selecting || !self.is_editable() {
            return false;
        }
        let Some(internal) = self.to_internal(point) else {
            return false;
        };
        if internal != self.selection.end {
            self.selection.end = internal;
            self.dirty = true;
        }
        true
    }

    /// Freeze the selection. Also used when the pointer leaves the canvas.
    pub fn pointer_up(&mut self) -> bool {
        if self.crop_mode != CropMode::Selecting {
            return false;
        }
        self.crop_mode = CropMode::Selected;
        true
    }

    fn to_internal(&self, point: Point) -> Option<Point> {
        let image = self.working.as_ref()?;
        Some(display_to_internal(point, self.surface.display(), image.width, image.height))
    }

    /// The current selection in internal pixels, if one has been started.
    pub fn selection_rect(&self) -> Option<PixelRect> {
        match self.crop_mode {
            CropMode::Selecting | CropMode::Selected => {
                let image = self.working.as_ref()?;
                Some(self.selection.pixel_rect(image.width, image.height))
            }
            CropMode::Idle | CropMode::Armed => None,
        }
    }

    /// Replace the working image with the selected region.
    ///
    /// The current filters are baked into the result and reset to neutral.
    /// An empty selection, or one still being dragged, is rejected without
    /// touching any state.
    pub fn commit_crop(&mut self) -> Result<PixelRect, EditorError> {
        self.ensure_editable()?;
        if self.working.is_none() {
            return Err(EditorError::NotReady);
        }

        let rect = match self.selection_rect() {
            Some(rect) if self.crop_mode == CropMode::Selected && !rect.is_empty() => rect,
            _ => {
                let error = EditorError::Validation("Select an area to crop first".to_string());
                self.notify(Notification::validation_failure(error.to_string()));
                return Err(error);
            }
        };

        let composite = self.composite().ok_or(EditorError::NotReady)?;
        let region = crop_pixels(&composite, rect);

        let processed = encode_jpeg_image(&region, EDITOR_JPEG_QUALITY)
            .map_err(|e| e.to_string())
            .and_then(|jpeg| {
                let image = decode_image_no_orientation(&jpeg).map_err(|e| e.to_string())?;
                Ok((jpeg, image))
            });
        let (jpeg, cropped) = match processed {
            Ok(result) => result,
            Err(message) => {
                warn!("crop failed: {message}");
                let error = EditorError::Processing(message);
                self.notify(Notification::validation_failure(error.to_string()));
                return Err(error);
            }
        };

        if let Err(e) = self.handle.replace(&jpeg, CROPPED_MIME).map(|_| ()) {
            let error = EditorError::Resource(e.to_string());
            self.notify(Notification::validation_failure(error.to_string()));
            return Err(error);
        }

        info!(x = rect.x, y = rect.y, width = rect.width, height = rect.height, "crop committed");
        self.install(cropped);
        self.filter = FilterState::new();
        Ok(rect)
    }

    // ===== Reset =====

    /// Clear filters and any in-progress selection. A committed crop stays.
    pub fn reset(&mut self) -> Result<(), EditorError> {
        self.ensure_editable()?;
        self.filter = FilterState::new();
        self.crop_mode = CropMode::Idle;
        self.selection = CropSelection::default();
        self.dirty = true;
        Ok(())
    }

    /// Reset, and also go back to the image as it was loaded.
    pub fn revert(&mut self) -> Result<(), EditorError> {
        self.ensure_editable()?;
        let Some(original) = self.original.as_ref() else {
            return Err(EditorError::NotReady);
        };
        let image = original.image.clone();
        if let Err(e) = self.handle.replace(&original.bytes, &original.content_type).map(|_| ()) {
            let error = EditorError::Resource(e.to_string());
            self.notify(Notification::validation_failure(error.to_string()));
            return Err(error);
        }
        self.install(image);
        self.filter = FilterState::new();
        debug!("reverted to loaded image");
        Ok(())
    }

    // ===== Rendering =====

    /// Render the current state if anything changed and return the surface.
    ///
    /// Every frame is drawn from the working image, so calling this any
    /// number of times yields the same pixels.
    pub fn frame(&mut self) -> Option<&Surface> {
        let image = self.working.as_ref()?;
        if self.dirty {
            self.surface.clear();
            self.surface.draw_image(image, &self.filter);
            if let Some(rect) = self.selection_rect() {
                self.surface.draw_selection_overlay(image, rect, &self.filter);
            }
            self.dirty = false;
        }
        Some(&self.surface)
    }

    /// The working image with filters applied and no overlay.
    fn composite(&self) -> Option<DecodedImage> {
        let mut image = self.working.clone()?;
        apply_filter(&mut image.pixels, &self.filter);
        Some(image)
    }

    /// Update the display bounds, e.g. after the container was resized.
    pub fn set_bounds(&mut self, bounds: DisplayBounds) {
        self.bounds = bounds;
        self.surface.refit(bounds);
    }

    // ===== Saving =====

    /// Encode the current composite for upload and mark a save in flight.
    pub fn begin_save(&mut self) -> Result<SavePayload, EditorError> {
        match self.status {
            EditorStatus::NotReady => return Err(EditorError::NotReady),
            EditorStatus::Saving => return Err(EditorError::SaveInFlight),
            EditorStatus::Saved => return Err(EditorError::Locked),
            EditorStatus::Ready => {}
        }
        let image = self.composite().ok_or(EditorError::NotReady)?;

        let data_url = match encode_data_url(&image, EDITOR_JPEG_QUALITY) {
            Ok(url) => url,
            Err(e) => {
                warn!("encoding for save failed: {e}");
                let error = EditorError::Save(e.to_string());
                self.notify(Notification::save_failure(error.to_string()));
                return Err(error);
            }
        };

        debug!(bytes = data_url.len(), "save started");
        self.status = EditorStatus::Saving;
        Ok(SavePayload {
            data_url,
            width: image.width,
            height: image.height,
        })
    }

    /// Record the outcome of the upload started by [`Self::begin_save`].
    ///
    /// On success the version is bumped and returned; the host should reload
    /// with it. On failure every edit is kept so the save can be retried.
    pub fn finish_save(&mut self, result: Result<(), ApiError>) -> Result<SessionVersion, EditorError> {
        if self.status != EditorStatus::Saving {
            return Err(EditorError::NoSaveInFlight);
        }
        match result {
            Ok(()) => {
                self.version = self.version.next();
                self.status = EditorStatus::Saved;
                info!(version = %self.version, "image saved");
                self.notify(Notification::success("Image saved successfully"));
                Ok(self.version)
            }
            Err(e) => {
                warn!("save failed: {e}");
                self.status = EditorStatus::Ready;
                let error = EditorError::Save(e.to_string());
                self.notify(Notification::save_failure(error.to_string()));
                Err(error)
            }
        }
    }

    // ===== State =====

    fn ensure_editable(&self) -> Result<(), EditorError> {
        match self.status {
            EditorStatus::Saving => Err(EditorError::SaveInFlight),
            EditorStatus::Saved => Err(EditorError::Locked),
            EditorStatus::NotReady | EditorStatus::Ready => Ok(()),
        }
    }

    fn is_editable(&self) -> bool {
        self.ensure_editable().is_ok()
    }

    fn notify(&mut self, notification: Notification) {
        debug!(kind = ?notification.kind, error = notification.is_error(), "notification queued");
        self.notifications.push(notification);
    }

    /// Take all notifications raised since the last call.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn status(&self) -> EditorStatus {
        self.status
    }

    pub fn can_save(&self) -> bool {
        self.status == EditorStatus::Ready
    }

    pub fn version(&self) -> SessionVersion {
        self.version
    }

    pub fn has_pending_load(&self) -> bool {
        self.pending.is_some()
    }

    pub fn filter(&self) -> FilterState {
        self.filter
    }

    pub fn crop_mode(&self) -> CropMode {
        self.crop_mode
    }

    pub fn bounds(&self) -> DisplayBounds {
        self.bounds
    }

    pub fn working_image(&self) -> Option<&DecodedImage> {
        self.working.as_ref()
    }

    pub fn original_image(&self) -> Option<&DecodedImage> {
        self.original.as_ref().map(|o| &o.image)
    }

    /// Native dimensions of the working image.
    pub fn internal_size(&self) -> Option<(u32, u32)> {
        self.working.as_ref().map(|i| (i.width, i.height))
    }

    pub fn display_size(&self) -> DisplaySize {
        self.surface.display()
    }

    pub fn object_url(&self) -> Option<&ObjectUrl> {
        self.handle.current()
    }

    pub fn exif(&self) -> &ExifSummary {
        &self.exif
    }

    pub fn allocator(&self) -> &A {
        self.handle.allocator()
    }
}
