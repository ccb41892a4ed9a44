//! HTTP boundary to the Photodesk backend.
//!
//! The editor never talks to the network directly. It depends on two small
//! traits, [`ImageSource`] for fetching image bytes and [`ImageSink`] for
//! persisting an edit, which [`ApiClient`] implements over `reqwest`. Tests
//! and the WASM host can substitute their own implementations.
//!
//! [`fetch_for_ticket`] and [`save_session`] drive an [`EditorSession`]
//! through a load or a save.

mod api;
mod auth;
mod config;

pub use api::{ApiClient, ImageRecord, LoginResponse};
pub use auth::AuthSession;
pub use config::{ApiConfig, API_PREFIX, BASE_URL_VAR, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, TIMEOUT_VAR};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::editor::{EditorError, EditorSession};
use crate::session::{LoadTicket, ObjectUrlAllocator, SessionVersion};

/// Errors from the backend or the transport in between.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with an error status.
    #[error("{message} (HTTP {status})")]
    Server { status: u16, message: String },

    #[error("Expected an image but received content type {0:?}")]
    UnexpectedContentType(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Build a server error from a status and the response body.
    ///
    /// The backend reports failures as `{"error": "..."}`; a `message` field
    /// is accepted too. Anything else falls back to the raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct ErrorPayload {
            error: Option<String>,
            message: Option<String>,
        }

        let message = serde_json::from_str::<ErrorPayload>(body)
            .ok()
            .and_then(|p| p.error.or(p.message))
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| "Request failed".to_string());

        ApiError::Server { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Image bytes as served by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Fetches the binary content of an image.
#[allow(async_fn_in_trait)]
pub trait ImageSource {
    /// `version` must end up in the request so caches cannot serve an
    /// older rendition.
    async fn fetch_image(&self, image_id: u64, version: SessionVersion) -> Result<FetchedImage, ApiError>;
}

/// Persists an edited image.
#[allow(async_fn_in_trait)]
pub trait ImageSink {
    async fn save_image(&self, image_id: u64, data_url: &str) -> Result<(), ApiError>;
}

/// The outcome of a fetch, still tied to the ticket it was started for.
#[derive(Debug)]
pub struct TicketedFetch {
    pub ticket: LoadTicket,
    pub result: Result<FetchedImage, ApiError>,
}

impl TicketedFetch {
    /// Hand the fetched bytes (or the failure) to the session.
    ///
    /// Returns `Ok(true)` if the session accepted the result and `Ok(false)`
    /// if a newer load had already superseded it.
    pub fn apply<A: ObjectUrlAllocator>(self, session: &mut EditorSession<A>) -> Result<bool, EditorError> {
        match self.result {
            Ok(image) => session.complete_load(self.ticket, &image.bytes, &image.content_type),
            Err(e) => session.fail_load(self.ticket, &e.to_string()),
        }
    }
}

/// Fetch the image for a ticket without holding on to the session.
///
/// Several of these may be in flight at once; applying their results in
/// any order leaves the session showing the newest ticket's image.
pub async fn fetch_for_ticket<S: ImageSource>(source: &S, image_id: u64, ticket: LoadTicket) -> TicketedFetch {
    debug!(image_id, version = %ticket.version, "fetching image");
    let result = source.fetch_image(image_id, ticket.version).await;
    if let Err(e) = &result {
        warn!(image_id, version = %ticket.version, "image fetch failed: {e}");
    }
    TicketedFetch { ticket, result }
}

/// Encode the session's current render and persist it through `sink`.
///
/// Returns the bumped version on success. On failure the session keeps its
/// edits so the save can be retried.
pub async fn save_session<A, S>(
    session: &mut EditorSession<A>,
    sink: &S,
    image_id: u64,
) -> Result<SessionVersion, EditorError>
where
    A: ObjectUrlAllocator,
    S: ImageSink,
{
    let payload = session.begin_save()?;
    let result = sink.save_image(image_id, &payload.data_url).await;
    session.finish_save(result)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::time::Duration;

    use image::{ImageFormat, Rgb, RgbImage};

    use super::*;
    use crate::editor::EditorStatus;
    use crate::geometry::DisplayBounds;
    use crate::session::InMemoryObjectUrls;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([90, 120, 150]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    /// Serves a differently sized image per version; older versions answer
    /// more slowly.
    struct DelayedSource;

    impl ImageSource for DelayedSource {
        async fn fetch_image(&self, _image_id: u64, version: SessionVersion) -> Result<FetchedImage, ApiError> {
            let delay = 30u64.saturating_sub(version.value() * 10);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if version.value() == 0 {
                return Err(ApiError::from_response(404, r#"{"error":"Image not found"}"#));
            }
            let side = 10 * version.value() as u32;
            Ok(FetchedImage {
                bytes: png_bytes(side, side),
                content_type: "image/png".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        fail: bool,
        saved: RefCell<Vec<(u64, String)>>,
    }

    impl ImageSink for RecordingSink {
        async fn save_image(&self, image_id: u64, data_url: &str) -> Result<(), ApiError> {
            if self.fail {
                return Err(ApiError::from_response(500, r#"{"error":"Failed to save image"}"#));
            }
            self.saved.borrow_mut().push((image_id, data_url.to_string()));
            Ok(())
        }
    }

    fn session() -> EditorSession<InMemoryObjectUrls> {
        EditorSession::new(InMemoryObjectUrls::new(), DisplayBounds::new(800.0, 600.0))
    }

    #[tokio::test]
    async fn test_concurrent_fetches_keep_newest() {
        let mut session = session();
        let older = session.begin_load(SessionVersion::new(1)).unwrap();
        let newer = session.begin_load(SessionVersion::new(2)).unwrap();

        let (older, newer) = tokio::join!(
            fetch_for_ticket(&DelayedSource, 7, older),
            fetch_for_ticket(&DelayedSource, 7, newer),
        );

        // The newer fetch finishes first; the older one lands afterwards.
        assert!(newer.apply(&mut session).unwrap());
        assert!(!older.apply(&mut session).unwrap());

        assert_eq!(session.internal_size(), Some((20, 20)));
        assert_eq!(session.allocator().live(), 1);
    }

    #[tokio::test]
    async fn test_stale_fetch_applied_first_is_ignored() {
        let mut session = session();
        let older = session.begin_load(SessionVersion::new(1)).unwrap();
        let newer = session.begin_load(SessionVersion::new(2)).unwrap();

        let older = fetch_for_ticket(&DelayedSource, 7, older).await;
        assert!(!older.apply(&mut session).unwrap());

        let newer = fetch_for_ticket(&DelayedSource, 7, newer).await;
        assert!(newer.apply(&mut session).unwrap());
        assert_eq!(session.internal_size(), Some((20, 20)));
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_session_not_ready() {
        let mut session = session();
        let ticket = session.begin_load(SessionVersion::new(0)).unwrap();
        let fetched = fetch_for_ticket(&DelayedSource, 7, ticket).await;

        let err = fetched.apply(&mut session).unwrap_err();
        assert!(matches!(err, EditorError::Load(ref m) if m.contains("Image not found")));
        assert_eq!(session.status(), EditorStatus::NotReady);
    }

    #[tokio::test]
    async fn test_save_session_round_trip() {
        let mut session = session();
        let ticket = session.begin_load(SessionVersion::new(1)).unwrap();
        fetch_for_ticket(&DelayedSource, 3, ticket).await.apply(&mut session).unwrap();

        let sink = RecordingSink::default();
        let version = save_session(&mut session, &sink, 3).await.unwrap();

        assert_eq!(version, SessionVersion::new(2));
        assert_eq!(session.status(), EditorStatus::Saved);
        let saved = sink.saved.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, 3);
        assert!(saved[0].1.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_save_session_failure_is_retryable() {
        let mut session = session();
        let ticket = session.begin_load(SessionVersion::new(1)).unwrap();
        fetch_for_ticket(&DelayedSource, 3, ticket).await.apply(&mut session).unwrap();
        session.set_brightness(20.0).unwrap();

        let failing = RecordingSink {
            fail: true,
            ..Default::default()
        };
        let err = save_session(&mut session, &failing, 3).await.unwrap_err();
        assert!(matches!(err, EditorError::Save(_)));
        assert_eq!(session.status(), EditorStatus::Ready);
        assert_eq!(session.filter().brightness, 20.0);

        let sink = RecordingSink::default();
        assert!(save_session(&mut session, &sink, 3).await.is_ok());
    }

    #[test]
    fn test_error_payload_error_field() {
        let err = ApiError::from_response(404, r#"{"error":"Image not found"}"#);
        assert_eq!(err.to_string(), "Image not found (HTTP 404)");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_error_payload_message_field() {
        let err = ApiError::from_response(500, r#"{"message":"disk full"}"#);
        assert!(matches!(err, ApiError::Server { ref message, .. } if message == "disk full"));
    }

    #[test]
    fn test_error_payload_plain_text() {
        let err = ApiError::from_response(502, "Bad Gateway\n");
        assert!(matches!(err, ApiError::Server { ref message, .. } if message == "Bad Gateway"));
    }

    #[test]
    fn test_error_payload_empty() {
        let err = ApiError::from_response(500, "");
        assert!(matches!(err, ApiError::Server { ref message, .. } if message == "Request failed"));
    }

    #[test]
    fn test_content_type_error_display() {
        let err = ApiError::UnexpectedContentType("text/html".to_string());
        assert_eq!(
            err.to_string(),
            "Expected an image but received content type \"text/html\""
        );
    }
}
