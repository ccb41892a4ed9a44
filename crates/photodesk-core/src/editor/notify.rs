//! Editor errors and the user-facing notifications they produce.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// Fetching or decoding the image failed.
    #[error("Failed to load image: {0}")]
    Load(String),

    /// The requested edit is not valid in the current state.
    #[error("{0}")]
    Validation(String),

    /// Persisting the edit failed. The edit state is kept for a retry.
    #[error("Failed to save image: {0}")]
    Save(String),

    /// Encoding or re-decoding pixels failed.
    #[error("Image processing failed: {0}")]
    Processing(String),

    #[error("No image is loaded")]
    NotReady,

    #[error("A save is already in progress")]
    SaveInFlight,

    #[error("No save is in progress")]
    NoSaveInFlight,

    #[error("The image has been saved; reload it to edit again")]
    Locked,

    #[error("Could not register image: {0}")]
    Resource(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    Success,
    LoadFailure,
    ValidationFailure,
    SaveFailure,
}

/// A message for the host UI to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    /// Blocks further interaction until acknowledged.
    pub blocking: bool,
    /// The action that failed can be tried again as is.
    pub retryable: bool,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
            blocking: false,
            retryable: false,
        }
    }

    pub fn load_failure(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::LoadFailure,
            message: message.into(),
            blocking: true,
            retryable: false,
        }
    }

    pub fn validation_failure(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::ValidationFailure,
            message: message.into(),
            blocking: false,
            retryable: false,
        }
    }

    pub fn save_failure(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::SaveFailure,
            message: message.into(),
            blocking: false,
            retryable: true,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind != NotificationKind::Success
    }
}
