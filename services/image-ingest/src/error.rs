//! Error types for the ingest handler and its storage collaborator

use thiserror::Error;

/// Caller-facing message when the event carries no image
pub const MISSING_PAYLOAD_MESSAGE: &str = "No image found in the message";
/// Caller-facing message when the image cannot be decoded
pub const DECODE_FAILURE_MESSAGE: &str = "Failed to decode image";
/// Caller-facing message when the storage write fails
pub const UPLOAD_FAILURE_MESSAGE: &str = "Failed to upload image to S3";
/// Caller-facing message on success
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Image successfully uploaded to S3";

/// Errors reported by an object store
#[derive(Error, Debug)]
pub enum StorageError {
    /// The write was rejected or never completed
    #[error("upload of '{key}' to bucket '{bucket}' failed: {reason}")]
    Upload {
        bucket: String,
        key: String,
        reason: String,
    },
}

/// Errors that end an invocation early
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("event has no '{field}' field")]
    MissingPayload { field: String },

    #[error("'{field}' field is {found}, expected Base64 text")]
    PayloadNotText { field: String, found: &'static str },

    #[error("invalid Base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl IngestError {
    /// Status code reported to the caller
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingPayload { .. } | Self::PayloadNotText { .. } | Self::Decode(_) => 400,
            Self::Storage(_) => 500,
        }
    }

    /// Message reported to the caller; never includes internal detail
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MissingPayload { .. } => MISSING_PAYLOAD_MESSAGE,
            Self::PayloadNotText { .. } | Self::Decode(_) => DECODE_FAILURE_MESSAGE,
            Self::Storage(_) => UPLOAD_FAILURE_MESSAGE,
        }
    }
}
