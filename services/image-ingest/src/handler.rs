use crate::config::Config;
use crate::error::IngestError;
use crate::event::{InboundEvent, InvocationResult};
use crate::object_key::ObjectKeyGenerator;
use crate::storage::{ObjectStore, JPEG_CONTENT_TYPE};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Decodes a Base64 image carried by an inbound event and stores it.
///
/// The handler is built once per process and shared by every invocation.
/// It holds no mutable state.
pub struct ImageIngestHandler<S> {
    store: Arc<S>,
    bucket: String,
    payload_field: String,
    log_full_event: bool,
    keys: ObjectKeyGenerator,
}

impl<S: ObjectStore> ImageIngestHandler<S> {
    pub fn new(store: Arc<S>, config: &Config) -> Self {
        Self {
            store,
            bucket: config.storage.bucket_name.clone(),
            payload_field: config.ingest.payload_field.clone(),
            log_full_event: config.ingest.log_full_event,
            keys: ObjectKeyGenerator::new(&config.keys),
        }
    }

    /// Handle one invocation. Every failure is reported in the result.
    #[instrument(skip(self, event), fields(bucket = %self.bucket))]
    pub async fn handle(&self, event: &InboundEvent) -> InvocationResult {
        if self.log_full_event {
            info!(event = %event.to_json(), "Received event");
        } else {
            info!(event = %event.redacted(&self.payload_field), "Received event");
        }

        match self.ingest(event).await {
            Ok(_) => InvocationResult::success(),
            Err(e) => {
                match e {
                    IngestError::MissingPayload { ref field } => {
                        warn!(field = %field, "No image found in the message");
                    }
                    IngestError::PayloadNotText { .. } | IngestError::Decode(_) => {
                        error!(error = %e, "Error decoding Base64");
                    }
                    IngestError::Storage(_) => {
                        error!(error = %e, "Error uploading to S3");
                    }
                }
                InvocationResult::from(&e)
            }
        }
    }

    async fn ingest(&self, event: &InboundEvent) -> Result<String, IngestError> {
        let image = self.decode_payload(event)?;
        let key = self.keys.generate();
        let size_bytes = image.len();

        self.store
            .put_object(&self.bucket, &key, image, JPEG_CONTENT_TYPE)
            .await?;

        info!(key = %key, size_bytes, "Image {} successfully uploaded to S3", key);

        Ok(key)
    }

    /// Extract and decode the image payload of an event
    pub fn decode_payload(&self, event: &InboundEvent) -> Result<Vec<u8>, IngestError> {
        let value = event
            .field(&self.payload_field)
            .ok_or_else(|| IngestError::MissingPayload {
                field: self.payload_field.clone(),
            })?;

        let text = value.as_str().ok_or_else(|| IngestError::PayloadNotText {
            field: self.payload_field.clone(),
            found: json_kind(value),
        })?;

        Ok(decode_base64(text)?)
    }
}

/// Decode standard, padded Base64. Line breaks and other ASCII whitespace
/// are skipped.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    if text.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: Vec<u8> = text
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        STANDARD.decode(compact)
    } else {
        STANDARD.decode(text)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
