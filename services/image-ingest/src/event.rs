use crate::error::{IngestError, UPLOAD_SUCCESS_MESSAGE};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Event delivered to the function, one per invocation.
///
/// Any JSON object is accepted and unknown keys are ignored. A payload that
/// is not an object is treated as an event without keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboundEvent {
    fields: Map<String, Value>,
}

impl InboundEvent {
    /// Look up a field by key
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The full event as JSON, payload included
    pub fn to_json(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// The event as JSON with the text of `payload_field` replaced by its length
    pub fn redacted(&self, payload_field: &str) -> Value {
        let mut fields = self.fields.clone();
        if let Some(Value::String(text)) = fields.get_mut(payload_field) {
            *text = format!("<{} base64 chars>", text.len());
        }
        Value::Object(fields)
    }
}

impl From<Value> for InboundEvent {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }
}

impl From<Map<String, Value>> for InboundEvent {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Outcome of one invocation: a status code and a human-readable message.
///
/// Serialized as `{"statusCode": 200, "body": "\"<message>\""}`; the body is
/// the message encoded as a JSON string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    pub status_code: u16,
    pub message: String,
}

impl InvocationResult {
    pub fn success() -> Self {
        Self {
            status_code: 200,
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

impl From<&IngestError> for InvocationResult {
    fn from(error: &IngestError) -> Self {
        Self {
            status_code: error.status_code(),
            message: error.public_message().to_string(),
        }
    }
}

impl From<IngestError> for InvocationResult {
    fn from(error: IngestError) -> Self {
        Self::from(&error)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResponseBody {
    status_code: u16,
    body: String,
}

impl Serialize for InvocationResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let body = serde_json::to_string(&self.message)
            .map_err(<S::Error as serde::ser::Error>::custom)?;
        ResponseBody {
            status_code: self.status_code,
            body,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StorageError, MISSING_PAYLOAD_MESSAGE, UPLOAD_FAILURE_MESSAGE};
    use serde_json::json;

    #[test]
    fn test_non_object_event_has_no_fields() {
        let event = InboundEvent::from(json!(["picture"]));
        assert!(event.field("picture").is_none());
        assert_eq!(event.to_json(), json!({}));
    }

    #[test]
    fn test_field_lookup_ignores_unknown_keys() {
        let event = InboundEvent::from(json!({"picture": "aGk=", "device": "espcam-01"}));
        assert_eq!(event.field("picture"), Some(&json!("aGk=")));
        assert!(event.field("image").is_none());
    }

    #[test]
    fn test_redacted_replaces_payload_text() {
        let event = InboundEvent::from(json!({"picture": "aGVsbG8=", "device": "espcam-01"}));
        assert_eq!(
            event.redacted("picture"),
            json!({"picture": "<8 base64 chars>", "device": "espcam-01"})
        );
        assert_eq!(event.to_json()["picture"], json!("aGVsbG8="));
    }

    #[test]
    fn test_redacted_keeps_non_text_payload() {
        let event = InboundEvent::from(json!({"picture": 42}));
        assert_eq!(event.redacted("picture"), json!({"picture": 42}));
    }

    #[test]
    fn test_success_serialization() {
        let value = serde_json::to_value(InvocationResult::success()).unwrap();
        assert_eq!(
            value,
            json!({
                "statusCode": 200,
                "body": "\"Image successfully uploaded to S3\""
            })
        );
    }

    #[test]
    fn test_from_error() {
        let result = InvocationResult::from(IngestError::MissingPayload {
            field: "picture".to_string(),
        });
        assert_eq!(result.status_code, 400);
        assert_eq!(result.message, MISSING_PAYLOAD_MESSAGE);
        assert!(!result.is_success());

        let result = InvocationResult::from(IngestError::from(StorageError::Upload {
            bucket: "b".to_string(),
            key: "k.jpg".to_string(),
            reason: "timeout".to_string(),
        }));
        assert_eq!(result.status_code, 500);
        assert_eq!(result.message, UPLOAD_FAILURE_MESSAGE);

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["body"], json!("\"Failed to upload image to S3\""));
    }
}
