use crate::config::KeysConfig;
use chrono::{DateTime, Local, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// Timestamp layout embedded in every key, second granularity
pub const KEY_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Extension of every stored object
pub const KEY_EXTENSION: &str = "jpg";

const SUFFIX_LEN: usize = 8;

/// Timezone used to render the key timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyTimezone {
    /// Whatever timezone the execution environment provides
    #[default]
    Local,
    Utc,
}

/// Generates object keys for uploaded images.
///
/// Format: `[{prefix}/]{YYYYMMDD_HHMMSS}[_{suffix}].jpg`
///
/// Without `unique_suffix`, two keys generated within the same second are
/// identical and the later upload overwrites the earlier object.
#[derive(Debug, Clone)]
pub struct ObjectKeyGenerator {
    timezone: KeyTimezone,
    unique_suffix: bool,
    prefix: Option<String>,
}

impl ObjectKeyGenerator {
    pub fn new(config: &KeysConfig) -> Self {
        let prefix = config
            .prefix
            .as_deref()
            .map(|p| {
                p.split('/')
                    .filter(|c| !c.is_empty())
                    .map(sanitize_path_component)
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .filter(|p| !p.is_empty());

        Self {
            timezone: config.timezone,
            unique_suffix: config.unique_suffix,
            prefix,
        }
    }

    /// Generate a key for the current wall-clock time
    pub fn generate(&self) -> String {
        self.generate_at(Utc::now())
    }

    /// Generate a key for the given instant
    pub fn generate_at(&self, instant: DateTime<Utc>) -> String {
        let timestamp = match self.timezone {
            KeyTimezone::Local => instant
                .with_timezone(&Local)
                .format(KEY_TIMESTAMP_FORMAT)
                .to_string(),
            KeyTimezone::Utc => instant.format(KEY_TIMESTAMP_FORMAT).to_string(),
        };

        let mut key = String::new();
        if let Some(ref prefix) = self.prefix {
            key.push_str(prefix);
            key.push('/');
        }
        key.push_str(&timestamp);
        if self.unique_suffix {
            let id = Uuid::new_v4().simple().to_string();
            key.push('_');
            key.push_str(&id[..SUFFIX_LEN]);
        }
        key.push('.');
        key.push_str(KEY_EXTENSION);
        key
    }
}

/// Sanitize a path component to prevent path traversal
fn sanitize_path_component(component: &str) -> String {
    component
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}
