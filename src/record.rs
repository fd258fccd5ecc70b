use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::Level;

/// A single log event on its way to a [`LogSink`](crate::sink::LogSink).
///
/// Created once per logging call, mutated in place by the enrichment
/// pipeline, then handed to the sink and never touched again.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(serialize_with = "serialize_level")]
    pub level: Level,
    pub target: Option<String>,
    pub message: Option<String>,
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl LogRecord {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            target: None,
            message: Some(message.into()),
            fields: BTreeMap::new(),
        }
    }

    /// Look up a field as a string slice.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }
}

fn serialize_level<S: Serializer>(level: &Level, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(level.as_str())
}
