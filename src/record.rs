use crate::level::Severity;
use crate::normalize::ErrorReport;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// One structured log event as handed over by the host pipeline.
///
/// `context` holds the fields attached at the logging call site, `extra`
/// holds metadata injected by the pipeline itself. Both are optional: an
/// absent map is omitted from the rendered document, while a present but
/// empty one is rendered as `{}`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: Severity,
    pub message: String,
    pub channel: String,
    pub context: Option<Map<String, Value>>,
    pub extra: Option<Map<String, Value>>,
}

impl LogRecord {
    /// Create a record stamped with the current time and no context/extra.
    pub fn new(level: Severity, channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            channel: channel.into(),
            context: None,
            extra: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Attach a context field, creating the context map if needed.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Attach any serializable value as a context field.
    ///
    /// Fails if the value cannot be represented as JSON (for instance a map
    /// with non-string keys).
    pub fn try_with_context<T: Serialize + ?Sized>(
        self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        let value = serde_json::to_value(value)?;
        Ok(self.with_context(key, value))
    }

    /// Attach an error (and its source chain / backtrace) as a context field.
    pub fn with_error(self, key: impl Into<String>, report: ErrorReport) -> Self {
        self.with_context(key, report.into_value())
    }

    /// Replace the whole context map. An empty map is kept as present.
    pub fn with_context_map(mut self, context: Map<String, Value>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_extra_map(mut self, extra: Map<String, Value>) -> Self {
        self.extra = Some(extra);
        self
    }

    /// Channel name injected by the pipeline into `extra`, if any.
    pub fn extra_channel(&self) -> Option<&str> {
        self.extra
            .as_ref()
            .and_then(|extra| extra.get("channel"))
            .and_then(Value::as_str)
    }
}
