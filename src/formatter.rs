use crate::error::FormatError;
use crate::level::Status;
use crate::normalize::Normalizer;
use crate::record::LogRecord;
use chrono::SecondsFormat;
use serde_json::{Map, Value};

/// Renders a [`LogRecord`] into the payload sent to a log intake.
///
/// [`DatadogHandler`](crate::handler::DatadogHandler) holds one of these as
/// an injected strategy; any implementation can be substituted, which is
/// how tests isolate delivery from rendering.
pub trait Formatter: Send + Sync {
    fn format(&self, record: &LogRecord) -> Result<RenderedEvent, FormatError>;
}

/// Output of a [`Formatter`]: the encoded JSON document and its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEvent {
    pub body: Vec<u8>,
    pub status: Status,
}

impl RenderedEvent {
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

/// Datadog JSON formatter.
///
/// Produces one compact JSON object per record:
///
/// ```json
/// {"message":"..","context":{..},"level":300,"level_name":"WARNING",
///  "channel":"app","datetime":"2024-05-01T12:00:00.000000+00:00",
///  "extra":{..},"status":"warning"}
/// ```
///
/// `context` and `extra` are only emitted when present on the record, and
/// are always emitted as objects.
#[derive(Debug, Clone, Default)]
pub struct DatadogFormatter {
    normalizer: Normalizer,
}

impl DatadogFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_normalizer(normalizer: Normalizer) -> Self {
        Self { normalizer }
    }

    /// Build the document for `record`, without the `status` field.
    pub fn normalize(&self, record: &LogRecord) -> Map<String, Value> {
        let mut doc = Map::new();
        doc.insert("message".into(), Value::String(record.message.clone()));
        if let Some(context) = &record.context {
            doc.insert(
                "context".into(),
                Value::Object(self.normalizer.normalize_map(context)),
            );
        }
        doc.insert("level".into(), Value::from(record.level.rank()));
        doc.insert("level_name".into(), Value::from(record.level.name()));
        doc.insert("channel".into(), Value::String(record.channel.clone()));
        doc.insert(
            "datetime".into(),
            Value::String(
                record
                    .timestamp
                    .to_rfc3339_opts(SecondsFormat::Micros, false),
            ),
        );
        if let Some(extra) = &record.extra {
            doc.insert(
                "extra".into(),
                Value::Object(self.normalizer.normalize_map(extra)),
            );
        }
        doc
    }
}

impl Formatter for DatadogFormatter {
    fn format(&self, record: &LogRecord) -> Result<RenderedEvent, FormatError> {
        let status = record.level.status();
        let mut doc = self.normalize(record);
        doc.insert("status".into(), Value::from(status.as_str()));

        let body = serde_json::to_vec(&Value::Object(doc))?;
        Ok(RenderedEvent { body, status })
    }
}
