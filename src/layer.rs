use crate::level::Severity;
use crate::record::LogRecord;
use crate::sink::LogSink;
use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::runtime::Handle;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Targets whose events are never forwarded: this crate and the HTTP stack
/// it uses for delivery would otherwise feed their own diagnostics back in.
const IGNORED_TARGETS: &[&str] = &[
    "datadog_log_sink",
    "reqwest",
    "hyper",
    "h2",
    "rustls",
    "tokio_util",
    "want",
    "mio",
];

/// Delivery counters shared between a [`DatadogLayer`] and its tasks.
#[derive(Debug, Default)]
pub struct LayerStats {
    /// Total events seen by the layer (before filtering by level).
    pub total_events: AtomicU64,
    /// Records handed to the sink.
    pub dispatched_events: AtomicU64,
    /// Records the sink reported as delivered.
    pub delivered_events: AtomicU64,
    /// Records the sink failed to deliver.
    pub failed_events: AtomicU64,
    /// Dropped because no Tokio runtime was available on the logging thread.
    pub dropped_events: AtomicU64,
}

/// `tracing_subscriber` layer that turns events into [`LogRecord`]s and
/// hands each one to a [`LogSink`].
///
/// Every accepted event is delivered on its own Tokio task, so the logging
/// thread never waits on the network. Records are not buffered, batched or
/// retried: a failed delivery is counted and dropped.
///
/// Event fields become the record's `context`, the event target becomes its
/// channel, and `extra` carries the source location.
pub struct DatadogLayer {
    sink: Arc<dyn LogSink>,
    min_level: Severity,
    stats: Arc<LayerStats>,
}

impl DatadogLayer {
    pub fn new(sink: Arc<dyn LogSink>, min_level: Severity) -> Self {
        Self {
            sink,
            min_level,
            stats: Arc::new(LayerStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<LayerStats> {
        Arc::clone(&self.stats)
    }

    fn accepts(&self, target: &str, level: Severity) -> bool {
        level >= self.min_level
            && self.sink.is_handling(level)
            && !IGNORED_TARGETS
                .iter()
                .any(|ignored| target == *ignored || target.starts_with(&format!("{ignored}::")))
    }

    fn dispatch(&self, record: LogRecord) {
        let Ok(runtime) = Handle::try_current() else {
            self.stats.dropped_events.fetch_add(1, Ordering::Relaxed);
            eprintln!("no Tokio runtime on logging thread, dropping log record");
            return;
        };

        self.stats.dispatched_events.fetch_add(1, Ordering::Relaxed);
        let sink = Arc::clone(&self.sink);
        let stats = Arc::clone(&self.stats);
        runtime.spawn(async move {
            match sink.handle(&record).await {
                Ok(_) => {
                    stats.delivered_events.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    stats.failed_events.fetch_add(1, Ordering::Relaxed);
                    eprintln!("error shipping log record to Datadog: {}", e);
                }
            }
        });
    }
}

/// Build a [`LogRecord`] from a `tracing` event.
pub fn record_from_event(event: &Event<'_>) -> LogRecord {
    let meta = event.metadata();

    let mut context = Map::new();
    let mut message: Option<String> = None;
    let mut visitor = FieldVisitor {
        fields: &mut context,
        message: &mut message,
    };
    event.record(&mut visitor);

    let mut extra = Map::new();
    if let Some(module_path) = meta.module_path() {
        extra.insert("module_path".into(), Value::from(module_path));
    }
    if let Some(file) = meta.file() {
        extra.insert("file".into(), Value::from(file));
    }
    if let Some(line) = meta.line() {
        extra.insert("line".into(), Value::from(line));
    }

    LogRecord {
        timestamp: Utc::now(),
        level: Severity::from(*meta.level()),
        message: message.unwrap_or_default(),
        channel: meta.target().to_string(),
        context: Some(context),
        extra: Some(extra),
    }
}

impl<S> Layer<S> for DatadogLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.stats.total_events.fetch_add(1, Ordering::Relaxed);

        let meta = event.metadata();
        if !self.accepts(meta.target(), Severity::from(*meta.level())) {
            return;
        }

        self.dispatch(record_from_event(event));
    }
}

use tracing::field::{Field, Visit};

pub struct FieldVisitor<'a> {
    pub fields: &'a mut Map<String, Value>,
    pub message: &'a mut Option<String>,
}

impl<'a> FieldVisitor<'a> {
    fn set_message_or_field(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            *self.message = Some(value);
        } else {
            self.fields.insert(field.name().to_string(), Value::String(value));
        }
    }
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.set_message_or_field(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.fields.insert(
            field.name().to_string(),
            crate::normalize::ErrorReport::from_dyn(value).into_value(),
        );
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.set_message_or_field(field, format!("{:?}", value));
    }
}
