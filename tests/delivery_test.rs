use datadog_log_sink::{
    hostname::StaticHostname, Attributes, DatadogConfig, DatadogHandler, DeliveryError,
    FormatError, Formatter, LogRecord, LogSink, RenderedEvent, Severity, Status,
};
use mockito::{Matcher, Server};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn handler_for(url: &str, attributes: Attributes) -> DatadogHandler {
    let mut config = DatadogConfig::new("mock-api-key").with_attributes(attributes);
    config.intake_url = url.to_string();
    config.timeout = Duration::from_secs(5);
    DatadogHandler::from_config(config)
        .expect("failed to build handler")
        .with_hostname_provider(Arc::new(StaticHostname::new("test-host")))
}

fn record() -> LogRecord {
    LogRecord::new(Severity::Warning, "app", "disk almost full")
        .with_context("disk", "/dev/sda1")
        .with_extra("channel", "billing")
}

/// Renders a fixed body and counts calls.
struct FixedFormatter {
    calls: AtomicUsize,
}

impl Formatter for FixedFormatter {
    fn format(&self, _record: &LogRecord) -> Result<RenderedEvent, FormatError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(RenderedEvent {
            body: br#"{"fixed":true}"#.to_vec(),
            status: Status::Info,
        })
    }
}

#[tokio::test]
async fn ships_rendered_record_to_intake() {
    let mut server = Server::new_async().await;
    let handler = handler_for(
        &server.url(),
        Attributes::new().tags(["env:prod", "team:x"]),
    );
    let record = record();
    let rendered = handler.formatter().format(&record).expect("render");

    let mock = server
        .mock("POST", "/v1/input/mock-api-key")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("ddsource".into(), "php".into()),
            Matcher::UrlEncoded("service".into(), "billing".into()),
            Matcher::UrlEncoded("hostname".into(), "test-host".into()),
            Matcher::UrlEncoded("ddtags".into(), "env:prod,team:x,level:WARNING".into()),
        ]))
        .match_header("Content-Type", "application/json")
        .match_body(Matcher::Exact(
            String::from_utf8(rendered.body.clone()).expect("utf-8 body"),
        ))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    handler.write(&record).await.expect("delivery succeeds");
    mock.assert_async().await;
}

#[tokio::test]
async fn shipped_body_carries_status() {
    let mut server = Server::new_async().await;
    let handler = handler_for(&server.url(), Attributes::new());

    let mock = server
        .mock("POST", "/v1/input/mock-api-key")
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJsonString(
            r#"{"status":"error","level":400,"level_name":"ERROR","channel":"app"}"#.to_string(),
        ))
        .with_status(202)
        .create_async()
        .await;

    let record = LogRecord::new(Severity::Error, "app", "payment failed");
    handler.write(&record).await.expect("delivery succeeds");
    mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_is_not_a_failure() {
    let mut server = Server::new_async().await;
    let handler = handler_for(&server.url(), Attributes::new());

    let mock = server
        .mock("POST", "/v1/input/mock-api-key")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body(r#"{"errors":["Forbidden"]}"#)
        .create_async()
        .await;

    assert!(handler.write(&record()).await.is_ok());
    mock.assert_async().await;
}

#[tokio::test]
async fn transport_failure_is_reported_and_render_is_stable() {
    // Nothing listens on port 1.
    let handler = handler_for("http://127.0.0.1:1", Attributes::new());
    let record = record();

    let rendered = handler.formatter().format(&record).expect("render");
    let before = rendered.clone();

    let err = handler
        .deliver(&record, &rendered)
        .await
        .expect_err("connection must fail");
    assert!(matches!(err, DeliveryError::Transport(_)));

    assert_eq!(rendered, before);
    assert_eq!(handler.formatter().format(&record).expect("render"), before);
}

#[tokio::test]
async fn injected_formatter_provides_the_body() {
    let mut server = Server::new_async().await;
    let formatter = Arc::new(FixedFormatter {
        calls: AtomicUsize::new(0),
    });
    let handler = handler_for(&server.url(), Attributes::new().service("checkout"))
        .with_formatter(formatter.clone());

    let mock = server
        .mock("POST", "/v1/input/mock-api-key")
        .match_query(Matcher::UrlEncoded("service".into(), "checkout".into()))
        .match_body(r#"{"fixed":true}"#)
        .create_async()
        .await;

    handler.write(&record()).await.expect("delivery succeeds");
    mock.assert_async().await;
    assert_eq!(formatter.calls.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn handle_applies_level_and_bubble() {
    let mut server = Server::new_async().await;
    let handler = handler_for(&server.url(), Attributes::new())
        .with_level(Severity::Error)
        .with_bubble(false);

    let mock = server
        .mock("POST", "/v1/input/mock-api-key")
        .match_query(Matcher::Any)
        .expect(1)
        .create_async()
        .await;

    let below = LogRecord::new(Severity::Info, "app", "ignored");
    assert!(!handler.handle(&below).await.expect("skipped"));

    let above = LogRecord::new(Severity::Critical, "app", "shipped");
    assert!(handler.handle(&above).await.expect("delivered"));

    mock.assert_async().await;
}

#[tokio::test]
async fn rendered_document_round_trips() {
    let handler = handler_for("http://127.0.0.1:1", Attributes::new());
    let record = record();
    let rendered = handler.formatter().format(&record).expect("render");

    let doc: Value = serde_json::from_slice(&rendered.body).expect("valid JSON");
    let doc = doc.as_object().expect("object");

    let normalized = DatadogHandler::default_formatter().normalize(&record);
    assert_eq!(doc.len(), normalized.len() + 1);
    for (key, value) in &normalized {
        assert_eq!(doc.get(key), Some(value), "field {key}");
    }
    assert_eq!(doc["status"], Value::from("warning"));
}

#[test]
fn empty_api_key_never_builds_a_handler() {
    let result = DatadogHandler::new("", Attributes::new().service("svc"));
    assert!(result.is_err());
}
