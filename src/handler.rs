use crate::attributes::{Attributes, DEFAULT_SOURCE};
use crate::config::DatadogConfig;
use crate::error::{ConfigError, DeliveryError};
use crate::formatter::{DatadogFormatter, Formatter, RenderedEvent};
use crate::hostname::{HostnameProvider, SystemHostname};
use crate::level::Severity;
use crate::record::LogRecord;
use crate::sink::LogSink;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Ships rendered records to the Datadog HTTP log intake.
///
/// Each record becomes one `POST {intake}/v1/input/{api_key}` carrying the
/// rendered JSON body, with `ddsource`, `service`, `hostname` and `ddtags`
/// query parameters resolved per record:
///
/// - `ddsource`: configured source, else `"php"`.
/// - `service`: configured service, else `extra["channel"]`, else the
///   record's channel.
/// - `hostname`: configured hostname, else the [`HostnameProvider`].
/// - `ddtags`: configured tags joined with `,`, followed by `level:<NAME>`.
///
/// The handler holds only immutable configuration and a pooled
/// [`reqwest::Client`], so it can be shared between tasks.
#[derive(Clone)]
pub struct DatadogHandler {
    client: Client,
    api_key: String,
    attributes: Attributes,
    intake_url: String,
    timeout: Duration,
    formatter: Arc<dyn Formatter>,
    hostname: Arc<dyn HostnameProvider>,
    level: Severity,
    bubble: bool,
}

impl DatadogHandler {
    /// Construct a handler for the default EU intake.
    ///
    /// **Returns**
    /// - `Err(ConfigError::MissingApiKey)` if `api_key` is empty.
    pub fn new(api_key: impl Into<String>, attributes: Attributes) -> Result<Self, ConfigError> {
        Self::from_config(DatadogConfig::new(api_key).with_attributes(attributes))
    }

    pub fn from_config(config: DatadogConfig) -> Result<Self, ConfigError> {
        if config.api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        let intake_url = validate_intake_url(&config.intake_url)?;
        let client = build_client(config.timeout)?;

        Ok(Self {
            client,
            api_key: config.api_key,
            attributes: config.attributes,
            intake_url,
            timeout: config.timeout,
            formatter: Arc::new(Self::default_formatter()),
            hostname: Arc::new(SystemHostname),
            level: config.level,
            bubble: config.bubble,
        })
    }

    /// Formatter used unless another one is injected.
    pub fn default_formatter() -> DatadogFormatter {
        DatadogFormatter::new()
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_hostname_provider(mut self, hostname: Arc<dyn HostnameProvider>) -> Self {
        self.hostname = hostname;
        self
    }

    pub fn with_level(mut self, level: Severity) -> Self {
        self.level = level;
        self
    }

    pub fn with_bubble(mut self, bubble: bool) -> Self {
        self.bubble = bubble;
        self
    }

    pub fn with_intake_url(mut self, intake_url: &str) -> Result<Self, ConfigError> {
        self.intake_url = validate_intake_url(intake_url)?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        self.client = build_client(timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    pub fn formatter(&self) -> &dyn Formatter {
        self.formatter.as_ref()
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn source(&self) -> &str {
        self.attributes.source.as_deref().unwrap_or(DEFAULT_SOURCE)
    }

    pub fn hostname(&self) -> String {
        match &self.attributes.hostname {
            Some(hostname) => hostname.clone(),
            None => self.hostname.hostname(),
        }
    }

    pub fn service<'a>(&'a self, record: &'a LogRecord) -> &'a str {
        self.attributes
            .service
            .as_deref()
            .or_else(|| record.extra_channel())
            .unwrap_or(&record.channel)
    }

    pub fn tags(&self, record: &LogRecord) -> String {
        let default_tag = format!("level:{}", record.level.name());
        match self.attributes.tags.as_ref().and_then(|tags| tags.joined()) {
            Some(joined) => format!("{joined},{default_tag}"),
            None => default_tag,
        }
    }

    /// Full intake URL for `record`.
    pub fn intake_url(&self, record: &LogRecord) -> String {
        self.build_url(
            self.source(),
            self.service(record),
            &self.hostname(),
            &self.tags(record),
        )
    }

    /// Intake URL for already resolved attributes. Every query value and
    /// the API key are percent-encoded.
    pub fn build_url(&self, source: &str, service: &str, hostname: &str, tags: &str) -> String {
        format!(
            "{}/v1/input/{}?ddsource={}&service={}&hostname={}&ddtags={}",
            self.intake_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(source),
            urlencoding::encode(service),
            urlencoding::encode(hostname),
            urlencoding::encode(tags),
        )
    }

    /// Send one rendered record.
    ///
    /// Only transport failures are errors: any HTTP status counts as
    /// delivered, non-2xx ones are logged. The response body is read and
    /// discarded.
    pub async fn deliver(
        &self,
        record: &LogRecord,
        rendered: &RenderedEvent,
    ) -> Result<(), DeliveryError> {
        let url = self.intake_url(record);
        debug!(
            status = %rendered.status,
            bytes = rendered.body.len(),
            "LOGS | Sending record to Datadog"
        );

        let resp = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(rendered.body.clone())
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            warn!(
                %status,
                response_bytes = body.len(),
                "LOGS | Datadog intake answered with a non-success status"
            );
        }
        Ok(())
    }
}

#[async_trait]
impl LogSink for DatadogHandler {
    fn is_handling(&self, level: Severity) -> bool {
        level >= self.level
    }

    fn bubble(&self) -> bool {
        self.bubble
    }

    async fn write(&self, record: &LogRecord) -> Result<(), DeliveryError> {
        let rendered = self.formatter.format(record)?;
        self.deliver(record, &rendered).await
    }
}

impl fmt::Debug for DatadogHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatadogHandler")
            .field("api_key", &"<redacted>")
            .field("attributes", &self.attributes)
            .field("intake_url", &self.intake_url)
            .field("timeout", &self.timeout)
            .field("level", &self.level)
            .field("bubble", &self.bubble)
            .finish_non_exhaustive()
    }
}

fn validate_intake_url(url: &str) -> Result<String, ConfigError> {
    let trimmed = url.trim().trim_end_matches('/');
    let lower = trimmed.to_ascii_lowercase();
    let host = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"));
    match host {
        Some(host) if !host.is_empty() && !host.contains('?') => Ok(trimmed.to_string()),
        _ => Err(ConfigError::InvalidIntakeUrl(url.to_string())),
    }
}

fn build_client(timeout: Duration) -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(ConfigError::HttpClient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Tags;
    use crate::hostname::StaticHostname;
    use serde_json::{json, Map};

    fn handler(attributes: Attributes) -> DatadogHandler {
        DatadogHandler::new("K1", attributes)
            .unwrap()
            .with_hostname_provider(Arc::new(StaticHostname::new("ambient-host")))
    }

    fn warning() -> LogRecord {
        LogRecord::new(Severity::Warning, "app", "disk almost full")
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let err = DatadogHandler::new("", Attributes::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey));
    }

    #[test]
    fn source_defaults_to_php() {
        assert_eq!(handler(Attributes::new()).source(), "php");
        assert_eq!(handler(Attributes::new().source("rust")).source(), "rust");
    }

    #[test]
    fn tags_end_with_level_tag() {
        let with_tags = handler(Attributes::new().tags(["env:prod", "team:x"]));
        assert_eq!(with_tags.tags(&warning()), "env:prod,team:x,level:WARNING");

        assert_eq!(handler(Attributes::new()).tags(&warning()), "level:WARNING");

        let empty = handler(Attributes::new().tags(Tags::List(vec![])));
        assert_eq!(empty.tags(&warning()), "level:WARNING");
    }

    #[test]
    fn map_tags_use_their_values() {
        let map: Map<String, serde_json::Value> =
            json!({"env": "env:prod"}).as_object().unwrap().clone();
        let handler = handler(Attributes::new().tags(map));
        let record = LogRecord::new(Severity::Emergency, "app", "down");
        assert_eq!(handler.tags(&record), "env:prod,level:EMERGENCY");
    }

    #[test]
    fn service_prefers_configuration_then_extra_channel() {
        let record = warning().with_extra("channel", "billing");

        assert_eq!(handler(Attributes::new()).service(&record), "billing");
        assert_eq!(
            handler(Attributes::new().service("checkout")).service(&record),
            "checkout"
        );
    }

    #[test]
    fn service_falls_back_to_record_channel() {
        assert_eq!(handler(Attributes::new()).service(&warning()), "app");
    }

    #[test]
    fn hostname_prefers_configuration() {
        assert_eq!(handler(Attributes::new()).hostname(), "ambient-host");
        assert_eq!(
            handler(Attributes::new().hostname("h1")).hostname(),
            "h1"
        );
    }

    #[test]
    fn builds_intake_url() {
        let handler = handler(Attributes::new());
        assert_eq!(
            handler.build_url("app", "svc", "h1", "t1"),
            "https://http-intake.logs.datadoghq.eu/v1/input/K1?ddsource=app&service=svc&hostname=h1&ddtags=t1"
        );
    }

    #[test]
    fn query_values_are_percent_encoded() {
        let handler = handler(Attributes::new().service("a&b=c").tags(["env:prod"]));
        let url = handler.intake_url(&warning());
        assert!(url.contains("service=a%26b%3Dc"), "{url}");
        assert!(url.ends_with("ddtags=env%3Aprod%2Clevel%3AWARNING"), "{url}");
    }

    #[test]
    fn intake_url_is_validated_and_trimmed() {
        let handler = handler(Attributes::new())
            .with_intake_url("https://http-intake.logs.datadoghq.com/")
            .unwrap();
        assert!(handler
            .build_url("a", "b", "c", "d")
            .starts_with("https://http-intake.logs.datadoghq.com/v1/input/K1?"));

        let err = DatadogHandler::new("K1", Attributes::new())
            .unwrap()
            .with_intake_url("ftp://example.com")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidIntakeUrl(_)));
    }

    #[test]
    fn level_threshold_and_bubble() {
        let handler = handler(Attributes::new()).with_level(Severity::Error);
        assert!(!handler.is_handling(Severity::Warning));
        assert!(handler.is_handling(Severity::Critical));
        assert!(handler.bubble());
        assert!(!handler.with_bubble(false).bubble());
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let output = format!("{:?}", handler(Attributes::new()));
        assert!(!output.contains("K1"), "{output}");
    }
}
