use crate::attributes::{Attributes, Tags};
use crate::env::{
    DD_API_KEY_ENV, DD_HOSTNAME_ENV, DD_LOGS_INTAKE_URL_ENV, DD_LOGS_SOURCE_ENV,
    DD_LOG_LEVEL_ENV, DD_SERVICE_ENV, DD_TAGS_ENV,
};
use crate::error::ConfigError;
use crate::level::Severity;
use std::time::Duration;

/// Default Datadog log intake (EU site).
pub const DATADOG_LOG_HOST: &str = "https://http-intake.logs.datadoghq.eu";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything needed to build a
/// [`DatadogHandler`](crate::handler::DatadogHandler).
///
/// **Fields**
/// - `api_key`: intake API key; an empty key is rejected when the handler
///   is built.
/// - `attributes`: optional `source` / `service` / `hostname` / `tags`.
/// - `intake_url`: base URL of the log intake, without path.
/// - `timeout`: per-request timeout.
/// - `level`: minimum severity handled.
/// - `bubble`: whether handled records propagate to further sinks.
#[derive(Clone, Debug)]
pub struct DatadogConfig {
    pub api_key: String,
    pub attributes: Attributes,
    pub intake_url: String,
    pub timeout: Duration,
    pub level: Severity,
    pub bubble: bool,
}

impl DatadogConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            attributes: Attributes::default(),
            intake_url: DATADOG_LOG_HOST.to_string(),
            timeout: DEFAULT_TIMEOUT,
            level: Severity::Debug,
            bubble: true,
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Build a configuration from the `DD_*` environment variables listed
    /// in [`crate::env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`DatadogConfig::from_env`], reading values through `lookup`.
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut config = Self::new(get(DD_API_KEY_ENV).unwrap_or_default());
        config.attributes = Attributes {
            source: get(DD_LOGS_SOURCE_ENV),
            service: get(DD_SERVICE_ENV),
            hostname: get(DD_HOSTNAME_ENV),
            tags: get(DD_TAGS_ENV).map(|raw| Tags::parse_list(&raw)),
        };
        if let Some(url) = get(DD_LOGS_INTAKE_URL_ENV) {
            config.intake_url = url;
        }
        if let Some(level) = get(DD_LOG_LEVEL_ENV) {
            config.level = level
                .parse()
                .map_err(|_| ConfigError::InvalidLevel(level.clone()))?;
        }
        Ok(config)
    }
}
