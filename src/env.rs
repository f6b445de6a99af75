//! Environment variable names read by
//! [`DatadogConfig::from_env`](crate::config::DatadogConfig::from_env).
//!
//! These are purely helpers; the handler itself never touches the
//! environment apart from the ambient hostname lookup.

/// Datadog API key. Required.
pub const DD_API_KEY_ENV: &str = "DD_API_KEY";

/// `ddsource` attribute.
pub const DD_LOGS_SOURCE_ENV: &str = "DD_LOGS_SOURCE";

/// `service` attribute.
pub const DD_SERVICE_ENV: &str = "DD_SERVICE";

/// `hostname` attribute.
pub const DD_HOSTNAME_ENV: &str = "DD_HOSTNAME";

/// Comma separated tags, e.g. `env:prod,team:payments`.
pub const DD_TAGS_ENV: &str = "DD_TAGS";

/// Intake base URL, e.g. `https://http-intake.logs.datadoghq.com`.
pub const DD_LOGS_INTAKE_URL_ENV: &str = "DD_LOGS_INTAKE_URL";

/// Minimum severity name, e.g. `warning`.
pub const DD_LOG_LEVEL_ENV: &str = "DD_LOG_LEVEL";

