/// Error returned when a handler is built from invalid configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("the Datadog API key is required")]
    MissingApiKey,

    #[error("invalid intake URL: {0}")]
    InvalidIntakeUrl(String),

    #[error("invalid minimum level: {0}")]
    InvalidLevel(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Error returned when a record cannot be rendered into a JSON payload.
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("failed to encode log record as JSON: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Error returned when a single record could not be delivered.
///
/// The record is dropped once this is returned; nothing is retried.
#[derive(thiserror::Error, Debug)]
pub enum DeliveryError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("request to Datadog log intake failed: {0}")]
    Transport(#[from] reqwest::Error),
}
