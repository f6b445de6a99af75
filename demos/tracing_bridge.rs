use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

use datadog_log_sink::{
    init::{init_tracing_with_config, LayerConfig},
    DatadogConfig, DatadogHandler, Severity,
};

/// Ships `tracing` events at WARNING and above to Datadog.
///
/// Reads `DD_API_KEY`, `DD_SERVICE`, `DD_TAGS`, ... from the environment.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = DatadogConfig::from_env()?;
    let handler = DatadogHandler::from_config(config)?.with_level(Severity::Warning);

    init_tracing_with_config(
        Arc::new(handler),
        LayerConfig {
            min_level: Severity::Debug,
            enable_stdout: true,
        },
    )?;

    info!(target: "auth", "starting service");
    warn!(target: "auth", attempts = 3, "too many login attempts");
    error!(
        target: "auth",
        user_id = 42,
        reason = "invalid password",
        "authentication failed"
    );

    // Deliveries run on their own tasks.
    sleep(Duration::from_secs(2)).await;
    Ok(())
}
