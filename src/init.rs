use crate::layer::DatadogLayer;
use crate::level::Severity;
use crate::sink::LogSink;
use std::sync::Arc;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the global `tracing` integration.
///
/// **Fields**
/// - `min_level`: events below this severity are not shipped, on top of
///   whatever threshold the sink applies itself.
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   installed next to [`DatadogLayer`] and events are also printed.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub min_level: Severity,
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            min_level: Severity::Debug,
            enable_stdout: true,
        }
    }
}

/// Install a [`Registry`] combined with [`DatadogLayer`] as the global
/// default subscriber, so all `tracing` events in the process are offered
/// to `sink`.
///
/// **Returns**
/// - `Err(..)` if a global subscriber was already installed.
pub fn init_tracing_with_config(
    sink: Arc<dyn LogSink>,
    config: LayerConfig,
) -> Result<(), SetGlobalDefaultError> {
    let layer = DatadogLayer::new(sink, config.min_level);

    // The two subscriber stacks have different types, hence two branches.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)
    }
}

/// Equivalent to [`init_tracing_with_config`] with [`LayerConfig::default`].
pub fn init_tracing(sink: Arc<dyn LogSink>) -> Result<(), SetGlobalDefaultError> {
    init_tracing_with_config(sink, LayerConfig::default())
}
