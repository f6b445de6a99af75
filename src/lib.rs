pub mod attributes;
pub mod config;
pub mod env;
pub mod error;
pub mod formatter;
pub mod handler;
pub mod hostname;
pub mod init;
pub mod layer;
pub mod level;
pub mod normalize;
pub mod record;
pub mod sink;

pub use attributes::{Attributes, Tags};
pub use config::DatadogConfig;
pub use error::{ConfigError, DeliveryError, FormatError};
pub use formatter::{DatadogFormatter, Formatter, RenderedEvent};
pub use handler::DatadogHandler;
pub use level::{Severity, Status};
pub use record::LogRecord;
pub use sink::LogSink;
