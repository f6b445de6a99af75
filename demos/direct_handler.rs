use datadog_log_sink::{
    normalize::ErrorReport, Attributes, DatadogHandler, LogRecord, LogSink, Severity,
};

/// Hands records to the handler directly, the way a host logging pipeline
/// would, and reports the outcome of each delivery.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api_key = std::env::var("DD_API_KEY").unwrap_or_default();
    let handler = DatadogHandler::new(
        api_key,
        Attributes::new()
            .source("rust")
            .tags(["env:staging", "team:payments"]),
    )?;

    let io_err = std::io::Error::new(std::io::ErrorKind::TimedOut, "gateway timed out");
    let records = [
        LogRecord::new(Severity::Info, "billing", "invoice created")
            .with_context("invoice_id", 1017)
            .with_extra("channel", "billing"),
        LogRecord::new(Severity::Error, "billing", "charge failed")
            .with_error("exception", ErrorReport::capture(&io_err))
            .with_extra("channel", "billing"),
    ];

    for record in &records {
        match handler.handle(record).await {
            Ok(_) => println!("shipped: {}", record.message),
            Err(e) => eprintln!("failed to ship {:?}: {}", record.message, e),
        }
    }
    Ok(())
}
