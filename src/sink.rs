use crate::error::DeliveryError;
use crate::level::Severity;
use crate::record::LogRecord;
use async_trait::async_trait;

/// Destination for [`LogRecord`]s handed over by a logging pipeline.
///
/// The pipeline asks [`is_handling`](LogSink::is_handling) first and then
/// calls [`handle`](LogSink::handle), which awaits exactly one delivery.
/// Buffering, retries and fan-out are left to the pipeline.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Whether records of `level` pass this sink's minimum level.
    fn is_handling(&self, level: Severity) -> bool;

    /// Whether handled records should still be passed to further sinks.
    fn bubble(&self) -> bool {
        true
    }

    /// Render and deliver a single record, unconditionally.
    ///
    /// **Returns**
    /// - `Ok(())` once the backend received the request.
    /// - `Err(..)` if rendering or the transport failed. The record is
    ///   dropped; no retry is attempted.
    async fn write(&self, record: &LogRecord) -> Result<(), DeliveryError>;

    /// Deliver `record` if its level is handled.
    ///
    /// **Returns** `Ok(true)` when the pipeline should stop propagating the
    /// record to further sinks.
    async fn handle(&self, record: &LogRecord) -> Result<bool, DeliveryError> {
        if !self.is_handling(record.level) {
            return Ok(false);
        }
        self.write(record).await?;
        Ok(!self.bubble())
    }
}
