use crate::record::LogRecord;
use std::error::Error;

/// Destination for enriched [`LogRecord`]s.
///
/// Implementations own formatting and transport (a terminal, a file, a
/// collector) and are shared by every logger handle derived from the same
/// root, possibly across threads, so they must serialize their own writes.
pub trait LogSink: Send + Sync {
    /// Deliver a single enriched record.
    ///
    /// **Parameters**
    /// - `record`: fully-enriched [`LogRecord`]; reserved transient fields
    ///   have already been removed.
    ///
    /// **Returns**
    /// - `Ok(())` if the record was written.
    /// - `Err(..)` if the destination failed. Callers report the error on
    ///   stderr and carry on; logging never fails the application.
    fn send(&self, record: &LogRecord) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Flush any buffered output.
    ///
    /// Default implementation is a no-op.
    fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
