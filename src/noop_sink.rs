use crate::record::LogRecord;
use crate::sink::LogSink;
use std::error::Error;

/// A sink that simply drops all records.
///
/// Useful for measuring the cost of enrichment on its own.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn send(&self, _record: &LogRecord) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
