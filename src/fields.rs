//! Reserved field names written or consumed by the enrichment pipeline.

use crate::record::LogRecord;

/// Resolved call site, `"<path>:<line>"`.
pub const CALL_SITE: &str = "@at";

/// Logical component name of the emitting logger.
pub const PREFIX: &str = "prefix";

/// Copy of [`PREFIX`] kept for formatters that drop it when colour is off.
pub const PREFIX_ALIAS: &str = "@prefix";

/// Per-call depth offset. Lives only while the pipeline runs; the pipeline
/// removes it before the record reaches a sink.
pub const DEPTH_OFFSET: &str = "@caller_depth";

/// Error text attached by [`Logger::with_error`](crate::logger::Logger::with_error).
pub const ERROR: &str = "error";

/// Value written to [`CALL_SITE`] when no caller frame could be found.
pub const UNKNOWN_CALL_SITE: &str = "unknown";

/// Read the transient depth offset from a record.
///
/// Absent, negative or non-integer values count as 0.
pub fn depth_offset(record: &LogRecord) -> usize {
    record
        .fields
        .get(DEPTH_OFFSET)
        .and_then(|v| v.as_u64())
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_depth_offset_defaults_to_zero() {
        let mut record = LogRecord::new(Level::INFO, "x");
        assert_eq!(depth_offset(&record), 0);

        record.fields.insert(DEPTH_OFFSET.into(), "two".into());
        assert_eq!(depth_offset(&record), 0);

        record.fields.insert(DEPTH_OFFSET.into(), (-1).into());
        assert_eq!(depth_offset(&record), 0);

        record.fields.insert(DEPTH_OFFSET.into(), 1.5.into());
        assert_eq!(depth_offset(&record), 0);
    }

    #[test]
    fn test_depth_offset_reads_integer() {
        let mut record = LogRecord::new(Level::INFO, "x");
        record.fields.insert(DEPTH_OFFSET.into(), 2.into());
        assert_eq!(depth_offset(&record), 2);
    }
}
