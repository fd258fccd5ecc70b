use crate::record::LogRecord;
use crate::sink::LogSink;
use std::error::Error;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Keeps every record in memory. Clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records received so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove and return everything received so far.
    pub fn take(&self) -> Vec<LogRecord> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogSink for MemorySink {
    fn send(&self, record: &LogRecord) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.lock().push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_clones_share_buffer() {
        let sink = MemorySink::new();
        let other = sink.clone();
        other.send(&LogRecord::new(Level::INFO, "one")).unwrap();
        sink.send(&LogRecord::new(Level::WARN, "two")).unwrap();
        assert_eq!(sink.len(), 2);

        let taken = other.take();
        assert_eq!(taken[1].message.as_deref(), Some("two"));
        assert!(sink.is_empty());
    }
}
