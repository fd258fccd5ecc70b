use crate::output::Output;
use crate::record::LogRecord;
use crate::sink::LogSink;
use chrono::SecondsFormat;
use serde_json::Value;
use std::error::Error;
use std::fmt::Write as _;
use std::io::Write;
use std::sync::Mutex;

/// Writes one plain-text line per record to any [`Write`] destination.
///
/// `2024-05-01T10:00:00.000Z INFO  message key=value ...`, fields in key
/// order. Writes from concurrent handles are serialized by an internal lock.
pub struct WriterSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl WriterSink {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }

    pub fn from_output(output: Output) -> Self {
        Self::new(output)
    }
}

impl std::fmt::Debug for WriterSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterSink").finish_non_exhaustive()
    }
}

impl LogSink for WriterSink {
    fn send(&self, record: &LogRecord) -> Result<(), Box<dyn Error + Send + Sync>> {
        let line = format_line(record);
        let mut out = self.out.lock().map_err(|_| "log writer lock poisoned")?;
        out.write_all(line.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut out = self.out.lock().map_err(|_| "log writer lock poisoned")?;
        out.flush()?;
        Ok(())
    }
}

/// Render `record` as a single newline-terminated line.
pub fn format_line(record: &LogRecord) -> String {
    let mut line = format!(
        "{} {:<5}",
        record.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        record.level.as_str()
    );
    if let Some(message) = record.message.as_deref().filter(|m| !m.is_empty()) {
        line.push(' ');
        line.push_str(message);
    }
    for (key, value) in &record.fields {
        let _ = write!(line, " {}={}", key, render_value(value));
    }
    line.push('\n');
    line
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) if needs_quoting(s) => format!("{s:?}"),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn needs_quoting(s: &str) -> bool {
    s.is_empty() || s.chars().any(|c| c.is_whitespace() || c == '=' || c == '"')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing::Level;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_format_line() {
        let mut record = LogRecord::new(Level::WARN, "cache miss");
        record.fields.insert("@at".into(), "app/cache.rs:12".into());
        record.fields.insert("key".into(), "user 42".into());
        record.fields.insert("hits".into(), 3.into());
        let line = format_line(&record);
        assert!(line.ends_with(" WARN  cache miss @at=app/cache.rs:12 hits=3 key=\"user 42\"\n"), "{line}");
    }

    #[test]
    fn test_send_writes_lines() {
        let buf = SharedBuf::default();
        let sink = WriterSink::new(buf.clone());
        sink.send(&LogRecord::new(Level::INFO, "one")).unwrap();
        sink.send(&LogRecord::new(Level::ERROR, "two")).unwrap();

        let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("INFO  one"));
        assert!(lines[1].ends_with("ERROR two"));
    }
}
