use crate::config::Config;
use crate::fields;
use crate::output::Output;
use crate::pipeline::Pipeline;
use crate::record::LogRecord;
use crate::sink::LogSink;
use crate::writer_sink::WriterSink;
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing::Level;

/// State shared by a root logger and every handle derived from it.
struct Engine {
    sink: Arc<dyn LogSink>,
    level: LevelFilter,
    pipeline: Pipeline,
    show_caller: bool,
    setup_diagnostic: Option<String>,
}

/// Logger handle.
///
/// Handles derived with [`Logger::copy`], [`Logger::with_prefix`] or
/// [`Logger::with_depth_offset`] share the sink, the severity threshold and
/// the enrichment pipeline of their origin but carry their own prefix and
/// depth offset. Deriving never modifies the original handle.
///
/// ```no_run
/// use tracing_enrich::{Config, Logger};
///
/// let root = Logger::new(&Config { show_caller: true, ..Config::default() });
/// let db = root.with_prefix("db");
/// db.with_field("table", "users").warn("slow query");
/// ```
#[derive(Clone)]
pub struct Logger {
    engine: Arc<Engine>,
    prefix: Option<String>,
    depth_offset: usize,
}

impl Logger {
    /// Build a logger writing plain-text lines to the destination named by
    /// `config`.
    ///
    /// An unusable destination falls back to stderr; the reason is printed
    /// to stderr once, here, and kept in [`Logger::setup_diagnostic`].
    pub fn new(config: &Config) -> Self {
        Self::new_reporting(config, |message| eprintln!("{message}"))
    }

    /// Like [`Logger::new`], handing the fallback diagnostic to `report`
    /// instead of stderr. `report` is called at most once, and never by
    /// handles derived from the result.
    pub fn new_reporting(config: &Config, mut report: impl FnMut(&str)) -> Self {
        let (output, fallback) = Output::resolve(config);
        let diagnostic = fallback.map(|e| {
            let message = format!("log output unavailable, writing to stderr instead: {e}");
            report(&message);
            message
        });
        Self::build(config, Arc::new(WriterSink::from_output(output)), diagnostic)
    }

    /// Build a logger delivering records to `sink`. `config.output` and
    /// `config.verbose` are not consulted.
    pub fn with_sink(config: &Config, sink: Arc<dyn LogSink>) -> Self {
        Self::build(config, sink, None)
    }

    fn build(config: &Config, sink: Arc<dyn LogSink>, setup_diagnostic: Option<String>) -> Self {
        let level = config.level_filter().unwrap_or_else(|e| {
            eprintln!("{e}, logging at info");
            LevelFilter::INFO
        });
        let engine = Engine {
            sink,
            level,
            pipeline: Pipeline::for_config(config),
            show_caller: config.show_caller,
            setup_diagnostic,
        };
        Logger {
            engine: Arc::new(engine),
            prefix: config.prefix().map(str::to_string),
            depth_offset: config.caller_depth_adjust,
        }
    }

    /// New handle on the same sink, with `prefix` replacing the current
    /// prefix when given.
    pub fn copy(&self, prefix: Option<&str>) -> Logger {
        Logger {
            engine: Arc::clone(&self.engine),
            prefix: prefix.map(str::to_string).or_else(|| self.prefix.clone()),
            depth_offset: self.depth_offset,
        }
    }

    pub fn with_prefix(&self, prefix: impl Into<String>) -> Logger {
        Logger {
            prefix: Some(prefix.into()),
            ..self.clone()
        }
    }

    /// New handle whose records attribute `depth_offset` frames further out
    /// than the first frame outside the logger. A wrapper that logs on
    /// behalf of its caller uses 1.
    pub fn with_depth_offset(&self, depth_offset: usize) -> Logger {
        Logger {
            depth_offset,
            ..self.clone()
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn depth_offset(&self) -> usize {
        self.depth_offset
    }

    pub fn level(&self) -> LevelFilter {
        self.engine.level
    }

    pub fn shows_caller(&self) -> bool {
        self.engine.show_caller
    }

    pub fn enabled(&self, level: Level) -> bool {
        level <= self.engine.level
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.engine.pipeline
    }

    /// Why the configured output was replaced by stderr, if it was.
    pub fn setup_diagnostic(&self) -> Option<&str> {
        self.engine.setup_diagnostic.as_deref()
    }

    /// Whether `other` was derived from the same root logger.
    pub fn shares_sink_with(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.engine, &other.engine)
    }

    pub fn with_field(&self, key: impl Into<String>, value: impl Into<Value>) -> Entry {
        Entry::new(self.clone()).with_field(key, value)
    }

    pub fn with_fields<K, V>(&self, fields: impl IntoIterator<Item = (K, V)>) -> Entry
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Entry::new(self.clone()).with_fields(fields)
    }

    pub fn with_error(&self, err: &dyn Error) -> Entry {
        Entry::new(self.clone()).with_error(err)
    }

    pub fn log(&self, level: Level, message: impl fmt::Display) {
        self.emit(level, message, BTreeMap::new());
    }

    pub fn trace(&self, message: impl fmt::Display) {
        self.emit(Level::TRACE, message, BTreeMap::new());
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.emit(Level::DEBUG, message, BTreeMap::new());
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.emit(Level::INFO, message, BTreeMap::new());
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.emit(Level::WARN, message, BTreeMap::new());
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.emit(Level::ERROR, message, BTreeMap::new());
    }

    pub fn flush(&self) {
        if let Err(e) = self.engine.sink.flush() {
            eprintln!("log sink flush failed: {e}");
        }
    }

    fn emit(&self, level: Level, message: impl fmt::Display, fields: BTreeMap<String, Value>) {
        if !self.enabled(level) {
            return;
        }
        let mut record = LogRecord::new(level, message.to_string());
        record.fields = fields;
        if let Some(prefix) = &self.prefix {
            record
                .fields
                .entry(fields::PREFIX.to_string())
                .or_insert_with(|| prefix.clone().into());
        }
        if self.engine.show_caller {
            record
                .fields
                .insert(fields::DEPTH_OFFSET.to_string(), self.depth_offset.into());
        }

        self.engine.pipeline.run(&mut record);

        if let Err(e) = self.engine.sink.send(&record) {
            eprintln!("log sink send failed: {e}");
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("prefix", &self.prefix)
            .field("depth_offset", &self.depth_offset)
            .field("level", &self.engine.level)
            .field("show_caller", &self.engine.show_caller)
            .finish_non_exhaustive()
    }
}

/// A pending record carrying extra fields. Nothing is logged until one of
/// the severity methods is called.
#[derive(Debug, Clone)]
pub struct Entry {
    logger: Logger,
    fields: BTreeMap<String, Value>,
}

impl Entry {
    fn new(logger: Logger) -> Self {
        Self {
            logger,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_fields<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.fields
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Attach `err`'s message under the `error` field.
    pub fn with_error(self, err: &dyn Error) -> Self {
        self.with_field(fields::ERROR, err.to_string())
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    pub fn log(self, level: Level, message: impl fmt::Display) {
        self.logger.emit(level, message, self.fields);
    }

    pub fn trace(self, message: impl fmt::Display) {
        self.logger.emit(Level::TRACE, message, self.fields);
    }

    pub fn debug(self, message: impl fmt::Display) {
        self.logger.emit(Level::DEBUG, message, self.fields);
    }

    pub fn info(self, message: impl fmt::Display) {
        self.logger.emit(Level::INFO, message, self.fields);
    }

    pub fn warn(self, message: impl fmt::Display) {
        self.logger.emit(Level::WARN, message, self.fields);
    }

    pub fn error(self, message: impl fmt::Display) {
        self.logger.emit(Level::ERROR, message, self.fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_sink::MemorySink;

    fn memory_logger(config: Config) -> (Logger, MemorySink) {
        let sink = MemorySink::new();
        (Logger::with_sink(&config, Arc::new(sink.clone())), sink)
    }

    #[test]
    fn test_threshold_filters_records() {
        let (logger, sink) = memory_logger(Config {
            level: "warn".into(),
            ..Config::default()
        });
        logger.info("dropped");
        logger.debug("dropped");
        logger.warn("kept");
        logger.error("kept");
        let levels: Vec<_> = sink.records().iter().map(|r| r.level).collect();
        assert_eq!(levels, [Level::WARN, Level::ERROR]);
    }

    #[test]
    fn test_invalid_level_defaults_to_info() {
        let (logger, _) = memory_logger(Config {
            level: "chatty".into(),
            ..Config::default()
        });
        assert_eq!(logger.level(), LevelFilter::INFO);
    }

    #[test]
    fn test_prefix_attached() {
        let (logger, sink) = memory_logger(Config {
            prefix: Some("api".into()),
            ..Config::default()
        });
        logger.info("up");
        let record = &sink.records()[0];
        assert_eq!(record.field_str(fields::PREFIX), Some("api"));
        assert!(!record.fields.contains_key(fields::PREFIX_ALIAS));
    }

    #[test]
    fn test_caller_prefix_field_wins() {
        let (logger, sink) = memory_logger(Config {
            prefix: Some("api".into()),
            disable_colors: true,
            ..Config::default()
        });
        logger.with_field(fields::PREFIX, "override").info("up");
        let record = &sink.records()[0];
        assert_eq!(record.field_str(fields::PREFIX), Some("override"));
        assert_eq!(record.field_str(fields::PREFIX_ALIAS), Some("override"));
    }

    #[test]
    fn test_copy_overrides_prefix_only() {
        let (root, sink) = memory_logger(Config {
            prefix: Some("root".into()),
            caller_depth_adjust: 2,
            ..Config::default()
        });
        let scoped = root.copy(Some("new"));
        let inherited = root.copy(None);
        assert_eq!(scoped.prefix(), Some("new"));
        assert_eq!(inherited.prefix(), Some("root"));
        assert_eq!(root.prefix(), Some("root"));
        assert_eq!(scoped.depth_offset(), 2);
        assert!(scoped.shares_sink_with(&root));

        scoped.info("a");
        root.info("b");
        let prefixes: Vec<_> = sink
            .records()
            .iter()
            .map(|r| r.field_str(fields::PREFIX).map(str::to_string))
            .collect();
        assert_eq!(prefixes, [Some("new".to_string()), Some("root".to_string())]);
    }

    #[test]
    fn test_with_depth_offset_leaves_original() {
        let (root, _) = memory_logger(Config::default());
        let wrapped = root.with_depth_offset(1);
        assert_eq!(wrapped.depth_offset(), 1);
        assert_eq!(root.depth_offset(), 0);
        assert!(wrapped.shares_sink_with(&root));
    }

    #[test]
    fn test_separate_roots_do_not_share() {
        let (a, _) = memory_logger(Config::default());
        let (b, _) = memory_logger(Config::default());
        assert!(!a.shares_sink_with(&b));
    }

    #[test]
    fn test_entry_fields() {
        let (logger, sink) = memory_logger(Config::default());
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml missing");
        logger
            .with_fields([("attempt", 3), ("limit", 5)])
            .with_field("path", "/etc/app")
            .with_error(&err)
            .error("load failed");

        let record = &sink.records()[0];
        assert_eq!(record.message.as_deref(), Some("load failed"));
        assert_eq!(record.fields["attempt"], 3);
        assert_eq!(record.fields["limit"], 5);
        assert_eq!(record.field_str("path"), Some("/etc/app"));
        assert_eq!(record.field_str(fields::ERROR), Some("config.toml missing"));
    }

    #[test]
    fn test_no_caller_fields_when_disabled() {
        let (logger, sink) = memory_logger(Config::default());
        logger.with_depth_offset(3).info("plain");
        let record = &sink.records()[0];
        assert!(record.fields.is_empty());
    }

    #[test]
    fn test_call_site_without_transient_field() {
        let (logger, sink) = memory_logger(Config {
            show_caller: true,
            ..Config::default()
        });
        logger.with_depth_offset(1).info("with caller");
        let record = &sink.records()[0];
        assert!(record.fields.contains_key(fields::CALL_SITE));
        assert!(!record.fields.contains_key(fields::DEPTH_OFFSET));
    }
}
