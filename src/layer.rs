use crate::config::Config;
use crate::fields;
use crate::pipeline::Pipeline;
use crate::record::LogRecord;
use crate::sink::LogSink;
use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns every event into a [`LogRecord`],
/// runs the enrichment pipeline over it and hands it to a [`LogSink`].
///
/// Severity filtering is left to the subscriber stack (for example a
/// `LevelFilter` layer); every event that reaches this layer is emitted.
/// Work happens synchronously on the thread that emitted the event.
pub struct EnrichLayer {
    sink: Arc<dyn LogSink>,
    pipeline: Pipeline,
    prefix: Option<String>,
    show_caller: bool,
    depth_offset: usize,
}

impl EnrichLayer {
    /// Create a layer enriching events according to `config` and
    /// delivering them to `sink`.
    pub fn new(config: &Config, sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            pipeline: Pipeline::for_config(config),
            prefix: config.prefix().map(str::to_string),
            show_caller: config.show_caller,
            depth_offset: config.caller_depth_adjust,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    fn record_for(&self, event: &Event<'_>) -> LogRecord {
        let mut data = BTreeMap::new();
        let mut message: Option<String> = None;

        let mut visitor = FieldVisitor {
            fields: &mut data,
            message: &mut message,
        };
        event.record(&mut visitor);

        if let Some(prefix) = &self.prefix {
            data
                .entry(fields::PREFIX.to_string())
                .or_insert_with(|| prefix.clone().into());
        }
        if self.show_caller {
            data.insert(fields::DEPTH_OFFSET.to_string(), self.depth_offset.into());
        }

        let meta = event.metadata();
        LogRecord {
            timestamp: Utc::now(),
            level: *meta.level(),
            target: Some(meta.target().to_string()),
            message,
            fields: data,
        }
    }
}

impl<S> Layer<S> for EnrichLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut record = self.record_for(event);
        self.pipeline.run(&mut record);
        if let Err(e) = self.sink.send(&record) {
            eprintln!("log sink send failed: {e}");
        }
    }
}

/// Collects an event's fields; the `message` field is kept apart.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut BTreeMap<String, Value>,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.fields.insert(field.name().to_string(), Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), Value::String(format!("{:?}", value)));
        }
    }
}
