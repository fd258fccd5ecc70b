//! Structured log enrichment.
//!
//! Every record emitted through a [`Logger`] (or through `tracing` once an
//! [`EnrichLayer`] is installed) passes through a [`Pipeline`] of enrichers
//! before it reaches its [`LogSink`]:
//!
//! - [`PrefixAnnotator`] mirrors the `prefix` field into `@prefix` when
//!   colour output is disabled;
//! - [`CallSiteResolver`] walks the stack past the logging machinery and
//!   records the application's `"file:line"` under `@at`.
//!
//! Loggers wrapped by helper functions use [`Logger::with_depth_offset`] so
//! the call site names the helper's caller rather than the helper.

pub mod classifier;
pub mod config;
pub mod enricher;
pub mod env;
pub mod fields;
pub mod frame;
pub mod init;
pub mod layer;
pub mod logger;
pub mod memory_sink;
pub mod noop_sink;
pub mod output;
pub mod pipeline;
pub mod prefix;
pub mod record;
pub mod resolver;
pub mod sink;
pub mod writer_sink;

pub use classifier::{FacilityClassifier, FrameClassifier};
pub use config::{Config, ConfigError};
pub use enricher::{EnrichError, Enricher, Hook};
pub use frame::{Frame, FrameSource, StackFrames};
pub use layer::EnrichLayer;
pub use logger::{Entry, Logger};
pub use memory_sink::MemorySink;
pub use pipeline::Pipeline;
pub use prefix::PrefixAnnotator;
pub use record::LogRecord;
pub use resolver::CallSiteResolver;
pub use sink::LogSink;
