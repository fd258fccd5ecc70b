use crate::config::Config;
use crate::enricher::{Enricher, Hook};
use crate::fields;
use crate::prefix::PrefixAnnotator;
use crate::record::LogRecord;
use crate::resolver::CallSiteResolver;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Ordered set of [`Hook`]s run over every record before it reaches a sink.
///
/// Hooks run in registration order. A failing hook never stops the others
/// and never stops the record: failures are counted, and only the first is
/// printed to stderr. After the last hook the transient
/// [`fields::DEPTH_OFFSET`] field is removed.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    hooks: Vec<Hook>,
    /// Total enricher failures swallowed so far, shared by clones.
    failures: Arc<AtomicU64>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard hooks for `config`: the prefix annotator, then the
    /// call-site resolver when `show_caller` is set.
    pub fn for_config(config: &Config) -> Self {
        let mut pipeline = Self::new();
        pipeline.register(PrefixAnnotator::new(config.disable_colors));
        if config.show_caller {
            pipeline.register(CallSiteResolver::new(config.caller_path_len));
        }
        pipeline
    }

    pub fn register(&mut self, hook: impl Into<Hook>) -> &mut Self {
        self.hooks.push(hook.into());
        self
    }

    pub fn hooks(&self) -> &[Hook] {
        &self.hooks
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn run(&self, record: &mut LogRecord) {
        for hook in &self.hooks {
            if !hook.applies_to(record.level) {
                continue;
            }
            if let Err(e) = hook.enrich(record) {
                if self.failures.fetch_add(1, Ordering::Relaxed) == 0 {
                    eprintln!("log enricher `{}` failed, record emitted without it: {}", hook.name(), e);
                }
            }
        }
        record.fields.remove(fields::DEPTH_OFFSET);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::FrameClassifier;
    use crate::frame::Frame;
    use tracing::Level;

    fn record_with(prefix: &str, depth: u64) -> LogRecord {
        let mut record = LogRecord::new(Level::INFO, "hello");
        record.fields.insert(fields::PREFIX.into(), prefix.into());
        record.fields.insert(fields::DEPTH_OFFSET.into(), depth.into());
        record
    }

    #[test]
    fn test_registration_order_is_kept() {
        let mut pipeline = Pipeline::new();
        pipeline
            .register(PrefixAnnotator::new(true))
            .register(CallSiteResolver::default());
        let names: Vec<_> = pipeline.hooks().iter().map(Hook::name).collect();
        assert_eq!(names, ["prefix", "call-site"]);
    }

    #[test]
    fn test_for_config() {
        let mut config = Config::default();
        assert_eq!(Pipeline::for_config(&config).hooks().len(), 1);

        config.show_caller = true;
        config.caller_path_len = 2;
        let pipeline = Pipeline::for_config(&config);
        match pipeline.hooks() {
            [Hook::Prefix(_), Hook::CallSite(resolver)] => assert_eq!(resolver.path_len(), 2),
            other => panic!("unexpected hooks {other:?}"),
        }
    }

    #[test]
    fn test_transient_field_is_scrubbed() {
        let mut pipeline = Pipeline::new();
        pipeline.register(PrefixAnnotator::new(true));
        let mut record = record_with("api", 1);
        pipeline.run(&mut record);
        assert!(!record.fields.contains_key(fields::DEPTH_OFFSET));
        assert_eq!(record.field_str(fields::PREFIX_ALIAS), Some("api"));
    }

    #[test]
    fn test_empty_pipeline_still_scrubs() {
        let mut record = record_with("api", 3);
        Pipeline::new().run(&mut record);
        assert!(!record.fields.contains_key(fields::DEPTH_OFFSET));
        assert_eq!(record.fields.len(), 1);
    }

    #[test]
    fn test_failure_does_not_stop_later_hooks() {
        let nothing_qualifies: Arc<dyn FrameClassifier> = Arc::new(|_: &Frame| true);
        let mut pipeline = Pipeline::new();
        pipeline
            .register(CallSiteResolver::default().with_classifier(nothing_qualifies))
            .register(PrefixAnnotator::new(true));

        let mut record = record_with("worker", 0);
        pipeline.run(&mut record);
        pipeline.run(&mut record_with("worker", 0));

        assert_eq!(pipeline.failures(), 2);
        assert_eq!(record.field_str(fields::CALL_SITE), Some(fields::UNKNOWN_CALL_SITE));
        assert_eq!(record.field_str(fields::PREFIX_ALIAS), Some("worker"));
        assert!(!record.fields.contains_key(fields::DEPTH_OFFSET));
    }

    #[test]
    fn test_clones_share_failure_count() {
        let nothing_qualifies: Arc<dyn FrameClassifier> = Arc::new(|_: &Frame| true);
        let mut pipeline = Pipeline::new();
        pipeline.register(CallSiteResolver::default().with_classifier(nothing_qualifies));
        let copy = pipeline.clone();
        copy.run(&mut LogRecord::new(Level::WARN, "x"));
        assert_eq!(pipeline.failures(), 1);
    }
}
